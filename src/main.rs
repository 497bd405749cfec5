use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use anuario_importer::importer::BookImporter;
use anuario_importer::writer;

#[derive(Parser)]
#[command(name = "anuario-importer")]
#[command(
    about = "Normalize ABBYY OCR output of the 1946 foreign trade yearbook into flat records",
    long_about = None
)]
struct Cli {
    /// OCR output workbook to read
    #[arg(default_value = "abby_file.xlsx")]
    input: PathBuf,

    /// Destination workbook for the normalized records
    #[arg(default_value = "abby_parsed.xlsx")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,anuario_importer=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let start_time = Instant::now();

    if !cli.input.exists() {
        error!("File not found: {:?}", cli.input);
        return Err(format!("File not found: {:?}", cli.input).into());
    }

    // Parse the OCR workbook
    let parse_start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Parsing {}...", cli.input.display()));

    let importer = BookImporter::new(cli.input.to_string_lossy().to_string());
    let records = importer.parse_records()?;

    let records_len = records.len();
    let parse_duration = parse_start.elapsed();
    pb.finish_with_message(format!("✓ Parsed {records_len} records"));

    // Write the normalized record sheet
    let write_start = Instant::now();
    writer::write_records(&cli.output, &records)?;
    let write_duration = write_start.elapsed();
    info!("Output written to {:?}", cli.output);

    let total_duration = start_time.elapsed();

    // Print summary
    println!("\n{}", "=".repeat(60));
    println!("Import Summary");
    println!("{}", "=".repeat(60));
    println!("Input:              {}", cli.input.display());
    println!("Output:             {}", cli.output.display());
    println!("Records:            {records_len}");
    println!("{}", "-".repeat(60));
    println!("Parse Time:         {:.2}s", parse_duration.as_secs_f64());
    println!("Write Time:         {:.2}s", write_duration.as_secs_f64());
    println!("Total Time:         {:.2}s", total_duration.as_secs_f64());
    println!("{}", "=".repeat(60));
    println!();

    Ok(())
}
