/// Workbook-level driver
///
/// Reads the single-sheet ABBYY OCR workbook, normalizes each physical row
/// into a [`Row`] and feeds the dispatcher, collecting records in document
/// order. Ordering is the whole correctness mechanism, so rows are consumed
/// strictly top to bottom in one pass.
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;
use tracing::{debug, info};

use crate::parser::{ParseError, RowParser};
use crate::record::Record;
use crate::row::Row;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("failed to read sheet {sheet}: {msg}")]
    SheetRead { sheet: String, msg: String },

    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: ParseError,
    },
}

/// Parser driver for one OCR workbook.
pub struct BookImporter {
    workbook_path: String,
}

impl BookImporter {
    pub fn new(workbook_path: impl Into<String>) -> Self {
        Self {
            workbook_path: workbook_path.into(),
        }
    }

    /// Parse every row of the workbook's first sheet and return the records
    /// in row-processing order. Re-running on the same file yields the same
    /// records in the same order.
    pub fn parse_records(&self) -> Result<Vec<Record>, ImportError> {
        info!("Parsing OCR workbook: {}", self.workbook_path);

        let mut workbook: Xlsx<BufReader<File>> = open_workbook(&self.workbook_path)
            .map_err(|e: calamine::XlsxError| ImportError::WorkbookOpen(e.to_string()))?;

        // The ABBYY export always puts everything on the first sheet.
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(ImportError::NoSheets)?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::SheetRead {
                sheet: sheet_name.clone(),
                msg: e.to_string(),
            })?;

        let mut parser = RowParser::new();
        let mut records = Vec::new();
        let mut rows_parsed = 0usize;

        for (row_idx, cells) in range.rows().enumerate() {
            let row = Row::new(cells.iter().map(cell_text).collect());

            // Physically empty rows never reach the dispatcher.
            if row.is_empty() {
                debug!("Row {} is empty, skipping", row_idx + 1);
                continue;
            }

            rows_parsed += 1;
            let mut row_records = parser
                .parse_row(&row)
                .map_err(|source| ImportError::Row {
                    row: row_idx + 1,
                    source,
                })?;
            records.append(&mut row_records);
        }

        info!(
            "Parsed {} rows from sheet '{}': {} records, {} unclassified rows skipped",
            rows_parsed,
            sheet_name,
            records.len(),
            parser.skipped_rows()
        );

        Ok(records)
    }
}

/// Normalize one spreadsheet cell to optional text.
///
/// Numeric cells are rendered back to the Spanish-locale text form the
/// extraction rules expect, so a cell survives the text round trip whether
/// the OCR layer stored it as a string or as a number.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_number(*f)),
        Data::Empty => None,
        other => {
            debug!("Unexpected cell type {:?}, treating as empty", other);
            None
        }
    }
}

fn format_number(f: f64) -> String {
    if f.fract() == 0.0 {
        format!("{f:.0}")
    } else {
        format!("{f}").replace('.', ",")
    }
}
