/// Output workbook writer
///
/// One sheet: the field-name header in the first row, then one row per
/// record in the fixed column order of [`FIELD_NAMES`].
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::record::{Measure, Record, FIELD_NAMES};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed writing output workbook: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Write the header and all records to a new workbook at `path`.
pub fn write_records(path: &Path, records: &[Record]) -> Result<(), WriteError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in FIELD_NAMES.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (idx, record) in records.iter().enumerate() {
        write_record(worksheet, idx as u32 + 1, record)?;
    }

    workbook.save(path)?;
    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

fn write_record(worksheet: &mut Worksheet, row: u32, record: &Record) -> Result<(), WriteError> {
    let text_fields = [
        &record.title_id,
        &record.title_desc,
        &record.subtitle1_id,
        &record.subtitle1_desc,
        &record.subtitle2_id,
        &record.subtitle2_desc,
        &record.product_id,
        &record.tariff_number,
        &record.product_desc,
        &record.product_units,
        &record.country_id,
        &record.country_desc,
    ];

    for (col, field) in text_fields.iter().enumerate() {
        if let Some(text) = field.as_deref() {
            worksheet.write_string(row, col as u16, text)?;
        }
    }

    worksheet.write_number(row, 12, f64::from(record.year))?;
    write_measure(worksheet, row, 13, record.quantity)?;
    write_measure(worksheet, row, 14, record.value)?;
    Ok(())
}

fn write_measure(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    measure: Measure,
) -> Result<(), WriteError> {
    match measure {
        Measure::Number(v) => worksheet.write_number(row, col, v)?,
        Measure::NotApplicable => worksheet.write_string(row, col, crate::record::NA_SENTINEL)?,
        // Missing values stay blank cells.
        Measure::Missing => return Ok(()),
    };
    Ok(())
}
