/// Output record for one (year, quantity, value) observation
///
/// One record is the flat database projection of the parse context at a
/// data-carrying row, combined with the i-th entry of the row's year /
/// quantity / value lists. Field names and column order match the sheet
/// layout the downstream database loader expects.
use serde::Serialize;

/// Column order of the output sheet; the first output row is exactly this.
pub const FIELD_NAMES: [&str; 15] = [
    "id_title",
    "desc_title",
    "id_subt1",
    "desc_subt1",
    "id_subt2",
    "desc_subt2",
    "id_product",
    "tariff_number",
    "desc_product",
    "product_units",
    "id_country",
    "desc_country",
    "year",
    "quantity",
    "value",
];

/// The two years every table of the 1946 yearbook covers.
pub const REFERENCE_YEARS: [i32; 2] = [1945, 1946];

/// Sentinel used when a field aggregates over its whole domain.
pub const ALL_SENTINEL: &str = "Todos";

/// Sentinel id paired with [`ALL_SENTINEL`] descriptions.
pub const ALL_ID_SENTINEL: &str = "0";

/// Sentinel for fields that do not apply to the row at all.
pub const NA_SENTINEL: &str = "NA";

/// Sentinel description for a country cell the OCR pass lost.
pub const MISSING_COUNTRY: &str = "Missing error";

/// A quantity or value observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Measure {
    /// A successfully parsed number.
    Number(f64),
    /// The field does not apply to this row (written as `NA`).
    NotApplicable,
    /// The cell was empty or unparsable (written as a blank cell).
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub title_id: Option<String>,
    pub title_desc: Option<String>,
    pub subtitle1_id: Option<String>,
    pub subtitle1_desc: Option<String>,
    pub subtitle2_id: Option<String>,
    pub subtitle2_desc: Option<String>,
    pub product_id: Option<String>,
    pub tariff_number: Option<String>,
    pub product_desc: Option<String>,
    pub product_units: Option<String>,
    pub country_id: Option<String>,
    pub country_desc: Option<String>,
    pub year: i32,
    pub quantity: Measure,
    pub value: Measure,
}
