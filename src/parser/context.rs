/// Running parse context
///
/// One context lives for the whole document. Every extractor overwrites the
/// fields of its own hierarchy level and leaves shallower levels alone, so a
/// data row deep inside a table still sees the title and subtitles that were
/// announced pages earlier. The control fields at the bottom carry the
/// cross-row state: the previous row's kind (the aggregate extractor keys
/// its reset depth on it) and the buffered first half of a split header.
use crate::parser::classify::RowKind;
use crate::record::{Measure, Record};

#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    // title
    pub title_id: Option<String>,
    pub title_desc: Option<String>,

    // first-level subtitle
    pub subtitle1_id: Option<String>,
    pub subtitle1_desc: Option<String>,

    // second-level subtitle
    pub subtitle2_id: Option<String>,
    pub subtitle2_desc: Option<String>,

    // product table header
    pub product_id: Option<String>,
    pub tariff_number: Option<String>,
    pub product_desc: Option<String>,
    pub product_units: Option<String>,

    // data inside the product table
    pub country_id: Option<String>,
    pub country_desc: Option<String>,
    pub years: Vec<i32>,
    pub quantities: Vec<Measure>,
    pub values: Vec<Measure>,

    // control state for the parsers
    pub last_kind: Option<RowKind>,
    pub pending_header: Option<String>,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the flat records the just-parsed row yields: one per
    /// (year, quantity, value) triple, all other fields taken from the
    /// context as-is. Only the data-carrying row kinds produce records;
    /// titles, subtitles and headers merely update the context.
    pub fn build_records(&self) -> Vec<Record> {
        match self.last_kind {
            Some(RowKind::AggregateValues | RowKind::CountryRow | RowKind::NoImports) => {}
            _ => return Vec::new(),
        }

        self.years
            .iter()
            .zip(self.quantities.iter())
            .zip(self.values.iter())
            .map(|((year, quantity), value)| Record {
                title_id: self.title_id.clone(),
                title_desc: self.title_desc.clone(),
                subtitle1_id: self.subtitle1_id.clone(),
                subtitle1_desc: self.subtitle1_desc.clone(),
                subtitle2_id: self.subtitle2_id.clone(),
                subtitle2_desc: self.subtitle2_desc.clone(),
                product_id: self.product_id.clone(),
                tariff_number: self.tariff_number.clone(),
                product_desc: self.product_desc.clone(),
                product_units: self.product_units.clone(),
                country_id: self.country_id.clone(),
                country_desc: self.country_desc.clone(),
                year: *year,
                quantity: *quantity,
                value: *value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::REFERENCE_YEARS;

    fn data_context() -> ParseContext {
        ParseContext {
            title_id: Some("I".to_string()),
            title_desc: Some("PRODUCTOS".to_string()),
            country_desc: Some("Brasil".to_string()),
            years: REFERENCE_YEARS.to_vec(),
            quantities: vec![Measure::Number(100.0), Measure::Missing],
            values: vec![Measure::Number(1000.0), Measure::Number(2000.0)],
            last_kind: Some(RowKind::CountryRow),
            ..ParseContext::default()
        }
    }

    #[test]
    fn test_one_record_per_year_value_pair() {
        let records = data_context().build_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 1945);
        assert_eq!(records[0].quantity, Measure::Number(100.0));
        assert_eq!(records[1].year, 1946);
        assert_eq!(records[1].quantity, Measure::Missing);
        assert_eq!(records[1].value, Measure::Number(2000.0));
    }

    #[test]
    fn test_records_share_non_indexed_fields() {
        let records = data_context().build_records();
        assert!(records.iter().all(|r| r.title_id.as_deref() == Some("I")));
        assert!(records
            .iter()
            .all(|r| r.country_desc.as_deref() == Some("Brasil")));
    }

    #[test]
    fn test_header_rows_yield_no_records() {
        let mut ctx = data_context();
        ctx.last_kind = Some(RowKind::ProductHeader);
        assert!(ctx.build_records().is_empty());

        ctx.last_kind = Some(RowKind::Title);
        assert!(ctx.build_records().is_empty());

        ctx.last_kind = None;
        assert!(ctx.build_records().is_empty());
    }
}
