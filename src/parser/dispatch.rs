/// Row dispatcher
///
/// Owns the document-lifetime [`ParseContext`] and runs the
/// classify → extract → build-records sequence for one row at a time. Rows
/// are strictly ordered; every row's meaning depends on the context the
/// previous rows left behind.
use tracing::warn;

use crate::parser::classify::classify;
use crate::parser::context::ParseContext;
use crate::parser::extract::{self, ParseError};
use crate::record::Record;
use crate::row::Row;

#[derive(Debug, Default)]
pub struct RowParser {
    ctx: ParseContext,
    skipped_rows: usize,
}

impl RowParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one row, updating the context, and return whatever records the
    /// row yields (zero for hierarchy rows, one per year for data rows).
    ///
    /// A row no rule accepts is diagnosed and skipped without touching the
    /// context; the reference document should never produce one, but OCR
    /// noise occasionally does.
    pub fn parse_row(&mut self, row: &Row) -> Result<Vec<Record>, ParseError> {
        let Some(kind) = classify(row) else {
            self.skipped_rows += 1;
            warn!(
                cell = row.first_cell().unwrap_or(""),
                cells = row.len(),
                "row matched no classifier, skipping"
            );
            return Ok(Vec::new());
        };

        extract::apply(kind, row, &mut self.ctx)?;
        Ok(self.ctx.build_records())
    }

    /// Number of rows no classifier accepted so far.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Read access to the running context, mainly for tests and diagnostics.
    pub fn context(&self) -> &ParseContext {
        &self.ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Measure, ALL_SENTINEL, NA_SENTINEL};

    fn country_row(name: &str) -> Row {
        Row::new(vec![
            Some(name.to_string()),
            Some("100".to_string()),
            Some("200".to_string()),
            Some("1.000,00".to_string()),
            Some("2.000,00".to_string()),
        ])
    }

    #[test]
    fn test_country_row_yields_two_records() {
        let mut parser = RowParser::new();
        parser
            .parse_row(&Row::single("TÍTULO I. FOO BAR"))
            .unwrap();
        let records = parser.parse_row(&country_row("Argentina.")).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 1945);
        assert_eq!(records[1].year, 1946);
        assert_eq!(records[0].country_desc.as_deref(), Some("Argentina"));
        assert_eq!(records[0].quantity, Measure::Number(100.0));
        assert_eq!(records[1].quantity, Measure::Number(200.0));
        assert_eq!(records[0].value, Measure::Number(1000.0));
        assert_eq!(records[1].value, Measure::Number(2000.0));
        // Records only differ in the indexed fields.
        assert_eq!(records[0].title_id, records[1].title_id);
        assert_eq!(records[0].country_desc, records[1].country_desc);
    }

    #[test]
    fn test_hierarchy_rows_yield_no_records() {
        let mut parser = RowParser::new();
        assert!(parser
            .parse_row(&Row::single("TÍTULO I. FOO BAR"))
            .unwrap()
            .is_empty());
        assert!(parser
            .parse_row(&Row::single("a) ANIMALES VIVOS"))
            .unwrap()
            .is_empty());
        assert!(parser
            .parse_row(&Row::single("1. 2. Vacunos (Tarifa 15), cabezas:"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_no_imports_marker_yields_synthetic_records() {
        let mut parser = RowParser::new();
        let records = parser.parse_row(&Row::single("Sin importación")).unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            assert_eq!(record.country_desc.as_deref(), Some(ALL_SENTINEL));
            assert_eq!(record.quantity, Measure::NotApplicable);
            assert_eq!(record.value, Measure::NotApplicable);
        }
        assert_eq!(records[0].year, 1945);
        assert_eq!(records[1].year, 1946);
    }

    #[test]
    fn test_aggregate_after_title_inherits_and_resets() {
        let mut parser = RowParser::new();
        parser
            .parse_row(&Row::single("TÍTULO I. FOO BAR"))
            .unwrap();
        let records = parser
            .parse_row(&Row::single(
                "Valor total: 1945 m$n 1.234,50; 1946 m$n 2.000,00)",
            ))
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title_id.as_deref(), Some("I"));
        assert_eq!(records[0].subtitle1_desc.as_deref(), Some(ALL_SENTINEL));
        assert_eq!(records[0].subtitle2_desc.as_deref(), Some(ALL_SENTINEL));
        assert_eq!(records[0].tariff_number.as_deref(), Some(NA_SENTINEL));
        assert_eq!(records[0].value, Measure::Number(1234.50));
        assert_eq!(records[1].value, Measure::Number(2000.00));
        assert_eq!(records[0].quantity, Measure::Missing);
    }

    #[test]
    fn test_unmatched_row_is_skipped_and_counted() {
        let mut parser = RowParser::new();
        parser
            .parse_row(&Row::single("TÍTULO I. FOO BAR"))
            .unwrap();

        let records = parser.parse_row(&Row::single("- - -")).unwrap();
        assert!(records.is_empty());
        assert_eq!(parser.skipped_rows(), 1);
        // Context untouched: the aggregate that follows still sees the title
        // as the previous hierarchy row.
        assert_eq!(
            parser.context().last_kind,
            Some(crate::parser::classify::RowKind::Title)
        );
    }

    #[test]
    fn test_ignored_rows_break_reset_inference() {
        // A blank row between the title and the aggregate demotes the reset
        // depth: the aggregate no longer sees the title as its predecessor.
        let mut parser = RowParser::new();
        parser
            .parse_row(&Row::single("TÍTULO I. FOO BAR"))
            .unwrap();
        parser.parse_row(&Row::new(vec![])).unwrap();

        let records = parser
            .parse_row(&Row::single("Valor total: 1945 m$n 10,00; 1946 m$n 20,00)"))
            .unwrap();
        assert_eq!(records[0].subtitle1_id, None);
    }
}
