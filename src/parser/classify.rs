/// Row classification
///
/// Each row shape is recognized by up to three conditions, all of which must
/// hold: a substring contained in the first cell, an exact cell count, and a
/// prefix pattern on the first cell. Rules are tried in a fixed priority
/// order and the first match wins; extraction never falls back to a later
/// rule.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::row::Row;

/// Literal marking a title row ("TÍTULO I. ...").
pub const TITLE_MARKER: &str = "TÍTULO";

/// Literal marking a page-continuation row of a table split across pages.
pub const CONTINUATION_MARKER: &str = "(Conclusión)";

/// Literal marking a table with no recorded imports.
pub const NO_IMPORTS_MARKER: &str = "Sin importación";

/// Literal opening the aggregate-values row of a table.
pub const AGGREGATE_MARKER: &str = "Valor total:";

/// Literal introducing the tariff code in product headers.
pub const TARIFF_MARKER: &str = "Tarifa";

/// Phrase used when several tariff positions apply to one product.
pub const MULTI_TARIFF_PHRASE: &str = "varios y no tarifados";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Blank rows, page-continuation rows, rows with an empty first cell.
    Ignore,
    /// "Sin importación" marker inside an otherwise empty table.
    NoImports,
    /// Table header carrying a tariff code, complete in one row.
    ProductHeader,
    /// First half of a header the OCR pass split across two rows.
    HeaderFirstPart,
    /// "Valor total: ..." row aggregating a whole hierarchy level.
    AggregateValues,
    /// Second half of a split header; triggers the merge.
    HeaderSecondPart,
    /// Five-cell per-country data row.
    CountryRow,
    /// Header without a tariff code; recognized but not supported.
    ProductHeaderNoTariff,
    /// "TÍTULO ..." top-level title.
    Title,
    /// "a) ..." first-level subtitle.
    Subtitle1,
    /// "1. ..." second-level subtitle.
    Subtitle2,
}

struct Rule {
    kind: RowKind,
    substring: Option<&'static str>,
    length: Option<usize>,
    pattern: Option<Regex>,
}

impl Rule {
    fn new(
        kind: RowKind,
        substring: Option<&'static str>,
        length: Option<usize>,
        pattern: Option<&str>,
    ) -> Self {
        Self {
            kind,
            substring,
            length,
            // Patterns are fixed literals; a failure here is a programming
            // error caught by the classifier tests.
            pattern: pattern.map(|p| Regex::new(p).expect("invalid classifier pattern")),
        }
    }

    fn accepts(&self, row: &Row) -> bool {
        let substring_cond = match self.substring {
            Some(needle) => row.first_cell().is_some_and(|c| c.contains(needle)),
            None => true,
        };
        let len_cond = match self.length {
            Some(n) => row.len() == n,
            None => true,
        };
        let pattern_cond = match &self.pattern {
            Some(re) => row.first_cell().is_some_and(|c| re.is_match(c)),
            None => true,
        };
        substring_cond && len_cond && pattern_cond
    }
}

// Priority order matters: complete headers outrank split-header halves,
// the aggregate marker outranks the generic trailing-colon rule, and the
// title/subtitle rules come last.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(RowKind::NoImports, Some(NO_IMPORTS_MARKER), Some(1), None),
        Rule::new(
            RowKind::ProductHeader,
            Some(TARIFF_MARKER),
            Some(1),
            Some("^[0-9].+Tarifa.+:"),
        ),
        Rule::new(
            RowKind::HeaderFirstPart,
            None,
            Some(1),
            Some("^[0-9].+Tarifa.+"),
        ),
        Rule::new(
            RowKind::AggregateValues,
            Some(AGGREGATE_MARKER),
            Some(1),
            None,
        ),
        Rule::new(RowKind::HeaderSecondPart, None, Some(1), Some("^.+:")),
        Rule::new(RowKind::CountryRow, None, Some(5), None),
        Rule::new(
            RowKind::ProductHeaderNoTariff,
            None,
            Some(1),
            Some("^[0-9].+:"),
        ),
        Rule::new(RowKind::Title, Some(TITLE_MARKER), Some(1), None),
        Rule::new(
            RowKind::Subtitle1,
            None,
            Some(1),
            Some(r"^[a-z]\)[A-Z\s]+"),
        ),
        Rule::new(RowKind::Subtitle2, None, Some(1), Some(r"^[0-9]\.")),
    ]
});

fn is_ignorable(row: &Row) -> bool {
    match row.first_cell() {
        None => true,
        Some(first) => first.contains(CONTINUATION_MARKER),
    }
}

/// Classify a row, or `None` when no rule accepts it.
pub fn classify(row: &Row) -> Option<RowKind> {
    if is_ignorable(row) {
        return Some(RowKind::Ignore);
    }
    RULES.iter().find(|rule| rule.accepts(row)).map(|r| r.kind)
}

/// Re-check a specific rule's conditions; used by the split-header merge to
/// validate the reconstructed row before re-running the header extractor.
pub(crate) fn rule_accepts(kind: RowKind, row: &Row) -> bool {
    RULES
        .iter()
        .find(|rule| rule.kind == kind)
        .is_some_and(|rule| rule.accepts(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_row_is_ignored() {
        assert_eq!(classify(&Row::new(vec![])), Some(RowKind::Ignore));
    }

    #[test]
    fn test_blank_first_cell_is_ignored() {
        let row = Row::new(vec![None, Some("100".to_string())]);
        assert_eq!(classify(&row), Some(RowKind::Ignore));
    }

    #[test]
    fn test_continuation_row_is_ignored() {
        let row = Row::single("1. Bovinos (Conclusión)");
        assert_eq!(classify(&row), Some(RowKind::Ignore));
    }

    #[test]
    fn test_title_row() {
        let row = Row::single("TÍTULO I. PRODUCTOS DE LA GANADERIA");
        assert_eq!(classify(&row), Some(RowKind::Title));
    }

    #[test]
    fn test_subtitle1_row() {
        let row = Row::single("a) ANIMALES VIVOS");
        assert_eq!(classify(&row), Some(RowKind::Subtitle1));
    }

    #[test]
    fn test_subtitle2_row() {
        let row = Row::single("1. Ganado en pie");
        assert_eq!(classify(&row), Some(RowKind::Subtitle2));
    }

    #[test]
    fn test_product_header_outranks_split_header_first_part() {
        let row = Row::single("1. 2. Vacunos (Tarifa 15), cabezas:");
        assert_eq!(classify(&row), Some(RowKind::ProductHeader));
    }

    #[test]
    fn test_split_header_first_part_without_colon() {
        // The page break falls after the tariff number, before the units.
        let row = Row::single("1. 2. Vacunos (Tarifa 15");
        assert_eq!(classify(&row), Some(RowKind::HeaderFirstPart));
    }

    #[test]
    fn test_aggregate_outranks_second_part_rule() {
        // Contains a colon, so the generic `.+:` rule would also match.
        let row = Row::single("(Valor total: 1945 m$n 1.234,50; 1946 m$n 2.000,00)");
        assert_eq!(classify(&row), Some(RowKind::AggregateValues));
    }

    #[test]
    fn test_second_part_of_split_header() {
        let row = Row::single("), cabezas:");
        assert_eq!(classify(&row), Some(RowKind::HeaderSecondPart));
    }

    #[test]
    fn test_country_row_needs_five_cells() {
        let row = Row::new(vec![
            Some("Brasil.".to_string()),
            Some("100".to_string()),
            Some("200".to_string()),
            Some("1.000,00".to_string()),
            Some("2.000,00".to_string()),
        ]);
        assert_eq!(classify(&row), Some(RowKind::CountryRow));
    }

    #[test]
    fn test_no_imports_marker() {
        let row = Row::single("Sin importación");
        assert_eq!(classify(&row), Some(RowKind::NoImports));
    }

    #[test]
    fn test_no_tariff_header_shadowed_by_second_part_rule() {
        // A digit-leading header without "Tarifa" still ends in a colon, so
        // the generic second-part rule claims it first. The dedicated
        // no-tariff rule stays in the table for documentation and for the
        // unsupported-variant error path, but it cannot win dispatch.
        let row = Row::single("7 Cueros salados:");
        assert_eq!(classify(&row), Some(RowKind::HeaderSecondPart));
    }

    #[test]
    fn test_unrecognized_row_yields_none() {
        let row = Row::single("- - -");
        assert_eq!(classify(&row), None);
    }

    #[test]
    fn test_two_cell_row_yields_none() {
        let row = Row::new(vec![Some("foo".to_string()), Some("bar".to_string())]);
        assert_eq!(classify(&row), None);
    }
}
