/// A single row of OCR output: an ordered sequence of optional text cells.
///
/// The OCR layer leaves ragged trailing blanks on most rows, so the
/// constructor trims them; embedded blanks are preserved because the
/// per-country rows rely on cell positions (quantity/value columns may be
/// empty where the scan lost a figure).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    cells: Vec<Option<String>>,
}

impl Row {
    /// Build a row from raw cell values, dropping trailing empty cells.
    pub fn new(mut cells: Vec<Option<String>>) -> Self {
        while matches!(cells.last(), Some(None)) {
            cells.pop();
        }
        Self { cells }
    }

    /// Convenience constructor for a single-cell row.
    pub fn single(text: impl Into<String>) -> Self {
        Self::new(vec![Some(text.into())])
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Text of the cell at `idx`, if present and non-empty.
    pub fn cell(&self, idx: usize) -> Option<&str> {
        self.cells
            .get(idx)
            .and_then(|c| c.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Text of the first cell, if present and non-empty.
    pub fn first_cell(&self) -> Option<&str> {
        self.cell(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_blanks_trimmed() {
        let row = Row::new(vec![Some("a".to_string()), None, None]);
        assert_eq!(row.len(), 1);
        assert_eq!(row.first_cell(), Some("a"));
    }

    #[test]
    fn test_embedded_blanks_preserved() {
        let row = Row::new(vec![
            Some("a".to_string()),
            None,
            Some("b".to_string()),
            None,
        ]);
        assert_eq!(row.len(), 3);
        assert_eq!(row.cell(1), None);
        assert_eq!(row.cell(2), Some("b"));
    }

    #[test]
    fn test_all_blank_row_is_empty() {
        let row = Row::new(vec![None, None]);
        assert!(row.is_empty());
        assert_eq!(row.first_cell(), None);
    }

    #[test]
    fn test_empty_string_cell_reads_as_absent() {
        let row = Row::new(vec![Some(String::new()), Some("x".to_string())]);
        assert_eq!(row.first_cell(), None);
        assert_eq!(row.len(), 2);
    }
}
