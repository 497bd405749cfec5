/// Numeric parsing for Spanish-locale values as printed in the yearbook
///
/// Values use `.` as the thousands separator and `,` as the decimal
/// separator (e.g. `1.234,50`). OCR sometimes drops the separators
/// entirely, so plain digit runs must parse too.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NumericError {
    #[error("empty numeric cell")]
    Empty,

    #[error("cannot parse numeric value: {0:?}")]
    Unparsable(String),
}

/// Convert a Spanish-locale numeric string to a float.
///
/// `"1.234,50"` → 1234.5, `"100"` → 100.0. Whitespace is tolerated
/// anywhere, since the OCR pass occasionally inserts it between digits.
pub fn parse_decimal(raw: &str) -> Result<f64, NumericError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NumericError::Empty);
    }

    let normalized: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    normalized
        .parse::<f64>()
        .map_err(|_| NumericError::Unparsable(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_thousands_and_decimal() {
        assert_eq!(parse_decimal("1.234,50").unwrap(), 1234.50);
    }

    #[test]
    fn test_parse_decimal_plain_integer() {
        assert_eq!(parse_decimal("100").unwrap(), 100.0);
    }

    #[test]
    fn test_parse_decimal_decimal_only() {
        assert_eq!(parse_decimal("2.000,00").unwrap(), 2000.0);
    }

    #[test]
    fn test_parse_decimal_with_stray_whitespace() {
        assert_eq!(parse_decimal(" 1.234 ,5 ").unwrap(), 1234.5);
    }

    #[test]
    fn test_parse_decimal_empty() {
        assert!(matches!(parse_decimal("   "), Err(NumericError::Empty)));
    }

    #[test]
    fn test_parse_decimal_garbage() {
        assert!(matches!(
            parse_decimal("sin datos"),
            Err(NumericError::Unparsable(_))
        ));
    }
}
