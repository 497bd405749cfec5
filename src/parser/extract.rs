/// Field extraction
///
/// One routine per row kind. Offsets and delimiters mirror the layout of the
/// printed yearbook exactly; this is positional surgery on OCR text, not
/// general parsing. Routines write their results straight into the running
/// [`ParseContext`].
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::numeric;
use crate::parser::classify::{
    self, RowKind, MULTI_TARIFF_PHRASE, TARIFF_MARKER, TITLE_MARKER,
};
use crate::parser::context::ParseContext;
use crate::record::{
    Measure, ALL_ID_SENTINEL, ALL_SENTINEL, MISSING_COUNTRY, NA_SENTINEL, REFERENCE_YEARS,
};
use crate::row::Row;

/// Currency marker printed before every aggregate value ("m$n" = pesos
/// moneda nacional).
pub const CURRENCY_MARKER: &str = "m$n";

/// Placeholder description when the header pattern fails; flags the record
/// for manual review downstream instead of aborting the run.
pub const PARSE_FAILURE_DESC: &str = "Parsing error";

const KG_ABBREVIATION: &str = "Kg.";
const KG_FULL_WORD: &str = "kilogramos";

/// First run of uppercase letters and whitespace (title/subtitle texts are
/// printed in caps).
static UPPER_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][A-Z\s]+").expect("invalid extraction pattern"));

/// First run starting with an uppercase letter (mixed-case descriptions).
static CAPITALIZED_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z].+").expect("invalid extraction pattern"));

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{kind:?} row is missing its {what}: {cell:?}")]
    MalformedRow {
        kind: RowKind,
        what: &'static str,
        cell: String,
    },

    #[error("cannot read aggregate years from: {0:?}")]
    AggregateYears(String),

    #[error("table headers without tariff codes are not supported: {0:?}")]
    UnsupportedHeader(String),
}

/// Run the extractor for an already-classified row, then record the row's
/// kind as the context's last-seen kind.
pub fn apply(kind: RowKind, row: &Row, ctx: &mut ParseContext) -> Result<(), ParseError> {
    let cell = row.first_cell().unwrap_or("");

    match kind {
        RowKind::Ignore => {}
        RowKind::Title => extract_title(cell, ctx)?,
        RowKind::Subtitle1 => extract_subtitle1(cell, ctx)?,
        RowKind::Subtitle2 => extract_subtitle2(cell, ctx)?,
        RowKind::ProductHeader => extract_product_header(cell, ctx),
        RowKind::ProductHeaderNoTariff => {
            return Err(ParseError::UnsupportedHeader(cell.to_string()));
        }
        RowKind::HeaderFirstPart => {
            ctx.pending_header = Some(cell.to_string());
        }
        RowKind::HeaderSecondPart => merge_split_header(cell, ctx),
        RowKind::AggregateValues => extract_aggregate(cell, ctx)?,
        RowKind::CountryRow => extract_country_row(row, ctx),
        RowKind::NoImports => extract_no_imports(ctx),
    }

    ctx.last_kind = Some(kind);
    Ok(())
}

/// "TÍTULO I. PRODUCTOS ..." → id "I", description "PRODUCTOS ...".
fn extract_title(cell: &str, ctx: &mut ParseContext) -> Result<(), ParseError> {
    let first_dot = cell.find('.');

    let head = match first_dot {
        Some(i) => &cell[..i],
        None => cell,
    };
    let id = head.replace(TITLE_MARKER, "").trim().to_string();

    let tail = match first_dot {
        Some(i) => &cell[i + 1..],
        None => "",
    };
    let desc = uppercase_run(tail).ok_or_else(|| ParseError::MalformedRow {
        kind: RowKind::Title,
        what: "description",
        cell: cell.to_string(),
    })?;

    ctx.title_id = Some(id);
    ctx.title_desc = Some(desc);
    Ok(())
}

/// "a) ANIMALES VIVOS" → id "a", description "ANIMALES VIVOS".
fn extract_subtitle1(cell: &str, ctx: &mut ParseContext) -> Result<(), ParseError> {
    // The classifier pattern puts the parenthesis at the second character.
    let i_paren = cell.find(')').ok_or_else(|| ParseError::MalformedRow {
        kind: RowKind::Subtitle1,
        what: "close parenthesis",
        cell: cell.to_string(),
    })?;

    let id = cell[..i_paren].trim().to_string();
    let desc = uppercase_run(&cell[i_paren + 1..]).ok_or_else(|| ParseError::MalformedRow {
        kind: RowKind::Subtitle1,
        what: "description",
        cell: cell.to_string(),
    })?;

    ctx.subtitle1_id = Some(id);
    ctx.subtitle1_desc = Some(desc);
    Ok(())
}

/// "1. Ganado en pie" → id "1", description "Ganado en pie".
fn extract_subtitle2(cell: &str, ctx: &mut ParseContext) -> Result<(), ParseError> {
    let trimmed = cell.trim();
    let i_dot = trimmed.find('.').ok_or_else(|| ParseError::MalformedRow {
        kind: RowKind::Subtitle2,
        what: "period",
        cell: cell.to_string(),
    })?;

    let id = trimmed[..i_dot].to_string();
    let desc = CAPITALIZED_RUN
        .find(&trimmed[i_dot + 1..])
        .map(|m| m.as_str().trim().to_string())
        .ok_or_else(|| ParseError::MalformedRow {
            kind: RowKind::Subtitle2,
            what: "description",
            cell: cell.to_string(),
        })?;

    ctx.subtitle2_id = Some(id);
    ctx.subtitle2_desc = Some(desc);
    Ok(())
}

/// Full product header: "1. 2. Vacunos (Tarifa 15), cabezas:".
///
/// A description that defies the layout degrades to the
/// [`PARSE_FAILURE_DESC`] placeholder rather than failing the row; the rest
/// of the header is usually still usable.
fn extract_product_header(cell: &str, ctx: &mut ParseContext) {
    ctx.product_id = Some(header_product_id(cell));
    ctx.tariff_number = Some(header_tariff_number(cell));
    ctx.product_desc = Some(header_description(cell));
    ctx.product_units = Some(header_units(cell));
}

/// Product id: text before the first of '.', '-', '(' — but never an empty
/// slice, so a delimiter in the leading position falls back to one char.
fn header_product_id(cell: &str) -> String {
    let trimmed = cell.trim();
    let min_index = ['.', '-', '(']
        .into_iter()
        .filter_map(|d| trimmed.find(d))
        .min();

    let index = match min_index {
        Some(i) if i > 1 => i,
        _ => 1,
    };

    trimmed.get(..index).unwrap_or("").to_string()
}

/// Tariff code between "Tarifa" and the following ')', or the multi-tariff
/// phrase verbatim when the product spans several tariff positions.
fn header_tariff_number(cell: &str) -> String {
    if cell.contains(MULTI_TARIFF_PHRASE) {
        return MULTI_TARIFF_PHRASE.to_string();
    }

    let start = cell
        .find(TARIFF_MARKER)
        .map(|i| i + TARIFF_MARKER.len())
        .unwrap_or(0);
    let end = cell.find(')').unwrap_or(cell.len());

    cell.get(start..end).unwrap_or("").trim().to_string()
}

/// Description: the first capitalized run between the second period (when a
/// period precedes both parentheses, i.e. the header starts "N. …") or else
/// the first period, and the last comma.
fn header_description(cell: &str) -> String {
    let first_dot = cell.find('.');
    let min_paren = [cell.find('('), cell.find(')')]
        .into_iter()
        .flatten()
        .min();

    let dot_before_parens = matches!((first_dot, min_paren), (Some(d), Some(p)) if d < p);
    let start = if dot_before_parens {
        find_nth(cell, '.', 2)
    } else {
        first_dot
    }
    .map(|i| i.saturating_sub(1));

    let end = cell.rfind(',');

    let window = match (start, end) {
        (Some(s), Some(e)) => cell.get(s..e),
        _ => None,
    };

    window
        .and_then(|w| CAPITALIZED_RUN.find(w))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| PARSE_FAILURE_DESC.to_string())
}

/// Unit of measure between the last comma and the last colon; the "Kg."
/// abbreviation expands to its full word.
fn header_units(cell: &str) -> String {
    let start = cell.rfind(',').map(|i| i + 1).unwrap_or(0);
    let end = cell.rfind(':').unwrap_or(cell.len());

    let raw = cell.get(start..end).unwrap_or("").trim();
    if raw == KG_ABBREVIATION {
        KG_FULL_WORD.to_string()
    } else {
        raw.to_string()
    }
}

/// Second half of a split header: glue the buffered first half back on and
/// re-run the full header extractor on the reconstruction. A reconstruction
/// the header rule rejects is reported and dropped; there is no retry.
fn merge_split_header(cell: &str, ctx: &mut ParseContext) {
    let pending = ctx.pending_header.take().unwrap_or_default();
    let merged = format!("{pending} {cell}").trim().to_string();

    let candidate = Row::single(merged.clone());
    if classify::rule_accepts(RowKind::ProductHeader, &candidate) {
        extract_product_header(&merged, ctx);
    } else {
        warn!(merged = %merged, "split header reconstruction failed; row dropped");
    }
}

/// "(Valor total: 1945 m$n 1.234,50; 1946 m$n 2.000,00)".
///
/// The row aggregates everything below the most recent hierarchy row, so the
/// reset depth depends on what came right before it: after a title both
/// subtitle levels collapse to the all-sentinel, after a first-level
/// subtitle only the second level does.
fn extract_aggregate(cell: &str, ctx: &mut ParseContext) -> Result<(), ParseError> {
    match ctx.last_kind {
        Some(RowKind::Title) => {
            ctx.subtitle1_id = Some(ALL_ID_SENTINEL.to_string());
            ctx.subtitle1_desc = Some(ALL_SENTINEL.to_string());
            ctx.subtitle2_id = Some(ALL_ID_SENTINEL.to_string());
            ctx.subtitle2_desc = Some(ALL_SENTINEL.to_string());
        }
        Some(RowKind::Subtitle1) => {
            ctx.subtitle2_id = Some(ALL_ID_SENTINEL.to_string());
            ctx.subtitle2_desc = Some(ALL_SENTINEL.to_string());
        }
        _ => {}
    }

    // Whatever the depth, the row aggregates across products and countries.
    ctx.product_id = Some(ALL_ID_SENTINEL.to_string());
    ctx.tariff_number = Some(NA_SENTINEL.to_string());
    ctx.product_desc = Some(ALL_SENTINEL.to_string());
    ctx.product_units = Some(NA_SENTINEL.to_string());
    ctx.country_id = Some(ALL_ID_SENTINEL.to_string());
    ctx.country_desc = Some(ALL_SENTINEL.to_string());

    ctx.years = aggregate_years(cell)?;
    ctx.values = aggregate_values(cell);
    ctx.quantities = vec![Measure::Missing; ctx.years.len()];
    Ok(())
}

/// First year between ':' and "m$n", second between ';' and the last "m$n".
fn aggregate_years(cell: &str) -> Result<Vec<i32>, ParseError> {
    let first = year_between(cell, cell.find(':').map(|i| i + 1), cell.find(CURRENCY_MARKER));
    let second = year_between(
        cell,
        cell.find(';').map(|i| i + 1),
        cell.rfind(CURRENCY_MARKER),
    );

    match (first, second) {
        (Some(a), Some(b)) => Ok(vec![a, b]),
        _ => Err(ParseError::AggregateYears(cell.to_string())),
    }
}

fn year_between(cell: &str, start: Option<usize>, end: Option<usize>) -> Option<i32> {
    cell.get(start?..end?)?.trim().parse().ok()
}

/// First value between "m$n" and ';', second between the last "m$n" and ')'.
/// The offset skips the three marker characters plus one space. Unparsable
/// values degrade to missing instead of failing the row.
fn aggregate_values(cell: &str) -> Vec<Measure> {
    let first = value_between(
        cell,
        cell.find(CURRENCY_MARKER).map(|i| i + 4),
        cell.find(';'),
    );
    let second = value_between(
        cell,
        cell.rfind(CURRENCY_MARKER).map(|i| i + 4),
        cell.find(')'),
    );

    vec![first, second]
}

fn value_between(cell: &str, start: Option<usize>, end: Option<usize>) -> Measure {
    let window = match (start, end) {
        (Some(s), Some(e)) => cell.get(s..e),
        _ => None,
    };

    match window.map(numeric::parse_decimal) {
        Some(Ok(v)) => Measure::Number(v),
        _ => {
            warn!(cell = %cell, "unparsable aggregate value, recording as missing");
            Measure::Missing
        }
    }
}

/// Five-cell data row: country, two quantities, two values, always for the
/// two reference years of this document.
fn extract_country_row(row: &Row, ctx: &mut ParseContext) {
    let desc = match row.cell(0) {
        None => MISSING_COUNTRY.to_string(),
        Some(c) if c.contains("Total") || c.contains("total") => ALL_SENTINEL.to_string(),
        Some(c) => c.replace('.', "").trim().to_string(),
    };

    // TODO: assign country ids once the country code list is digitized.
    ctx.country_id = None;
    ctx.country_desc = Some(desc);
    ctx.years = REFERENCE_YEARS.to_vec();
    ctx.quantities = vec![cell_measure(row, 1), cell_measure(row, 2)];
    ctx.values = vec![cell_measure(row, 3), cell_measure(row, 4)];
}

fn cell_measure(row: &Row, idx: usize) -> Measure {
    match row.cell(idx) {
        None => Measure::Missing,
        Some(text) => match numeric::parse_decimal(text) {
            Ok(v) => Measure::Number(v),
            Err(e) => {
                debug!(cell = %text, error = %e, "unparsable data cell, recording as missing");
                Measure::Missing
            }
        },
    }
}

/// "Sin importación": the table is empty, emit an explicit empty pair so the
/// product still shows up in the output.
fn extract_no_imports(ctx: &mut ParseContext) {
    ctx.country_id = Some(ALL_ID_SENTINEL.to_string());
    ctx.country_desc = Some(ALL_SENTINEL.to_string());
    ctx.years = REFERENCE_YEARS.to_vec();
    ctx.quantities = vec![Measure::NotApplicable; 2];
    ctx.values = vec![Measure::NotApplicable; 2];
}

fn uppercase_run(text: &str) -> Option<String> {
    UPPER_RUN.find(text).map(|m| m.as_str().trim().to_string())
}

/// Byte index of the n-th occurrence of `needle` (1-based).
fn find_nth(haystack: &str, needle: char, n: usize) -> Option<usize> {
    haystack.match_indices(needle).nth(n.checked_sub(1)?).map(|(i, _)| i)
}
