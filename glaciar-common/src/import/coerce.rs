//! Cell coercion: text to boolean, number and date
//!
//! None of these functions fail. Malformed input resolves to a default and
//! the caller decides whether that deserves a warning.

use chrono::NaiveDate;

use super::Cell;

/// Text values (after lowercase + trim) that mean `true`
const TRUE_VALUES: &[&str] = &["true", "1", "sí", "si", "yes", "verdadero"];

/// Accepted date layouts, tried in order
///
/// `%d/%m/%Y` comes before `%m/%d/%Y`, so `03/04/2020` is the 3rd of April.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y", "%Y/%m/%d"];

/// Numeric cell value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    /// Integer view; floats are truncated toward zero
    pub fn as_i64(self) -> i64 {
        match self {
            Number::Int(i) => i,
            Number::Float(f) => f as i64,
        }
    }
}

/// True for empty, whitespace-only, or literal `null` cells
pub fn is_blank(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null")
}

/// Coerce a cell to a boolean
///
/// Booleans pass through; text is true only for the accepted spellings.
pub fn coerce_bool(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        Cell::Text(s) => TRUE_VALUES.contains(&s.trim().to_lowercase().as_str()),
        Cell::Null => false,
    }
}

/// Coerce text to a number
///
/// Blank input returns `default`. Text containing `.` parses as a float,
/// anything else as an integer; parse failures also return `default`.
///
/// # Examples
///
/// ```
/// use glaciar_common::import::{coerce_numeric, Number};
///
/// assert_eq!(coerce_numeric("20", None), Some(Number::Int(20)));
/// assert_eq!(coerce_numeric("635.5", None), Some(Number::Float(635.5)));
/// assert_eq!(coerce_numeric("", Some(Number::Int(0))), Some(Number::Int(0)));
/// assert_eq!(coerce_numeric("abc", None), None);
/// ```
pub fn coerce_numeric(raw: &str, default: Option<Number>) -> Option<Number> {
    if is_blank(raw) {
        return default;
    }

    let text = raw.trim();
    let parsed = if text.contains('.') {
        text.parse::<f64>().ok().map(Number::Float)
    } else {
        text.parse::<i64>().ok().map(Number::Int)
    };

    parsed.or(default)
}

/// Outcome of parsing a date cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateCell {
    /// Blank or `null`
    Empty,
    Date(NaiveDate),
    /// Non-blank text that matched no accepted layout
    Invalid,
}

impl DateCell {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateCell::Date(d) => Some(d),
            DateCell::Empty | DateCell::Invalid => None,
        }
    }
}

/// Parse a date cell, telling blank cells apart from unparseable ones
pub fn parse_date_cell(raw: &str) -> DateCell {
    if is_blank(raw) {
        return DateCell::Empty;
    }

    let text = raw.trim();
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
    {
        return DateCell::Date(date);
    }

    // ISO datetimes from API clients ("2014-06-10T00:00:00"): keep the date part
    if let (Some(date_part), Some(rest)) = (text.get(..10), text.get(10..)) {
        if rest.starts_with('T') || rest.starts_with(' ') {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                return DateCell::Date(date);
            }
        }
    }

    DateCell::Invalid
}

/// Coerce text to a calendar date, `None` when blank or unparseable
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use glaciar_common::import::coerce_date;
///
/// assert_eq!(coerce_date("10/06/2014"), NaiveDate::from_ymd_opt(2014, 6, 10));
/// assert_eq!(coerce_date(""), None);
/// assert_eq!(coerce_date("not-a-date"), None);
/// ```
pub fn coerce_date(raw: &str) -> Option<NaiveDate> {
    parse_date_cell(raw).date()
}
