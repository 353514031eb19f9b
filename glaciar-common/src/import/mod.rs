//! CSV import pipeline
//!
//! Raw rows (header → cell) flow through:
//! 1. [`columns`]: header normalization to canonical keys
//! 2. [`assemble`]: per-field coercion ([`coerce`]) into [`ProjectFields`]
//! 3. [`validate`]: business rules, all violations collected
//! 4. [`bulk`]: partition into accepted/rejected, id assignment, store insert
//!
//! [`ProjectFields`]: crate::model::ProjectFields

pub mod assemble;
pub mod bulk;
pub mod coerce;
pub mod columns;
pub mod csv;
pub mod validate;

use std::borrow::Cow;
use std::collections::BTreeMap;

pub use assemble::{apply_row, assemble, Assembled, ImportWarning};
pub use bulk::{plan_import, run_import, ImportPlan, ImportReport, RowRejection, RowWarning, FIRST_ID};
pub use coerce::{coerce_bool, coerce_date, coerce_numeric, parse_date_cell, DateCell, Number};
pub use columns::{normalize_column_name, normalize_row};
pub use validate::{validate, Validation, ValidationError, ValidationRules};

/// One raw cell value
///
/// CSV files only carry text; JSON payloads from the browser may carry
/// booleans and numbers as well.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Bool(bool),
    Null,
}

impl Cell {
    /// Text view of the cell (`Null` is empty, booleans are `true`/`false`)
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Bool(b) => Cow::Owned(b.to_string()),
            Cell::Null => Cow::Borrowed(""),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

impl From<&serde_json::Value> for Cell {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Cell::Null,
            serde_json::Value::Bool(b) => Cell::Bool(*b),
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            serde_json::Value::Number(n) => Cell::Text(n.to_string()),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Row as read from the source, headers in source order
pub type RawRow = Vec<(String, Cell)>;

/// Row keyed by canonical field name
pub type CanonicalRow = BTreeMap<String, Cell>;

/// Build a raw row from a JSON object (`{"Contrato": "...", ...}`)
///
/// Returns `None` when the value is not an object.
pub fn raw_row_from_json(value: &serde_json::Value) -> Option<RawRow> {
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .map(|(header, cell)| (header.clone(), Cell::from(cell)))
            .collect(),
    )
}
