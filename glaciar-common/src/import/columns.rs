//! Column name normalization
//!
//! Maps CSV headers (accented, mixed case, containing `/`) to canonical
//! field keys. Unknown headers are kept (lowercased and trimmed) rather than
//! rejected, so a file with extra columns still imports.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use super::{CanonicalRow, RawRow};
use crate::model::FIELDS;

/// Header spellings that differ from their canonical key
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("fecha_término", "fecha_termino"),
    ("duración", "duracion"),
    ("región", "region"),
    ("estudio_geoeléctrico", "estudio_geoelectrico"),
    ("topografía", "topografia"),
    ("hidráulica/hidrología", "hidraulica_hidrologia"),
    ("descripción", "descripcion"),
    ("contrato_existe", "contrato_doc"),
];

/// Lookup table: every canonical key maps to itself, as do the export
/// labels (so an exported file imports back) and the aliases
static COLUMN_MAPPING: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    FIELDS
        .iter()
        .map(|f| (f.label.to_lowercase(), f.key))
        .chain(FIELDS.iter().map(|f| (f.key.to_string(), f.key)))
        .chain(HEADER_ALIASES.iter().map(|(alias, key)| (alias.to_string(), *key)))
        .collect()
});

/// Normalize one header to its canonical key
///
/// Empty or missing input gives an empty string.
///
/// # Examples
///
/// ```
/// use glaciar_common::import::normalize_column_name;
///
/// assert_eq!(normalize_column_name(Some("Hidráulica/Hidrología")), "hidraulica_hidrologia");
/// assert_eq!(normalize_column_name(Some("  Cliente ")), "cliente");
/// assert_eq!(normalize_column_name(Some("Columna Extra")), "columna extra");
/// assert_eq!(normalize_column_name(None), "");
/// ```
pub fn normalize_column_name(column_name: Option<&str>) -> String {
    let Some(name) = column_name else {
        return String::new();
    };

    let normalized = name.trim().to_lowercase();
    match COLUMN_MAPPING.get(normalized.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => normalized,
    }
}

/// Normalize every header of a row
///
/// When two source headers map to the same key, the later one wins.
pub fn normalize_row(row: RawRow) -> CanonicalRow {
    row.into_iter()
        .map(|(header, cell)| (normalize_column_name(Some(header.as_str())), cell))
        .collect()
}
