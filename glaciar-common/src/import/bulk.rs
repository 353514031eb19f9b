//! Bulk import orchestration
//!
//! [`plan_import`] is pure: it normalizes, assembles and validates every
//! row, splits the batch into accepted and rejected rows, and assigns
//! business ids. [`run_import`] adds the store around it and writes the
//! accepted rows in one transaction.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::assemble::{assemble, ImportWarning};
use super::columns::normalize_row;
use super::validate::{validate, ValidationError, ValidationRules};
use super::RawRow;
use crate::db::ProjectStore;
use crate::model::ProjectFields;
use crate::Result;

/// First business id handed out by an empty store
pub const FIRST_ID: i64 = 1001;

/// A row that failed validation
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// 1-based position in the input
    pub row: usize,
    /// Business id of the candidate, when one was supplied
    pub id: Option<i64>,
    pub errors: Vec<ValidationError>,
}

impl RowRejection {
    /// `Fila 3: El monto no puede ser negativo; ...`
    pub fn message(&self) -> String {
        let errors: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        format!("Fila {}: {}", self.row, errors.join("; "))
    }
}

/// A coercion warning, tagged with its 1-based row
#[derive(Debug, Clone, PartialEq)]
pub struct RowWarning {
    pub row: usize,
    pub warning: ImportWarning,
}

/// Result of planning a batch; nothing has been written yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    /// Valid candidates, in input order, with ids assigned
    pub accepted: Vec<ProjectFields>,
    pub rejected: Vec<RowRejection>,
    pub warnings: Vec<RowWarning>,
}

impl ImportPlan {
    pub fn total_rows(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}

/// Normalize, assemble and validate `rows`, then assign missing ids
///
/// Rows without an id (absent or 0) get sequential ids starting right
/// after the largest id known: the store's `store_max_id` or the largest
/// explicit id among the accepted rows. With neither, numbering starts at
/// [`FIRST_ID`]. Rows whose id would pass `i64::MAX` are rejected with
/// [`ValidationError::IdExhausted`].
pub fn plan_import(
    rows: Vec<RawRow>,
    store_max_id: Option<i64>,
    rules: &ValidationRules,
    today: NaiveDate,
) -> ImportPlan {
    let mut plan = ImportPlan::default();
    let mut accepted = Vec::new();

    for (index, raw) in rows.into_iter().enumerate() {
        let row = index + 1;
        let canonical = normalize_row(raw);
        let assembled = assemble(&canonical);

        plan.warnings.extend(
            assembled
                .warnings
                .into_iter()
                .map(|warning| RowWarning { row, warning }),
        );

        let validation = validate(&assembled.fields, rules, today);
        if validation.is_valid() {
            accepted.push((row, assembled.fields));
        } else {
            plan.rejected.push(RowRejection {
                row,
                id: assembled.fields.id,
                errors: validation.errors,
            });
        }
    }

    let exhausted = assign_ids(&mut accepted, store_max_id);
    for (row, fields) in accepted {
        if exhausted.contains(&row) {
            plan.rejected.push(RowRejection {
                row,
                id: None,
                errors: vec![ValidationError::IdExhausted],
            });
        } else {
            plan.accepted.push(fields);
        }
    }
    plan.rejected.sort_by_key(|rejection| rejection.row);

    plan
}

/// Fill in missing ids; returns the rows left without one
fn assign_ids(accepted: &mut [(usize, ProjectFields)], store_max_id: Option<i64>) -> Vec<usize> {
    let batch_max = accepted
        .iter()
        .map(|(_, fields)| fields)
        .filter(|fields| !fields.needs_id())
        .filter_map(|fields| fields.id)
        .max();

    let mut next_id = match store_max_id.into_iter().chain(batch_max).max() {
        Some(max) if max > 0 => max.checked_add(1),
        _ => Some(FIRST_ID),
    };

    let mut exhausted = Vec::new();
    for (row, fields) in accepted.iter_mut().filter(|(_, fields)| fields.needs_id()) {
        match next_id {
            Some(id) => {
                fields.id = Some(id);
                next_id = id.checked_add(1);
            }
            None => exhausted.push(*row),
        }
    }
    exhausted
}

/// What a finished import did
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub rejected: usize,
    pub warnings: usize,
    /// One message per rejected row
    pub errors: Vec<String>,
    /// Storage keys of the inserted projects, in input order
    #[serde(skip)]
    pub keys: Vec<i64>,
}

/// Plan `rows` against the store and insert the accepted projects
///
/// Rejected rows and coercion warnings are logged and reported; they do
/// not stop the batch. A store failure fails the whole import and nothing
/// is written.
pub async fn run_import(
    store: &ProjectStore,
    rows: Vec<RawRow>,
    rules: &ValidationRules,
    today: NaiveDate,
) -> Result<ImportReport> {
    let store_max_id = store.max_id().await?;
    let plan = plan_import(rows, store_max_id, rules, today);

    for RowWarning { row, warning } in &plan.warnings {
        warn!(row, field = warning.field, "{}", warning);
    }
    for rejection in &plan.rejected {
        warn!(row = rejection.row, id = ?rejection.id, "Row rejected: {}", rejection.message());
    }

    let keys = store.insert_many(&plan.accepted).await?;

    let report = ImportReport {
        total: plan.total_rows(),
        imported: keys.len(),
        rejected: plan.rejected.len(),
        warnings: plan.warnings.len(),
        errors: plan.rejected.iter().map(RowRejection::message).collect(),
        keys,
    };

    info!(
        total = report.total,
        imported = report.imported,
        rejected = report.rejected,
        warnings = report.warnings,
        "Import finished"
    );

    Ok(report)
}
