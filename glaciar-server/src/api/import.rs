//! Bulk import endpoints
//!
//! Both endpoints run the shared import pipeline: rows that fail
//! validation are skipped and reported, the rest are inserted in one
//! transaction.

use axum::extract::rejection::StringRejection;
use axum::{extract::State, Extension, Json};
use glaciar_common::api::{ApiResponse, User};
use glaciar_common::import::csv::read_rows_from_str;
use glaciar_common::import::{raw_row_from_json, run_import, ImportReport, RawRow};
use glaciar_common::time;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{ApiError, ApiJson};
use crate::AppState;

/// Body of `POST /api/proyectos/bulk-import`
#[derive(Debug, Deserialize)]
pub struct BulkImportRequest {
    #[serde(default)]
    pub proyectos: Vec<Value>,
}

/// Run the pipeline over `rows` and shape the reply
async fn import_rows(
    state: &AppState,
    user: &User,
    source: &str,
    rows: Vec<RawRow>,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    info!("User '{}' importing {} rows from {}", user.username, rows.len(), source);

    let report = run_import(&state.store, rows, &state.rules, time::today()).await?;

    if report.imported == 0 {
        return Err(ApiError::validation(
            "No hay proyectos válidos para importar",
            report.errors,
        ));
    }

    let mut message = format!("Importados {} proyectos exitosamente", report.imported);
    if report.rejected > 0 {
        message.push_str(&format!(" ({} filas omitidas)", report.rejected));
    }

    let details = report.errors.clone();
    Ok(Json(
        ApiResponse::ok(report)
            .with_message(message)
            .with_details(details),
    ))
}

/// POST /api/proyectos/bulk-import
///
/// `{"proyectos": [{"Contrato": "...", "Región": "...", ...}, ...]}`
pub async fn bulk_import(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<BulkImportRequest>,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    if req.proyectos.is_empty() {
        return Err(ApiError::BadRequest(
            "No se proporcionaron datos de proyectos".to_string(),
        ));
    }

    let rows = req
        .proyectos
        .iter()
        .enumerate()
        .map(|(i, item)| {
            raw_row_from_json(item).ok_or_else(|| {
                ApiError::BadRequest(format!("Fila {}: se esperaba un objeto JSON", i + 1))
            })
        })
        .collect::<Result<Vec<RawRow>, _>>()?;

    import_rows(&state, &user, "JSON", rows).await
}

/// POST /api/proyectos/import-csv
///
/// The body is the CSV document itself.
pub async fn import_csv(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    body: Result<String, StringRejection>,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    let rows = read_rows_from_str(&body?)?;
    if rows.is_empty() {
        return Err(ApiError::BadRequest(
            "El archivo CSV no contiene filas".to_string(),
        ));
    }

    import_rows(&state, &user, "CSV", rows).await
}
