//! Project CRUD endpoints
//!
//! Create and update bodies are JSON objects keyed by canonical field
//! names or by spreadsheet headers; both go through the same column
//! normalization and coercion as a CSV import.

use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use glaciar_common::api::{ApiResponse, User};
use glaciar_common::db::ProjectQuery;
use glaciar_common::import::{
    apply_row, assemble, normalize_row, raw_row_from_json, validate, CanonicalRow, ImportWarning,
};
use glaciar_common::model::STATUS_OPTIONS;
use glaciar_common::{time, Project};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::{ApiError, ApiJson, ApiPath, ApiQuery};
use crate::AppState;

/// Query parameters for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Substring of cliente or contrato
    pub cliente: Option<String>,
    pub estado: Option<String>,
}

impl ListQuery {
    pub fn to_store_query(&self) -> ProjectQuery {
        ProjectQuery::from_params(self.cliente.as_deref(), self.estado.as_deref())
    }
}

/// Body of `POST /api/proyectos/bulk-delete`
#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub ids: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
    pub requested: usize,
    pub deleted: u64,
}

/// Canonical row from a JSON object body
fn canonical_body(body: &Value) -> Result<CanonicalRow, ApiError> {
    let raw = raw_row_from_json(body)
        .ok_or_else(|| ApiError::BadRequest("Se esperaba un objeto JSON".to_string()))?;
    if raw.is_empty() {
        return Err(ApiError::BadRequest("No se proporcionaron datos".to_string()));
    }
    Ok(normalize_row(raw))
}

fn log_warnings(warnings: &[ImportWarning]) {
    for warning in warnings {
        warn!(field = warning.field, "{}", warning);
    }
}

/// GET /api/status-options
pub async fn status_options() -> Json<ApiResponse<[&'static str; 3]>> {
    Json(ApiResponse::ok(STATUS_OPTIONS))
}

/// GET /api/proyectos?cliente=&estado=
pub async fn list_projects(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = state.store.find(&query.to_store_query()).await?;
    let count = projects.len();
    Ok(Json(ApiResponse::ok(projects).with_count(count)))
}

/// GET /api/proyectos/:id
pub async fn get_project(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state
        .store
        .find_one(id)
        .await?
        .ok_or_else(ApiError::project_not_found)?;
    Ok(Json(ApiResponse::ok(project)))
}

/// POST /api/proyectos
///
/// Missing or zero `id` gets the next free business id.
pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(body): ApiJson<Value>,
) -> Result<(StatusCode, Json<ApiResponse<Project>>), ApiError> {
    let row = canonical_body(&body)?;
    let mut assembled = assemble(&row);
    log_warnings(&assembled.warnings);

    let validation = validate(&assembled.fields, &state.rules, time::today());
    if !validation.is_valid() {
        warn!("Rejected new project: {:?}", validation.messages());
        return Err(ApiError::validation("Datos inválidos", validation.messages()));
    }

    if assembled.fields.needs_id() {
        assembled.fields.id = Some(state.store.next_id().await?);
    }

    let project = state.store.insert_one(&assembled.fields).await?;
    info!("User '{}' created {}", user.username, project);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(project).with_message("Proyecto creado exitosamente")),
    ))
}

/// PUT /api/proyectos/:id
///
/// The body is a patch: fields it names are replaced, the rest are kept.
/// The merged record must pass the same validation as a new project.
pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let row = canonical_body(&body)?;

    let existing = state
        .store
        .find_one(id)
        .await?
        .ok_or_else(ApiError::project_not_found)?;

    let mut fields = existing.fields.clone();
    let warnings = apply_row(&mut fields, &row);
    log_warnings(&warnings);

    let validation = validate(&fields, &state.rules, time::today());
    if !validation.is_valid() {
        warn!("Rejected update of project {}: {:?}", id, validation.messages());
        return Err(ApiError::validation("Datos inválidos", validation.messages()));
    }

    let result = state.store.update_one(id, &fields).await?;
    if result.matched == 0 {
        // Deleted between the lookup and the write
        return Err(ApiError::project_not_found());
    }

    let project = state
        .store
        .find_by_key(existing.key)
        .await?
        .ok_or_else(ApiError::project_not_found)?;
    info!("User '{}' updated {}", user.username, project);

    Ok(Json(
        ApiResponse::ok(project).with_message("Proyecto actualizado exitosamente"),
    ))
}

/// DELETE /api/proyectos/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if state.store.delete_one(id).await? == 0 {
        return Err(ApiError::project_not_found());
    }

    info!("User '{}' deleted project {}", user.username, id);
    Ok(Json(ApiResponse::message("Proyecto eliminado exitosamente")))
}

/// Business id from a JSON number or numeric string
fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// POST /api/proyectos/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<BulkDeleteResult>>, ApiError> {
    if req.ids.is_empty() {
        return Err(ApiError::BadRequest("No se proporcionaron IDs".to_string()));
    }

    let ids = req
        .ids
        .iter()
        .map(|v| parse_id(v).ok_or_else(|| ApiError::BadRequest(format!("ID inválido: {}", v))))
        .collect::<Result<Vec<i64>, _>>()?;

    let deleted = state.store.delete_many(&ids).await?;
    info!(
        "User '{}' bulk-deleted {} projects ({} ids requested)",
        user.username,
        deleted,
        ids.len()
    );

    Ok(Json(
        ApiResponse::ok(BulkDeleteResult {
            requested: ids.len(),
            deleted,
        })
        .with_message(format!("Eliminados {} proyectos exitosamente", deleted)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_id_accepts_numbers_and_strings() {
        assert_eq!(parse_id(&json!(1001)), Some(1001));
        assert_eq!(parse_id(&json!(" 42 ")), Some(42));
        assert_eq!(parse_id(&json!("abc")), None);
        assert_eq!(parse_id(&json!(1.5)), None);
        assert_eq!(parse_id(&json!(null)), None);
    }

    #[test]
    fn test_canonical_body_normalizes_headers() {
        let row = canonical_body(&json!({"Región": "Maule", "Contrato": "X1"})).unwrap();
        assert!(row.contains_key("region"));
        assert!(row.contains_key("contrato"));

        assert!(canonical_body(&json!({})).is_err());
        assert!(canonical_body(&json!([1])).is_err());
    }

    #[test]
    fn test_list_query_ignores_placeholder_status() {
        let query = ListQuery {
            cliente: Some(String::new()),
            estado: Some("Select Status".to_string()),
        };
        assert_eq!(query.to_store_query(), ProjectQuery::all());
    }
}
