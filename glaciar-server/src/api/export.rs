//! CSV export endpoint

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use glaciar_common::db::ProjectQuery;
use glaciar_common::import::csv::{write_projects, BooleanFormat, DateFormat, ExportOptions};
use glaciar_common::time;
use serde::Deserialize;
use tracing::info;

use super::{ApiError, ApiQuery};
use crate::AppState;

/// Query parameters for export
///
/// `fields` is a comma separated list of canonical keys; empty means all.
/// The listing filters apply as well.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub fields: Option<String>,
    pub boolean_format: Option<String>,
    pub date_format: Option<String>,
    pub cliente: Option<String>,
    pub estado: Option<String>,
}

impl ExportQuery {
    pub fn options(&self) -> Result<ExportOptions, ApiError> {
        let mut options = ExportOptions::default();

        if let Some(format) = self.boolean_format.as_deref().filter(|s| !s.is_empty()) {
            options.boolean_format = format.parse::<BooleanFormat>()?;
        }
        if let Some(format) = self.date_format.as_deref().filter(|s| !s.is_empty()) {
            options.date_format = format.parse::<DateFormat>()?;
        }

        let keys: Vec<&str> = self
            .fields
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect();

        Ok(options.with_fields(&keys[..])?)
    }
}

/// GET /api/proyectos/export.csv
pub async fn export_csv(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    let options = query.options()?;
    let filter = ProjectQuery::from_params(query.cliente.as_deref(), query.estado.as_deref());
    let projects = state.store.find(&filter).await?;

    let mut body = Vec::new();
    let written = write_projects(&mut body, &projects, &options)?;
    info!("Exported {} projects ({} columns)", written, options.fields.len());

    let filename = format!("proyectos_{}.csv", time::today().format("%d-%m-%Y"));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
