//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use glaciar_common::time;
use serde::Serialize;
use tracing::error;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<i64>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
}

/// GET /api/health
///
/// Does not require a session. Answers 500 when the database is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) = match state.store.count().await {
        Ok(count) => (
            StatusCode::OK,
            DatabaseHealth {
                connected: true,
                projects: Some(count),
            },
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                DatabaseHealth {
                    connected: false,
                    projects: None,
                },
            )
        }
    };

    let body = HealthResponse {
        status: if status.is_success() { "healthy" } else { "error" }.to_string(),
        module: "glaciar-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: time::now(),
        database,
    };

    (status, Json(body))
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/api/health", get(health_check))
}
