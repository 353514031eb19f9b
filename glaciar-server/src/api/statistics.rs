//! Portfolio statistics endpoint

use axum::{extract::State, Json};
use glaciar_common::api::ApiResponse;
use glaciar_common::db::Statistics;

use super::ApiError;
use crate::AppState;

/// GET /api/statistics
///
/// Totals, average amount and a per-status breakdown.
pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Statistics>>, ApiError> {
    let stats = state.store.statistics().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
