//! Administrative maintenance endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use tracing::info;

use domain::models::ExpireSweepResponse;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_action_items_expired;

/// POST /api/v1/admin/action-items/expire
///
/// Runs the expiry sweep on demand. Safe to repeat.
pub async fn expire_action_items(
    State(state): State<AppState>,
) -> Result<Json<ExpireSweepResponse>, ApiError> {
    let swept_at = Utc::now();
    let expired = state.coordinator.expire(swept_at).await?;

    record_action_items_expired(expired);
    info!(expired, "Admin expire sweep completed");

    Ok(Json(ExpireSweepResponse { expired, swept_at }))
}
