//! Interest toggle endpoint.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use domain::models::{ToggleInterestRequest, ToggleResult};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_action_item_created, record_interest_toggled};

/// POST /api/v1/interests/toggle
///
/// Adds the interest when absent, removes it otherwise. An added interest
/// that crosses the venue threshold carries the new action item.
pub async fn toggle_interest(
    State(state): State<AppState>,
    payload: Result<Json<ToggleInterestRequest>, JsonRejection>,
) -> Result<Json<ToggleResult>, ApiError> {
    let Json(request) = payload?;

    let result = state
        .ledger
        .toggle(request.user_id, request.venue_id)
        .await?;

    record_interest_toggled(result.is_added());
    if let ToggleResult::Added {
        action_item: Some(item),
        ..
    } = &result
    {
        record_action_item_created();
        tracing::info!(
            venue_id = %request.venue_id,
            action_item_id = %item.id,
            "Interest toggle created action item"
        );
    }

    Ok(Json(result))
}
