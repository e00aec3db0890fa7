//! Action-item endpoints.
//!
//! Every mutating operation names the acting user in the body.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use uuid::Uuid;

use domain::models::{
    ActionItem, ActionItemConfirmation, ActionItemUserRequest, ActionItemView, CompletionOutcome,
    ConfirmOutcome, GoAheadStatus,
};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_action_item_transition, record_chat_created};

/// GET /api/v1/action-items/:action_item_id
pub async fn get_action_item(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ActionItemView>, ApiError> {
    let Path(action_item_id) = path?;
    let view = state.coordinator.get_action_item(action_item_id).await?;
    Ok(Json(view))
}

/// POST /api/v1/action-items/:action_item_id/initiate
///
/// Starts the go-ahead flow. Repeating it returns the existing state.
pub async fn initiate(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActionItemUserRequest>, JsonRejection>,
) -> Result<Json<GoAheadStatus>, ApiError> {
    let Path(action_item_id) = path?;
    let Json(request) = payload?;
    let status = state
        .coordinator
        .initiate(action_item_id, request.user_id)
        .await?;
    Ok(Json(status))
}

/// POST /api/v1/action-items/:action_item_id/confirm
pub async fn confirm(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActionItemUserRequest>, JsonRejection>,
) -> Result<Json<ConfirmOutcome>, ApiError> {
    let Path(action_item_id) = path?;
    let Json(request) = payload?;
    let outcome = state
        .coordinator
        .confirm(action_item_id, request.user_id)
        .await?;

    if outcome.chat_created {
        record_chat_created("go_ahead");
    }
    Ok(Json(outcome))
}

/// POST /api/v1/action-items/:action_item_id/decline
pub async fn decline(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActionItemUserRequest>, JsonRejection>,
) -> Result<Json<ActionItemConfirmation>, ApiError> {
    let Path(action_item_id) = path?;
    let Json(request) = payload?;
    let confirmation = state
        .coordinator
        .decline(action_item_id, request.user_id)
        .await?;
    Ok(Json(confirmation))
}

/// POST /api/v1/action-items/:action_item_id/dismiss
pub async fn dismiss(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActionItemUserRequest>, JsonRejection>,
) -> Result<Json<ActionItem>, ApiError> {
    let Path(action_item_id) = path?;
    let Json(request) = payload?;
    let item = state
        .coordinator
        .dismiss(action_item_id, request.user_id)
        .await?;

    record_action_item_transition("dismissed");
    Ok(Json(item))
}

/// POST /api/v1/action-items/:action_item_id/complete
///
/// Restaurant items also come back with a simulated reservation.
pub async fn complete(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActionItemUserRequest>, JsonRejection>,
) -> Result<Json<CompletionOutcome>, ApiError> {
    let Path(action_item_id) = path?;
    let Json(request) = payload?;
    let outcome = state
        .coordinator
        .complete(action_item_id, request.user_id)
        .await?;

    record_action_item_transition("completed");
    Ok(Json(outcome))
}
