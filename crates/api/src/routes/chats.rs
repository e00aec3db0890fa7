//! Group chat endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use domain::models::{
    ChatMessage, ChatWithParticipants, CreateChatRequest, ListMessagesQuery, MessagePage,
    SendMessageRequest,
};
use shared::pagination::{PageRequest, DEFAULT_PAGE_SIZE};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_chat_created, record_message_sent};

/// POST /api/v1/chats
pub async fn create_chat(
    State(state): State<AppState>,
    payload: Result<Json<CreateChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatWithParticipants>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let chat = state
        .chats
        .create_chat(
            request.venue_id,
            request.created_by,
            &request.participant_ids,
            request.action_item_id,
        )
        .await?;

    record_chat_created("explicit");
    Ok((StatusCode::CREATED, Json(chat)))
}

/// POST /api/v1/chats/:chat_id/messages
pub async fn send_message(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatMessage>), ApiError> {
    let Path(chat_id) = path?;
    let Json(request) = payload?;
    request.validate()?;

    let message = state
        .chats
        .send_message(chat_id, request.sender_id, &request.content)
        .await?;

    record_message_sent();
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/v1/chats/:chat_id/messages
///
/// Newest first.
pub async fn list_messages(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListMessagesQuery>, QueryRejection>,
) -> Result<Json<MessagePage>, ApiError> {
    let Path(chat_id) = path?;
    let Query(query) = query?;
    let page = PageRequest::new(query.page, query.limit, DEFAULT_PAGE_SIZE)?;
    let messages = state.chats.list_messages(chat_id, page).await?;
    Ok(Json(messages))
}
