//! Group chat models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::user::UserSummary;
use super::venue::VenueSummary;

/// Length of the latest-message preview before truncation.
pub const MESSAGE_PREVIEW_CHARS: usize = 50;

/// Maximum participant summaries shown per chat in a listing.
pub const CHAT_PARTICIPANT_PREVIEW: usize = 5;

/// A group chat, optionally bound to an action item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: Uuid,
    pub action_item_id: Option<Uuid>,
    pub venue_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatParticipant {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

/// Append-only chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a chat.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChatRequest {
    pub venue_id: Uuid,
    pub created_by: Uuid,
    #[validate(length(min = 1, max = 100, message = "participant_ids must contain 1-100 users"))]
    pub participant_ids: Vec<Uuid>,
    pub action_item_id: Option<Uuid>,
}

/// Request payload for sending a message.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SendMessageRequest {
    pub sender_id: Uuid,
    #[validate(custom(function = "shared::validation::validate_message_content"))]
    pub content: String,
}

/// Query parameters for listing messages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// A chat with its participant ids.
#[derive(Debug, Clone, Serialize)]
pub struct ChatWithParticipants {
    #[serde(flatten)]
    pub chat: Chat,
    pub participant_ids: Vec<Uuid>,
}

/// A page of messages, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePage {
    pub messages: Vec<ChatMessage>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

/// Latest-message preview in a chat listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePreview {
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MessagePreview {
    pub fn from_message(message: &ChatMessage) -> Self {
        Self {
            sender_id: message.sender_id,
            content: preview_text(&message.content),
            created_at: message.created_at,
        }
    }
}

/// Chat row in a user's chat list.
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    pub chat_id: Uuid,
    pub action_item_id: Option<Uuid>,
    pub venue: Option<VenueSummary>,
    pub participants: Vec<UserSummary>,
    pub participant_count: usize,
    pub last_message: Option<MessagePreview>,
    pub last_activity_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Truncates message text to the preview length, appending "..." when cut.
pub fn preview_text(content: &str) -> String {
    if content.chars().count() > MESSAGE_PREVIEW_CHARS {
        let head: String = content.chars().take(MESSAGE_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}
