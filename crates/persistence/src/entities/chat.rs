//! Chat entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the chats table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatEntity {
    pub id: Uuid,
    pub action_item_id: Option<Uuid>,
    pub venue_id: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<ChatEntity> for domain::models::Chat {
    fn from(entity: ChatEntity) -> Self {
        Self {
            id: entity.id,
            action_item_id: entity.action_item_id,
            venue_id: entity.venue_id,
            created_by: entity.created_by,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the chat_participants table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatParticipantEntity {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

impl From<ChatParticipantEntity> for domain::models::ChatParticipant {
    fn from(entity: ChatParticipantEntity) -> Self {
        Self {
            chat_id: entity.chat_id,
            user_id: entity.user_id,
            joined_at: entity.joined_at,
        }
    }
}

/// Database row mapping for the chat_messages table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageEntity {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessageEntity> for domain::models::ChatMessage {
    fn from(entity: ChatMessageEntity) -> Self {
        Self {
            id: entity.id,
            chat_id: entity.chat_id,
            sender_id: entity.sender_id,
            content: entity.content,
            created_at: entity.created_at,
        }
    }
}
