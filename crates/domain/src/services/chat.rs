//! Group chats: explicit creation, messaging and chat lists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::error::{DomainError, StoreError};
use crate::models::chat::{MessagePreview, CHAT_PARTICIPANT_PREVIEW};
use crate::models::{
    Chat, ChatMessage, ChatSummary, ChatWithParticipants, MessagePage, UserSummary, VenueSummary,
};
use crate::ports::SocialStore;

pub struct ChatService {
    store: Arc<dyn SocialStore>,
}

impl ChatService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Creates a chat with the listed participants.
    ///
    /// The creator is only a member when listed.
    pub async fn create_chat(
        &self,
        venue_id: Uuid,
        created_by: Uuid,
        participant_ids: &[Uuid],
        action_item_id: Option<Uuid>,
    ) -> Result<ChatWithParticipants, DomainError> {
        let mut tx = self.store.begin().await?;

        if tx.get_venue(venue_id).await?.is_none() {
            return Err(DomainError::not_found("Venue"));
        }
        if tx.get_user(created_by).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }
        if let Some(item_id) = action_item_id {
            if tx.get_action_item(item_id).await?.is_none() {
                return Err(DomainError::not_found("Action item"));
            }
            if tx.find_chat_for_action_item(item_id).await?.is_some() {
                return Err(DomainError::Conflict(
                    "Action item already has a chat".into(),
                ));
            }
        }

        let mut members: Vec<Uuid> = Vec::with_capacity(participant_ids.len());
        for id in participant_ids {
            if !members.contains(id) {
                members.push(*id);
            }
        }
        let known = tx.get_users(&members).await?;
        if known.len() != members.len() {
            return Err(DomainError::not_found("Participant"));
        }

        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            action_item_id,
            venue_id,
            created_by,
            created_at: now,
        };
        tx.insert_chat(&chat).await.map_err(|e| match e {
            StoreError::Conflict(_) => DomainError::Conflict("Action item already has a chat".into()),
            other => other.into(),
        })?;
        tx.add_chat_participants(chat.id, &members, now).await?;
        tx.commit().await?;

        tracing::info!(
            chat_id = %chat.id,
            venue_id = %venue_id,
            participants = members.len(),
            "Chat created"
        );

        Ok(ChatWithParticipants {
            chat,
            participant_ids: members,
        })
    }

    /// Appends a message from a participant.
    pub async fn send_message(
        &self,
        chat_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<ChatMessage, DomainError> {
        shared::validation::validate_message_content(content).map_err(|e| {
            DomainError::validation(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid message content".to_string()),
            )
        })?;

        let mut tx = self.store.begin().await?;
        if tx.get_chat(chat_id).await?.is_none() {
            return Err(DomainError::not_found("Chat"));
        }
        if !tx.is_chat_participant(chat_id, sender_id).await? {
            return Err(DomainError::unauthorized("Sender is not a chat participant"));
        }

        let message = ChatMessage {
            id: Uuid::new_v4(),
            chat_id,
            sender_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        tx.insert_message(&message).await?;
        tx.commit().await?;

        tracing::debug!(chat_id = %chat_id, message_id = %message.id, "Message sent");
        Ok(message)
    }

    /// Newest-first page of messages.
    pub async fn list_messages(
        &self,
        chat_id: Uuid,
        page: PageRequest,
    ) -> Result<MessagePage, DomainError> {
        let mut tx = self.store.begin().await?;
        if tx.get_chat(chat_id).await?.is_none() {
            return Err(DomainError::not_found("Chat"));
        }

        let messages = tx
            .list_messages(chat_id, i64::from(page.limit()), page.offset())
            .await?;
        let total = tx.count_messages(chat_id).await?;
        tx.commit().await?;

        let has_more = page.offset() + (messages.len() as i64) < total;
        Ok(MessagePage {
            messages,
            total,
            page: page.page(),
            limit: page.limit(),
            has_more,
        })
    }

    /// Chats the user belongs to, most recently active first.
    pub async fn list_user_chats(&self, user_id: Uuid) -> Result<Vec<ChatSummary>, DomainError> {
        let mut tx = self.store.begin().await?;
        if tx.get_user(user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }

        let chats = tx.chats_for_user(user_id).await?;
        let mut summaries = Vec::with_capacity(chats.len());
        for chat in chats {
            let venue = tx.get_venue(chat.venue_id).await?;
            let participants = tx.list_chat_participants(chat.id).await?;
            let preview_ids: Vec<Uuid> = participants
                .iter()
                .take(CHAT_PARTICIPANT_PREVIEW)
                .map(|p| p.user_id)
                .collect();
            let users = tx.get_users(&preview_ids).await?;
            let latest = tx.latest_message(chat.id).await?;

            let last_activity_at: DateTime<Utc> = latest
                .as_ref()
                .map(|m| m.created_at.max(chat.created_at))
                .unwrap_or(chat.created_at);

            summaries.push(ChatSummary {
                chat_id: chat.id,
                action_item_id: chat.action_item_id,
                venue: venue.as_ref().map(VenueSummary::from),
                participants: users.iter().map(UserSummary::from).collect(),
                participant_count: participants.len(),
                last_message: latest.as_ref().map(MessagePreview::from_message),
                last_activity_at,
                created_at: chat.created_at,
            });
        }
        tx.commit().await?;

        summaries.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(summaries)
    }
}
