//! Chat, participant and message repository.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::{ChatEntity, ChatMessageEntity, ChatParticipantEntity};
use crate::metrics::QueryTimer;

/// Repository for chats and their members.
pub struct ChatRepository;

impl ChatRepository {
    pub async fn insert(conn: &mut PgConnection, chat: &ChatEntity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_chat");
        let result = sqlx::query(
            r#"
            INSERT INTO chats (id, action_item_id, venue_id, created_by, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(chat.id)
        .bind(chat.action_item_id)
        .bind(chat.venue_id)
        .bind(chat.created_by)
        .bind(chat.created_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ChatEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chat_by_id");
        let result = sqlx::query_as::<_, ChatEntity>(
            "SELECT id, action_item_id, venue_id, created_by, created_at FROM chats WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_action_item(
        conn: &mut PgConnection,
        action_item_id: Uuid,
    ) -> Result<Option<ChatEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chat_by_action_item");
        let result = sqlx::query_as::<_, ChatEntity>(
            r#"
            SELECT id, action_item_id, venue_id, created_by, created_at
            FROM chats
            WHERE action_item_id = $1
            "#,
        )
        .bind(action_item_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Chats `user_id` participates in, newest first.
    pub async fn find_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<ChatEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chats_for_user");
        let result = sqlx::query_as::<_, ChatEntity>(
            r#"
            SELECT c.id, c.action_item_id, c.venue_id, c.created_by, c.created_at
            FROM chats c
            JOIN chat_participants p ON p.chat_id = c.id
            WHERE p.user_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    /// Adds members; users already in the chat are skipped.
    pub async fn add_participants(
        conn: &mut PgConnection,
        chat_id: Uuid,
        user_ids: &[Uuid],
        joined_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let timer = QueryTimer::new("add_chat_participants");
        let result = sqlx::query(
            r#"
            INSERT INTO chat_participants (chat_id, user_id, joined_at)
            SELECT $1, u, $3 FROM UNNEST($2::uuid[]) AS u
            ON CONFLICT (chat_id, user_id) DO NOTHING
            "#,
        )
        .bind(chat_id)
        .bind(user_ids)
        .bind(joined_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn is_participant(
        conn: &mut PgConnection,
        chat_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("is_chat_participant");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM chat_participants WHERE chat_id = $1 AND user_id = $2)",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    /// Members ordered by join time.
    pub async fn find_participants(
        conn: &mut PgConnection,
        chat_id: Uuid,
    ) -> Result<Vec<ChatParticipantEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chat_participants");
        let result = sqlx::query_as::<_, ChatParticipantEntity>(
            r#"
            SELECT chat_id, user_id, joined_at
            FROM chat_participants
            WHERE chat_id = $1
            ORDER BY joined_at ASC, user_id ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }
}

/// Repository for chat messages.
pub struct ChatMessageRepository;

impl ChatMessageRepository {
    pub async fn insert(conn: &mut PgConnection, message: &ChatMessageEntity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_chat_message");
        let result = sqlx::query(
            r#"
            INSERT INTO chat_messages (id, chat_id, sender_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.chat_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Newest-first page of messages.
    pub async fn list(
        conn: &mut PgConnection,
        chat_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ChatMessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_chat_messages");
        let result = sqlx::query_as::<_, ChatMessageEntity>(
            r#"
            SELECT id, chat_id, sender_id, content, created_at
            FROM chat_messages
            WHERE chat_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(chat_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    pub async fn count(conn: &mut PgConnection, chat_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_chat_messages");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chat_messages WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(conn)
            .await;
        timer.record();
        result
    }
}
