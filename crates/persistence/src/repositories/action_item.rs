//! Action item and go-ahead confirmation repository.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::{ActionItemEntity, ConfirmationEntity};
use crate::metrics::QueryTimer;

const ACTION_ITEM_COLUMNS: &str = "id, venue_id, interested_user_ids, action_type, action_code, \
     description, status, threshold_met, created_at, expires_at, archived_at";

const CONFIRMATION_COLUMNS: &str =
    "id, action_item_id, user_id, initiator_id, status, responded_at, created_at";

/// Repository for action items.
pub struct ActionItemRepository;

impl ActionItemRepository {
    pub async fn insert(conn: &mut PgConnection, item: &ActionItemEntity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_action_item");
        let result = sqlx::query(
            r#"
            INSERT INTO action_items (
                id, venue_id, interested_user_ids, action_type, action_code,
                description, status, threshold_met, created_at, expires_at, archived_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(item.id)
        .bind(item.venue_id)
        .bind(&item.interested_user_ids)
        .bind(&item.action_type)
        .bind(&item.action_code)
        .bind(&item.description)
        .bind(&item.status)
        .bind(item.threshold_met)
        .bind(item.created_at)
        .bind(item.expires_at)
        .bind(item.archived_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ActionItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_action_item_by_id");
        let result = sqlx::query_as::<_, ActionItemEntity>(&format!(
            "SELECT {} FROM action_items WHERE id = $1",
            ACTION_ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Loads an action item and holds its row lock until the transaction ends.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<ActionItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_action_item");
        let result = sqlx::query_as::<_, ActionItemEntity>(&format!(
            "SELECT {} FROM action_items WHERE id = $1 FOR UPDATE",
            ACTION_ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_active_for_venue(
        conn: &mut PgConnection,
        venue_id: Uuid,
    ) -> Result<Option<ActionItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_action_item");
        let result = sqlx::query_as::<_, ActionItemEntity>(&format!(
            "SELECT {} FROM action_items WHERE venue_id = $1 AND status = 'active'",
            ACTION_ITEM_COLUMNS
        ))
        .bind(venue_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: &str,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_action_item_status");
        let result = sqlx::query("UPDATE action_items SET status = $2, archived_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(archived_at)
            .execute(conn)
            .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Active items whose interested snapshot contains `user_id`, newest first.
    pub async fn find_active_for_member(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<ActionItemEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_active_action_items_for_user");
        let result = sqlx::query_as::<_, ActionItemEntity>(&format!(
            r#"
            SELECT {}
            FROM action_items
            WHERE status = 'active' AND $1 = ANY(interested_user_ids)
            ORDER BY created_at DESC, id DESC
            "#,
            ACTION_ITEM_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    /// Expires every active item due at or before `now` in one statement.
    pub async fn expire_due(conn: &mut PgConnection, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("expire_action_items");
        let result = sqlx::query(
            r#"
            UPDATE action_items
            SET status = 'expired', archived_at = $1
            WHERE status = 'active' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(conn)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}

/// Repository for go-ahead confirmations.
pub struct ConfirmationRepository;

impl ConfirmationRepository {
    /// Inserts all rows in a single statement.
    pub async fn insert_many(
        conn: &mut PgConnection,
        rows: &[ConfirmationEntity],
    ) -> Result<(), sqlx::Error> {
        if rows.is_empty() {
            return Ok(());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let items: Vec<Uuid> = rows.iter().map(|r| r.action_item_id).collect();
        let users: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
        let initiators: Vec<Uuid> = rows.iter().map(|r| r.initiator_id).collect();
        let statuses: Vec<String> = rows.iter().map(|r| r.status.clone()).collect();
        let responded: Vec<Option<DateTime<Utc>>> = rows.iter().map(|r| r.responded_at).collect();
        let created: Vec<DateTime<Utc>> = rows.iter().map(|r| r.created_at).collect();

        let timer = QueryTimer::new("insert_confirmations");
        let result = sqlx::query(
            r#"
            INSERT INTO action_item_confirmations (
                id, action_item_id, user_id, initiator_id, status, responded_at, created_at
            )
            SELECT * FROM UNNEST(
                $1::uuid[], $2::uuid[], $3::uuid[], $4::uuid[],
                $5::text[], $6::timestamptz[], $7::timestamptz[]
            )
            "#,
        )
        .bind(&ids)
        .bind(&items)
        .bind(&users)
        .bind(&initiators)
        .bind(&statuses)
        .bind(&responded)
        .bind(&created)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Confirmations for an item, oldest first.
    pub async fn find_by_action_item(
        conn: &mut PgConnection,
        action_item_id: Uuid,
    ) -> Result<Vec<ConfirmationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_confirmations");
        let result = sqlx::query_as::<_, ConfirmationEntity>(&format!(
            r#"
            SELECT {}
            FROM action_item_confirmations
            WHERE action_item_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
            CONFIRMATION_COLUMNS
        ))
        .bind(action_item_id)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    pub async fn find(
        conn: &mut PgConnection,
        action_item_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ConfirmationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_confirmation");
        let result = sqlx::query_as::<_, ConfirmationEntity>(&format!(
            "SELECT {} FROM action_item_confirmations WHERE action_item_id = $1 AND user_id = $2",
            CONFIRMATION_COLUMNS
        ))
        .bind(action_item_id)
        .bind(user_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    pub async fn update_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: &str,
        responded_at: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_confirmation");
        let result = sqlx::query(
            "UPDATE action_item_confirmations SET status = $2, responded_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(responded_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
