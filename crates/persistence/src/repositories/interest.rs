//! Interest and activity repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::{ActivityEntity, InterestEntity, VenueInterestCountEntity};
use crate::metrics::QueryTimer;

/// Repository for interests and the activity log.
pub struct InterestRepository;

impl InterestRepository {
    pub async fn find(
        conn: &mut PgConnection,
        user_id: Uuid,
        venue_id: Uuid,
    ) -> Result<Option<InterestEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_interest");
        let result = sqlx::query_as::<_, InterestEntity>(
            r#"
            SELECT user_id, venue_id, created_at
            FROM interests
            WHERE user_id = $1 AND venue_id = $2
            "#,
        )
        .bind(user_id)
        .bind(venue_id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    pub async fn insert(
        conn: &mut PgConnection,
        user_id: Uuid,
        venue_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_interest");
        let result = sqlx::query(
            "INSERT INTO interests (user_id, venue_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(venue_id)
        .bind(created_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Returns true if a row was removed.
    pub async fn delete(
        conn: &mut PgConnection,
        user_id: Uuid,
        venue_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_interest");
        let result = sqlx::query("DELETE FROM interests WHERE user_id = $1 AND venue_id = $2")
            .bind(user_id)
            .bind(venue_id)
            .execute(conn)
            .await;
        timer.record();
        result.map(|r| r.rows_affected() > 0)
    }

    /// Interested users of a venue, oldest interest first.
    pub async fn user_ids_for_venue(
        conn: &mut PgConnection,
        venue_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_interested_user_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM interests
            WHERE venue_id = $1
            ORDER BY created_at ASC, user_id ASC
            "#,
        )
        .bind(venue_id)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    pub async fn count_for_venue(conn: &mut PgConnection, venue_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_interested");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT user_id) FROM interests WHERE venue_id = $1",
        )
        .bind(venue_id)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }

    pub async fn counts_by_venue(
        conn: &mut PgConnection,
    ) -> Result<Vec<VenueInterestCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("count_interest_by_venue");
        let result = sqlx::query_as::<_, VenueInterestCountEntity>(
            r#"
            SELECT venue_id, COUNT(DISTINCT user_id) AS interested
            FROM interests
            GROUP BY venue_id
            "#,
        )
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    /// Venues a user is interested in, most recent first.
    pub async fn venue_ids_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_interest_venue_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT venue_id
            FROM interests
            WHERE user_id = $1
            ORDER BY created_at DESC, venue_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_users(
        conn: &mut PgConnection,
        user_ids: &[Uuid],
    ) -> Result<Vec<InterestEntity>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("find_interests_by_users");
        let result = sqlx::query_as::<_, InterestEntity>(
            r#"
            SELECT user_id, venue_id, created_at
            FROM interests
            WHERE user_id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }
}

/// Repository for the activity log.
pub struct ActivityRepository;

impl ActivityRepository {
    pub async fn insert(conn: &mut PgConnection, activity: &ActivityEntity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_activity");
        let result = sqlx::query(
            r#"
            INSERT INTO activities (id, user_id, venue_id, action, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(activity.id)
        .bind(activity.user_id)
        .bind(activity.venue_id)
        .bind(&activity.action)
        .bind(activity.created_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn delete_for(
        conn: &mut PgConnection,
        user_id: Uuid,
        venue_id: Uuid,
        action: &str,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_activities");
        let result = sqlx::query(
            "DELETE FROM activities WHERE user_id = $1 AND venue_id = $2 AND action = $3",
        )
        .bind(user_id)
        .bind(venue_id)
        .bind(action)
        .execute(conn)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Newest-first page of activities, optionally only those after `since`.
    pub async fn list(
        conn: &mut PgConnection,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ActivityEntity>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("list_activities");
        let result = sqlx::query_as::<_, ActivityEntity>(
            r#"
            SELECT id, user_id, venue_id, action, created_at
            FROM activities
            WHERE user_id = ANY($1)
              AND action = $2
              AND ($3::timestamptz IS NULL OR created_at > $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_ids)
        .bind(action)
        .bind(since)
        .bind(limit)
        .bind(offset)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    pub async fn count(
        conn: &mut PgConnection,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<i64, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let timer = QueryTimer::new("count_activities");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM activities
            WHERE user_id = ANY($1)
              AND action = $2
              AND ($3::timestamptz IS NULL OR created_at > $3)
            "#,
        )
        .bind(user_ids)
        .bind(action)
        .bind(since)
        .fetch_one(conn)
        .await;
        timer.record();
        result
    }
}
