//! User and friendship repository for database operations.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;

/// Input data for inserting a user.
#[derive(Debug, Clone)]
pub struct UserInput<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub avatar: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub latitude: f64,
    pub longitude: f64,
    pub interests: &'a [String],
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Repository for user and friendship queries.
///
/// Every method runs on the caller's connection, so several calls can share
/// one transaction.
pub struct UserRepository;

impl UserRepository {
    pub async fn insert(conn: &mut PgConnection, input: UserInput<'_>) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_user");
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, avatar, bio, latitude, longitude, interests, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(input.id)
        .bind(input.name)
        .bind(input.avatar)
        .bind(input.bio)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(input.interests)
        .bind(input.created_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, avatar, bio, latitude, longitude, interests, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// Loads users by id in no particular order.
    pub async fn find_by_ids(
        conn: &mut PgConnection,
        ids: &[Uuid],
    ) -> Result<Vec<UserEntity>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("find_users_by_ids");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, avatar, bio, latitude, longitude, interests, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    /// Inserts a friendship; the pair must already be ordered lower id first.
    pub async fn insert_friendship(
        conn: &mut PgConnection,
        user_id: Uuid,
        friend_id: Uuid,
        created_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_friendship");
        let result = sqlx::query(
            "INSERT INTO friendships (user_id, friend_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(created_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Friends of `user_id`, looking at both columns of the pair.
    pub async fn friend_ids(conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("find_friend_ids");
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT friend_id FROM friendships WHERE user_id = $1
            UNION
            SELECT user_id FROM friendships WHERE friend_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }
}
