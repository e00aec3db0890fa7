//! User and friendship entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UserEntity> for domain::models::User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            avatar: entity.avatar,
            bio: entity.bio,
            latitude: entity.latitude,
            longitude: entity.longitude,
            interests: entity.interests,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the friendships table.
#[derive(Debug, Clone, FromRow)]
pub struct FriendshipEntity {
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FriendshipEntity> for domain::models::Friendship {
    fn from(entity: FriendshipEntity) -> Self {
        domain::models::Friendship::new(entity.user_id, entity.friend_id, entity.created_at)
    }
}
