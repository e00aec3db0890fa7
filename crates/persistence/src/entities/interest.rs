//! Interest and activity entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the interests table.
#[derive(Debug, Clone, FromRow)]
pub struct InterestEntity {
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<InterestEntity> for domain::models::Interest {
    fn from(entity: InterestEntity) -> Self {
        Self {
            user_id: entity.user_id,
            venue_id: entity.venue_id,
            created_at: entity.created_at,
        }
    }
}

/// Database row mapping for the activities table.
#[derive(Debug, Clone, FromRow)]
pub struct ActivityEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl From<ActivityEntity> for domain::models::Activity {
    fn from(entity: ActivityEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            venue_id: entity.venue_id,
            action: entity.action,
            created_at: entity.created_at,
        }
    }
}
