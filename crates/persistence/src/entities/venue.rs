//! Venue entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the venues table.
#[derive(Debug, Clone, FromRow)]
pub struct VenueEntity {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: Option<String>,
    pub images: Vec<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

impl From<VenueEntity> for domain::models::Venue {
    fn from(entity: VenueEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            category: entity.category,
            description: entity.description,
            image: entity.image,
            images: entity.images,
            address: entity.address,
            latitude: entity.latitude,
            longitude: entity.longitude,
            created_at: entity.created_at,
        }
    }
}

/// Interested-user count for one venue.
#[derive(Debug, Clone, FromRow)]
pub struct VenueInterestCountEntity {
    pub venue_id: Uuid,
    pub interested: i64,
}
