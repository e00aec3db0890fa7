//! Venue repository for database operations.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::entities::VenueEntity;
use crate::metrics::QueryTimer;

const VENUE_COLUMNS: &str =
    "id, name, category, description, image, images, address, latitude, longitude, created_at";

/// Repository for venue queries.
pub struct VenueRepository;

impl VenueRepository {
    pub async fn insert(conn: &mut PgConnection, venue: &VenueEntity) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_venue");
        let result = sqlx::query(
            r#"
            INSERT INTO venues (
                id, name, category, description, image, images,
                address, latitude, longitude, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(venue.id)
        .bind(&venue.name)
        .bind(&venue.category)
        .bind(&venue.description)
        .bind(&venue.image)
        .bind(&venue.images)
        .bind(&venue.address)
        .bind(venue.latitude)
        .bind(venue.longitude)
        .bind(venue.created_at)
        .execute(conn)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<VenueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_venue_by_id");
        let result = sqlx::query_as::<_, VenueEntity>(&format!(
            "SELECT {} FROM venues WHERE id = $1",
            VENUE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(conn)
        .await;
        timer.record();
        result
    }

    /// All venues, ordered by name.
    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<VenueEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_venues");
        let result = sqlx::query_as::<_, VenueEntity>(&format!(
            "SELECT {} FROM venues ORDER BY name ASC, id ASC",
            VENUE_COLUMNS
        ))
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }

    /// Loads venues by id in no particular order.
    pub async fn find_by_ids(
        conn: &mut PgConnection,
        ids: &[Uuid],
    ) -> Result<Vec<VenueEntity>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let timer = QueryTimer::new("find_venues_by_ids");
        let result = sqlx::query_as::<_, VenueEntity>(&format!(
            "SELECT {} FROM venues WHERE id = ANY($1)",
            VENUE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(conn)
        .await;
        timer.record();
        result
    }
}
