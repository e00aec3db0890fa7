//! Action item and confirmation entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{ActionItemStatus, ActionType, ConfirmationStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the action_items table.
#[derive(Debug, Clone, FromRow)]
pub struct ActionItemEntity {
    pub id: Uuid,
    pub venue_id: Uuid,
    pub interested_user_ids: Vec<Uuid>,
    pub action_type: String,
    pub action_code: String,
    pub description: String,
    pub status: String,
    pub threshold_met: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ActionItemEntity {
    /// Convert to domain model.
    ///
    /// Unknown status strings are read as expired so a corrupt row can
    /// never be acted on.
    pub fn into_domain(self) -> domain::models::ActionItem {
        let action_type = self
            .action_type
            .parse::<ActionType>()
            .unwrap_or(ActionType::VisitVenue);
        let status = self
            .status
            .parse::<ActionItemStatus>()
            .unwrap_or(ActionItemStatus::Expired);

        domain::models::ActionItem {
            id: self.id,
            venue_id: self.venue_id,
            interested_user_ids: self.interested_user_ids,
            action_type,
            action_code: self.action_code,
            description: self.description,
            status,
            threshold_met: self.threshold_met,
            created_at: self.created_at,
            expires_at: self.expires_at,
            archived_at: self.archived_at,
        }
    }
}

impl From<ActionItemEntity> for domain::models::ActionItem {
    fn from(entity: ActionItemEntity) -> Self {
        entity.into_domain()
    }
}

/// Database row mapping for the action_item_confirmations table.
#[derive(Debug, Clone, FromRow)]
pub struct ConfirmationEntity {
    pub id: Uuid,
    pub action_item_id: Uuid,
    pub user_id: Uuid,
    pub initiator_id: Uuid,
    pub status: String,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<ConfirmationEntity> for domain::models::ActionItemConfirmation {
    fn from(entity: ConfirmationEntity) -> Self {
        Self {
            id: entity.id,
            action_item_id: entity.action_item_id,
            user_id: entity.user_id,
            initiator_id: entity.initiator_id,
            status: entity
                .status
                .parse::<ConfirmationStatus>()
                .unwrap_or(ConfirmationStatus::Pending),
            responded_at: entity.responded_at,
            created_at: entity.created_at,
        }
    }
}
