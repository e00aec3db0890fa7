//! Interest ledger models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action_item::ActionItem;

/// Activity tag written alongside every interest.
pub const ACTIVITY_INTERESTED: &str = "interested";

/// A user's interest in a venue. Unique per (user, venue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Audit trail entry mirroring an interest, consumed by the social feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Builds the "interested" activity paired with `interest`.
    pub fn interested(interest: &Interest) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: interest.user_id,
            venue_id: interest.venue_id,
            action: ACTIVITY_INTERESTED.to_string(),
            created_at: interest.created_at,
        }
    }
}

/// Request payload for toggling interest.
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleInterestRequest {
    pub user_id: Uuid,
    pub venue_id: Uuid,
}

/// Outcome of a toggle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToggleResult {
    /// Interest recorded; carries the action item if this toggle crossed the threshold.
    Added {
        interest: Interest,
        action_item: Option<ActionItem>,
    },
    /// Interest removed.
    Removed { user_id: Uuid, venue_id: Uuid },
}

impl ToggleResult {
    pub fn is_added(&self) -> bool {
        matches!(self, ToggleResult::Added { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_mirrors_interest() {
        let interest = Interest {
            user_id: Uuid::from_u128(1),
            venue_id: Uuid::from_u128(2),
            created_at: Utc::now(),
        };
        let activity = Activity::interested(&interest);
        assert_eq!(activity.user_id, interest.user_id);
        assert_eq!(activity.venue_id, interest.venue_id);
        assert_eq!(activity.action, "interested");
        assert_eq!(activity.created_at, interest.created_at);
    }

    #[test]
    fn test_toggle_result_serialization() {
        let removed = ToggleResult::Removed {
            user_id: Uuid::nil(),
            venue_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&removed).unwrap();
        assert_eq!(json["status"], "removed");
        assert!(!removed.is_added());

        let added = ToggleResult::Added {
            interest: Interest {
                user_id: Uuid::nil(),
                venue_id: Uuid::nil(),
                created_at: Utc::now(),
            },
            action_item: None,
        };
        let json = serde_json::to_value(&added).unwrap();
        assert_eq!(json["status"], "added");
        assert!(json["action_item"].is_null());
        assert!(added.is_added());
    }

    #[test]
    fn test_toggle_request_deserialization() {
        let json = r#"{
            "user_id": "550e8400-e29b-41d4-a716-446655440000",
            "venue_id": "550e8400-e29b-41d4-a716-446655440001"
        }"#;
        let req: ToggleInterestRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req.venue_id.to_string(),
            "550e8400-e29b-41d4-a716-446655440001"
        );

        assert!(serde_json::from_str::<ToggleInterestRequest>(
            r#"{"user_id": "not-a-uuid", "venue_id": "also-not"}"#
        )
        .is_err());
    }
}
