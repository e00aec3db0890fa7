//! User and friendship domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action_item::ActionItem;
use super::venue::VenueSummary;

/// Represents a user of the venue-discovery app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// Interest-category tags, e.g. "coffee" or "cocktails".
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Compact user representation embedded in other responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            avatar: u.avatar.clone(),
        }
    }
}

/// Symmetric friendship stored once, lower id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Friendship {
    pub user_id: Uuid,
    pub friend_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// Builds the canonical row for an unordered pair.
    pub fn new(a: Uuid, b: Uuid, created_at: DateTime<Utc>) -> Self {
        let (user_id, friend_id) = if a <= b { (a, b) } else { (b, a) };
        Self {
            user_id,
            friend_id,
            created_at,
        }
    }

    /// Returns the other side of the pair when `id` is a member.
    pub fn other(&self, id: Uuid) -> Option<Uuid> {
        if self.user_id == id {
            Some(self.friend_id)
        } else if self.friend_id == id {
            Some(self.user_id)
        } else {
            None
        }
    }
}

/// Active action item annotated with its venue, as shown on a profile.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileActionItem {
    #[serde(flatten)]
    pub action_item: ActionItem,
    pub venue: VenueSummary,
}

/// Response payload for a user profile.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub friends: Vec<UserSummary>,
    pub interested_venues: Vec<VenueSummary>,
    pub action_items: Vec<ProfileActionItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendship_is_canonical() {
        let a = Uuid::from_u128(2);
        let b = Uuid::from_u128(1);
        let now = Utc::now();

        let f1 = Friendship::new(a, b, now);
        let f2 = Friendship::new(b, a, now);
        assert_eq!(f1, f2);
        assert_eq!(f1.user_id, b);
        assert_eq!(f1.friend_id, a);
    }

    #[test]
    fn test_friendship_other() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let f = Friendship::new(a, b, Utc::now());

        assert_eq!(f.other(a), Some(b));
        assert_eq!(f.other(b), Some(a));
        assert_eq!(f.other(Uuid::from_u128(3)), None);
    }

    #[test]
    fn test_user_summary_from_user() {
        let user = User {
            id: Uuid::nil(),
            name: "Alex".to_string(),
            avatar: Some("https://i.pravatar.cc/150?img=1".to_string()),
            bio: None,
            latitude: 40.73,
            longitude: -73.99,
            interests: vec!["coffee".to_string()],
            created_at: Utc::now(),
        };
        let summary = UserSummary::from(&user);
        assert_eq!(summary.name, "Alex");
        assert_eq!(summary.avatar, user.avatar);
    }
}
