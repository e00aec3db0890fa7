//! Social feed models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserSummary;
use super::venue::VenueSummary;

/// Maximum friend summaries listed per highlighted venue.
pub const HIGHLIGHT_FRIEND_CAP: usize = 10;

/// Query parameters for the social feed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub since: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// One friend activity in the feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub activity_id: Uuid,
    pub user: UserSummary,
    pub venue: VenueSummary,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// A venue many friends are currently interested in.
#[derive(Debug, Clone, Serialize)]
pub struct HighlightedVenue {
    pub venue: VenueSummary,
    /// Most recent first, capped at `HIGHLIGHT_FRIEND_CAP`.
    pub friends_interested: Vec<UserSummary>,
    pub friend_count: usize,
    pub total_interested: i64,
    pub latest_interest_at: DateTime<Utc>,
}

/// Paginated friend activity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FriendActivityPage {
    pub items: Vec<FeedItem>,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
    /// Activities after `since`; only present when `since` was given.
    pub new_count: Option<i64>,
}

/// Full social feed response.
#[derive(Debug, Clone, Serialize)]
pub struct SocialFeed {
    #[serde(flatten)]
    pub activity: FriendActivityPage,
    pub highlighted_venues: Vec<HighlightedVenue>,
}
