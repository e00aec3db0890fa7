//! Venue domain models and catalogue DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::action_item::ActionItem;
use super::user::UserSummary;

/// Represents a venue users can be interested in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Compact venue representation embedded in other responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub image: Option<String>,
    pub address: String,
}

impl From<&Venue> for VenueSummary {
    fn from(v: &Venue) -> Self {
        Self {
            id: v.id,
            name: v.name.clone(),
            category: v.category.clone(),
            image: v.image.clone(),
            address: v.address.clone(),
        }
    }
}

/// Sort order for venue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueSortBy {
    /// Nearest first (requires a user).
    Distance,
    /// Most interested users first.
    Popularity,
    /// Most interested friends first (requires a user).
    Friends,
    /// Alphabetical.
    Name,
}

impl VenueSortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            VenueSortBy::Distance => "distance",
            VenueSortBy::Popularity => "popularity",
            VenueSortBy::Friends => "friends",
            VenueSortBy::Name => "name",
        }
    }

    /// Whether this ordering is relative to a requesting user.
    pub fn needs_user(&self) -> bool {
        matches!(self, VenueSortBy::Distance | VenueSortBy::Friends)
    }
}

impl FromStr for VenueSortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "distance" => Ok(VenueSortBy::Distance),
            "popularity" => Ok(VenueSortBy::Popularity),
            "friends" => Ok(VenueSortBy::Friends),
            "name" => Ok(VenueSortBy::Name),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

impl fmt::Display for VenueSortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query parameters for listing venues.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ListVenuesQuery {
    /// Requesting user, enables distance and friend-relative filters.
    pub user_id: Option<Uuid>,

    /// Comma-separated category list.
    #[validate(length(max = 500, message = "categories must be at most 500 characters"))]
    pub categories: Option<String>,

    #[validate(custom(function = "crate::models::venue::validate_optional_distance"))]
    pub max_distance: Option<f64>,

    #[validate(range(max = 1000, message = "min_friend_interest must be at most 1000"))]
    pub min_friend_interest: Option<u32>,

    #[serde(default)]
    pub only_interested: bool,

    #[serde(default)]
    pub exclude_interested: bool,

    pub sort_by: Option<VenueSortBy>,
}

/// Validates optional distance filter.
pub fn validate_optional_distance(km: f64) -> Result<(), validator::ValidationError> {
    shared::validation::validate_distance_km(km)
}

/// Normalized venue filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueFilters {
    /// Lowercased categories; empty means all.
    pub categories: Vec<String>,
    pub max_distance_km: Option<f64>,
    pub min_friend_interest: Option<u32>,
    pub only_interested: bool,
    pub exclude_interested: bool,
    pub sort_by: Option<VenueSortBy>,
}

impl VenueFilters {
    /// Whether any filter or ordering depends on a requesting user.
    pub fn needs_user(&self) -> bool {
        self.max_distance_km.is_some()
            || self.min_friend_interest.is_some()
            || self.only_interested
            || self.exclude_interested
            || self.sort_by.map(|s| s.needs_user()).unwrap_or(false)
    }
}

impl From<&ListVenuesQuery> for VenueFilters {
    fn from(q: &ListVenuesQuery) -> Self {
        let categories = q
            .categories
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            categories,
            max_distance_km: q.max_distance,
            min_friend_interest: q.min_friend_interest,
            only_interested: q.only_interested,
            exclude_interested: q.exclude_interested,
            sort_by: q.sort_by,
        }
    }
}

/// A venue row in a catalogue listing.
#[derive(Debug, Clone, Serialize)]
pub struct VenueListItem {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub total_interested: usize,
    pub friends_interested: usize,
    pub user_interested: bool,
}

/// Response for listing venues.
#[derive(Debug, Clone, Serialize)]
pub struct ListVenuesResponse {
    pub venues: Vec<VenueListItem>,
    pub total: usize,
}

/// Query parameters for venue detail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VenueDetailQuery {
    pub user_id: Option<Uuid>,
}

/// Response payload for a venue detail view.
#[derive(Debug, Clone, Serialize)]
pub struct VenueDetail {
    pub venue: Venue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub total_interested: usize,
    pub interested_users: Vec<UserSummary>,
    pub friends_interested: Vec<UserSummary>,
    pub user_interested: bool,
    pub active_action_item: Option<ActionItem>,
}
