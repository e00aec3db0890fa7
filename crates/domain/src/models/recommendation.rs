//! Recommendation models.

use serde::Serialize;

use super::venue::Venue;

/// Points and share of the total for one scoring component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentScore {
    pub points: f64,
    pub percentage: f64,
}

/// Per-component breakdown of a venue score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub popularity: ComponentScore,
    pub category: ComponentScore,
    pub friends: ComponentScore,
    pub proximity: ComponentScore,
}

/// Scored venue with its rationale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueScore {
    /// Total in `[0, 10]`, rounded to one decimal.
    pub score: f64,
    pub reason: String,
    pub breakdown: ScoreBreakdown,
}

/// One entry of a user's recommendation list.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub venue: Venue,
    pub score: f64,
    pub reason: String,
    pub breakdown: ScoreBreakdown,
    pub already_interested: bool,
    pub friends_interested: usize,
    pub total_interested: usize,
    pub distance_km: f64,
}

/// Response for a recommendation list.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub total: usize,
}
