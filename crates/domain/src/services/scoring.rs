//! Multi-factor venue scorer.
//!
//! A score in `[0, 10]` is the sum of four components:
//!
//! | component  | max  | signal                                   |
//! |------------|------|------------------------------------------|
//! | popularity | 3.0  | interested users other than the viewer   |
//! | category   | 2.5  | viewer interest tags vs venue category   |
//! | friends    | 2.5  | interested friends                       |
//! | proximity  | 2.0  | tiered distance                          |
//!
//! Counts saturate at three. The viewer's own interest is never an input, so
//! toggling it leaves the viewer's score for that venue unchanged.

use crate::models::{ComponentScore, ScoreBreakdown, VenueScore};

use super::proximity::{distance_phrase, proximity_score, round1};

pub const POPULARITY_WEIGHT: f64 = 3.0;
pub const CATEGORY_WEIGHT: f64 = 2.5;
pub const FRIENDS_WEIGHT: f64 = 2.5;
pub const PROXIMITY_WEIGHT: f64 = 2.0;

/// Count at which popularity and friend signals saturate.
pub const SATURATION_COUNT: f64 = 3.0;

/// Venues at most this far away get a distance phrase in the reason.
pub const NEARBY_KM: f64 = 2.0;

pub const POPULAR_PHRASE: &str = "Popular venue";
pub const CATEGORY_PHRASE: &str = "Matches your interests";
pub const FALLBACK_REASON: &str = "New venue to explore";

/// Inputs for scoring one venue for one viewer.
#[derive(Debug, Clone, Copy)]
pub struct ScoreInput<'a> {
    pub user_interests: &'a [String],
    pub venue_category: &'a str,
    /// Interested users excluding the viewer.
    pub other_interest_count: usize,
    pub friend_interest_count: usize,
    pub distance_km: f64,
}

/// Case-insensitive substring match in either direction.
pub fn category_matches(user_interests: &[String], venue_category: &str) -> bool {
    let category = venue_category.to_lowercase();
    user_interests.iter().any(|tag| {
        let tag = tag.trim().to_lowercase();
        !tag.is_empty() && (category.contains(&tag) || tag.contains(&category))
    })
}

fn saturating(count: usize, weight: f64) -> f64 {
    (count as f64 / SATURATION_COUNT).min(1.0) * weight
}

/// Scores a venue for a viewer.
pub fn score_venue(input: &ScoreInput<'_>) -> VenueScore {
    let popularity = saturating(input.other_interest_count, POPULARITY_WEIGHT);
    let category_match = category_matches(input.user_interests, input.venue_category);
    let category = if category_match { CATEGORY_WEIGHT } else { 0.0 };
    let friends = saturating(input.friend_interest_count, FRIENDS_WEIGHT);
    let proximity = proximity_score(input.distance_km) * PROXIMITY_WEIGHT;

    let mut phrases = Vec::new();
    if input.other_interest_count as f64 >= SATURATION_COUNT {
        phrases.push(POPULAR_PHRASE.to_string());
    }
    if category_match {
        phrases.push(CATEGORY_PHRASE.to_string());
    }
    if input.distance_km <= NEARBY_KM {
        phrases.push(distance_phrase(input.distance_km));
    }
    let reason = if phrases.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        phrases.join(", ")
    };

    VenueScore {
        score: round1(popularity + category + friends + proximity),
        reason,
        breakdown: breakdown(popularity, category, friends, proximity),
    }
}

/// Derives the per-component breakdown from the raw points.
///
/// Points are rounded to two decimals, percentages to one. All percentages
/// are zero when the total is zero.
pub fn breakdown(popularity: f64, category: f64, friends: f64, proximity: f64) -> ScoreBreakdown {
    let total = popularity + category + friends + proximity;
    let component = |points: f64| ComponentScore {
        points: (points * 100.0).round() / 100.0,
        percentage: if total > 0.0 {
            round1(points / total * 100.0)
        } else {
            0.0
        },
    };

    ScoreBreakdown {
        popularity: component(popularity),
        category: component(category),
        friends: component(friends),
        proximity: component(proximity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_category_matching() {
        assert!(category_matches(&tags(&["coffee"]), "Coffee Shop"));
        assert!(category_matches(&tags(&["cocktail bars"]), "Bar"));
        assert!(category_matches(&tags(&["MUSEUM"]), "museum"));
        assert!(!category_matches(&tags(&["sushi"]), "Bar"));
        assert!(!category_matches(&tags(&[""]), "Bar"));
        assert!(!category_matches(&[], "Bar"));
    }

    #[test]
    fn test_maximum_score_is_ten() {
        let interests = tags(&["bar"]);
        let score = score_venue(&ScoreInput {
            user_interests: &interests,
            venue_category: "Cocktail Bar",
            other_interest_count: 10,
            friend_interest_count: 4,
            distance_km: 0.4,
        });
        assert_eq!(score.score, 10.0);
        assert_eq!(score.reason, "Popular venue, Matches your interests, 0.4 km away");
    }

    #[test]
    fn test_minimum_score_and_fallback_reason() {
        let score = score_venue(&ScoreInput {
            user_interests: &[],
            venue_category: "Museum",
            other_interest_count: 0,
            friend_interest_count: 0,
            distance_km: 12.0,
        });
        assert_eq!(score.score, 0.4);
        assert_eq!(score.reason, FALLBACK_REASON);
        assert_eq!(score.breakdown.proximity.percentage, 100.0);
        assert_eq!(score.breakdown.popularity.percentage, 0.0);
    }

    #[test]
    fn test_partial_counts_and_rounding() {
        let score = score_venue(&ScoreInput {
            user_interests: &[],
            venue_category: "Museum",
            other_interest_count: 1,
            friend_interest_count: 1,
            distance_km: 4.0,
        });
        // 1.0 + 0.0 + 0.8333 + 1.2
        assert_eq!(score.score, 3.0);
        assert_eq!(score.breakdown.friends.points, 0.83);
        assert_eq!(score.reason, FALLBACK_REASON);
    }

    #[test]
    fn test_popular_phrase_requires_saturation() {
        let input = |others| ScoreInput {
            user_interests: &[],
            venue_category: "Museum",
            other_interest_count: others,
            friend_interest_count: 0,
            distance_km: 20.0,
        };
        assert_eq!(score_venue(&input(2)).reason, FALLBACK_REASON);
        assert_eq!(score_venue(&input(3)).reason, POPULAR_PHRASE);
    }

    #[test]
    fn test_distance_phrase_boundary() {
        let input = |km| ScoreInput {
            user_interests: &[],
            venue_category: "Museum",
            other_interest_count: 0,
            friend_interest_count: 0,
            distance_km: km,
        };
        assert_eq!(score_venue(&input(2.0)).reason, "2.0 km away");
        assert_eq!(score_venue(&input(2.1)).reason, FALLBACK_REASON);
    }

    #[test]
    fn test_breakdown_percentages_sum_to_hundred() {
        let b = breakdown(3.0, 2.5, 2.5, 2.0);
        assert_eq!(b.popularity.percentage, 30.0);
        assert_eq!(b.category.percentage, 25.0);
        assert_eq!(b.friends.percentage, 25.0);
        assert_eq!(b.proximity.percentage, 20.0);
    }

    #[test]
    fn test_breakdown_all_zero() {
        let b = breakdown(0.0, 0.0, 0.0, 0.0);
        assert_eq!(b.popularity.percentage, 0.0);
        assert_eq!(b.proximity.points, 0.0);
    }

    #[test]
    fn test_score_stays_within_bounds() {
        let interests = tags(&["bar", "coffee"]);
        for others in 0..6 {
            for friends in 0..6 {
                for km in [0.0, 1.5, 3.5, 6.0, 20.0] {
                    let s = score_venue(&ScoreInput {
                        user_interests: &interests,
                        venue_category: "Bar",
                        other_interest_count: others,
                        friend_interest_count: friends,
                        distance_km: km,
                    });
                    assert!((0.0..=10.0).contains(&s.score));
                }
            }
        }
    }
}
