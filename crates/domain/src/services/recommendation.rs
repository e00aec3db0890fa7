//! Per-user recommendation lists.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::DomainError;
use crate::models::Recommendation;
use crate::ports::SocialStore;

use super::proximity::haversine_distance;
use super::scoring::{score_venue, ScoreInput};

pub struct RecommendationService {
    store: Arc<dyn SocialStore>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Scores every venue for `user_id`, highest score first.
    ///
    /// Ties keep name order. Whether the user is already interested has no
    /// effect on position.
    pub async fn get_recommendations(&self, user_id: Uuid) -> Result<Vec<Recommendation>, DomainError> {
        let mut tx = self.store.begin().await?;
        let user = tx
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let venues = tx.list_venues().await?;
        let totals = tx.interest_counts().await?;
        let own: HashSet<Uuid> = tx.venue_ids_for_user(user_id).await?.into_iter().collect();
        let friend_ids = tx.friend_ids(user_id).await?;
        let friend_interests = if friend_ids.is_empty() {
            Vec::new()
        } else {
            tx.interests_by_users(&friend_ids).await?
        };
        tx.commit().await?;

        let mut friend_counts: HashMap<Uuid, usize> = HashMap::new();
        for interest in &friend_interests {
            *friend_counts.entry(interest.venue_id).or_insert(0) += 1;
        }

        let mut recommendations: Vec<Recommendation> = venues
            .into_iter()
            .map(|venue| {
                let total = totals.get(&venue.id).copied().unwrap_or(0).max(0) as usize;
                let already_interested = own.contains(&venue.id);
                let others = total.saturating_sub(usize::from(already_interested));
                let friends = friend_counts.get(&venue.id).copied().unwrap_or(0);
                let distance_km =
                    haversine_distance(user.latitude, user.longitude, venue.latitude, venue.longitude);

                let scored = score_venue(&ScoreInput {
                    user_interests: &user.interests,
                    venue_category: &venue.category,
                    other_interest_count: others,
                    friend_interest_count: friends,
                    distance_km,
                });

                Recommendation {
                    venue,
                    score: scored.score,
                    reason: scored.reason,
                    breakdown: scored.breakdown,
                    already_interested,
                    friends_interested: friends,
                    total_interested: total,
                    distance_km,
                }
            })
            .collect();

        recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            user_id = %user_id,
            count = recommendations.len(),
            "Computed recommendations"
        );
        Ok(recommendations)
    }
}
