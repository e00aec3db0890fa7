//! Interest ledger.
//!
//! Toggling is two independent transactions: the interest and its activity
//! are committed first, then the coordinator gets a chance to create an
//! action item. A failure in the second step never undoes the first.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{Activity, Interest, ToggleResult, ACTIVITY_INTERESTED};
use crate::ports::SocialStore;

use super::action_items::ActionItemCoordinator;

pub struct InterestLedger {
    store: Arc<dyn SocialStore>,
    coordinator: Arc<ActionItemCoordinator>,
}

impl InterestLedger {
    pub fn new(store: Arc<dyn SocialStore>, coordinator: Arc<ActionItemCoordinator>) -> Self {
        Self { store, coordinator }
    }

    /// Adds the interest if absent, removes it otherwise.
    pub async fn toggle(&self, user_id: Uuid, venue_id: Uuid) -> Result<ToggleResult, DomainError> {
        let mut tx = self.store.begin().await?;

        if tx.get_user(user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }
        if tx.get_venue(venue_id).await?.is_none() {
            return Err(DomainError::not_found("Venue"));
        }

        tx.lock_interest(user_id, venue_id).await?;

        if tx.find_interest(user_id, venue_id).await?.is_some() {
            tx.delete_interest(user_id, venue_id).await?;
            let removed = tx
                .delete_activities(user_id, venue_id, ACTIVITY_INTERESTED)
                .await?;
            tx.commit().await?;

            tracing::info!(
                user_id = %user_id,
                venue_id = %venue_id,
                activities_removed = removed,
                "Interest removed"
            );
            return Ok(ToggleResult::Removed { user_id, venue_id });
        }

        let interest = Interest {
            user_id,
            venue_id,
            created_at: Utc::now(),
        };
        tx.insert_interest(&interest).await?;
        tx.insert_activity(&Activity::interested(&interest)).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, venue_id = %venue_id, "Interest added");

        let action_item = match self.coordinator.on_interest_added(venue_id).await {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(
                    venue_id = %venue_id,
                    error = %e,
                    "Action item coordination failed after interest was recorded"
                );
                None
            }
        };

        Ok(ToggleResult::Added {
            interest,
            action_item,
        })
    }
}
