//! Venue catalogue and profile views.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;

use crate::error::DomainError;
use crate::models::{
    ProfileActionItem, UserProfile, UserSummary, VenueDetail, VenueFilters, VenueListItem,
    VenueSortBy, VenueSummary,
};
use crate::ports::SocialStore;

use super::proximity::haversine_distance;

pub struct CatalogueService {
    store: Arc<dyn SocialStore>,
}

impl CatalogueService {
    pub fn new(store: Arc<dyn SocialStore>) -> Self {
        Self { store }
    }

    /// Lists venues matching `filters`, optionally relative to a user.
    pub async fn get_venues(
        &self,
        user_id: Option<Uuid>,
        filters: &VenueFilters,
    ) -> Result<Vec<VenueListItem>, DomainError> {
        if filters.only_interested && filters.exclude_interested {
            return Err(DomainError::validation(
                "only_interested and exclude_interested are mutually exclusive",
            ));
        }
        if user_id.is_none() && filters.needs_user() {
            return Err(DomainError::validation(
                "user_id is required for distance, friend and interest filters",
            ));
        }

        let mut tx = self.store.begin().await?;
        let user = match user_id {
            Some(id) => Some(
                tx.get_user(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("User"))?,
            ),
            None => None,
        };

        let venues = tx.list_venues().await?;
        let totals = tx.interest_counts().await?;
        let (own, friend_counts) = match &user {
            Some(u) => {
                let own: HashSet<Uuid> = tx.venue_ids_for_user(u.id).await?.into_iter().collect();
                let friend_ids = tx.friend_ids(u.id).await?;
                let mut counts: HashMap<Uuid, usize> = HashMap::new();
                if !friend_ids.is_empty() {
                    for interest in tx.interests_by_users(&friend_ids).await? {
                        *counts.entry(interest.venue_id).or_insert(0) += 1;
                    }
                }
                (own, counts)
            }
            None => (HashSet::new(), HashMap::new()),
        };
        tx.commit().await?;

        let mut items: Vec<VenueListItem> = venues
            .into_iter()
            .filter(|v| {
                filters.categories.is_empty()
                    || filters.categories.contains(&v.category.to_lowercase())
            })
            .map(|venue| {
                let distance_km = user.as_ref().map(|u| {
                    haversine_distance(u.latitude, u.longitude, venue.latitude, venue.longitude)
                });
                VenueListItem {
                    total_interested: totals.get(&venue.id).copied().unwrap_or(0).max(0) as usize,
                    friends_interested: friend_counts.get(&venue.id).copied().unwrap_or(0),
                    user_interested: own.contains(&venue.id),
                    distance_km,
                    venue,
                }
            })
            .filter(|item| match (filters.max_distance_km, item.distance_km) {
                (Some(max), Some(d)) => d <= max,
                _ => true,
            })
            .filter(|item| {
                filters
                    .min_friend_interest
                    .map(|min| item.friends_interested >= min as usize)
                    .unwrap_or(true)
            })
            .filter(|item| !filters.only_interested || item.user_interested)
            .filter(|item| !filters.exclude_interested || !item.user_interested)
            .collect();

        let sort_by = filters.sort_by.unwrap_or(if user.is_some() {
            VenueSortBy::Distance
        } else {
            VenueSortBy::Name
        });
        match sort_by {
            VenueSortBy::Distance => items.sort_by(|a, b| {
                a.distance_km
                    .unwrap_or(f64::MAX)
                    .total_cmp(&b.distance_km.unwrap_or(f64::MAX))
            }),
            VenueSortBy::Popularity => {
                items.sort_by(|a, b| b.total_interested.cmp(&a.total_interested))
            }
            VenueSortBy::Friends => {
                items.sort_by(|a, b| b.friends_interested.cmp(&a.friends_interested))
            }
            // already name ordered
            VenueSortBy::Name => {}
        }

        Ok(items)
    }

    /// Venue with its interest and coordination state.
    pub async fn get_venue_detail(
        &self,
        venue_id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<VenueDetail, DomainError> {
        let mut tx = self.store.begin().await?;
        let venue = tx
            .get_venue(venue_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue"))?;
        let user = match user_id {
            Some(id) => Some(
                tx.get_user(id)
                    .await?
                    .ok_or_else(|| DomainError::not_found("User"))?,
            ),
            None => None,
        };

        let interested_ids = tx.interested_user_ids(venue_id).await?;
        let interested_users = tx.get_users(&interested_ids).await?;
        let friend_ids: HashSet<Uuid> = match &user {
            Some(u) => tx.friend_ids(u.id).await?.into_iter().collect(),
            None => HashSet::new(),
        };
        let active_action_item = tx.find_active_action_item(venue_id).await?;
        tx.commit().await?;

        let distance_km = user
            .as_ref()
            .map(|u| haversine_distance(u.latitude, u.longitude, venue.latitude, venue.longitude));
        let user_interested = user
            .as_ref()
            .map(|u| interested_ids.contains(&u.id))
            .unwrap_or(false);

        Ok(VenueDetail {
            distance_km,
            total_interested: interested_ids.len(),
            friends_interested: interested_users
                .iter()
                .filter(|u| friend_ids.contains(&u.id))
                .map(UserSummary::from)
                .collect(),
            interested_users: interested_users.iter().map(UserSummary::from).collect(),
            user_interested,
            active_action_item,
            venue,
        })
    }

    /// User with friends, interested venues and active action items.
    pub async fn get_user_profile(&self, user_id: Uuid) -> Result<UserProfile, DomainError> {
        let mut tx = self.store.begin().await?;
        let user = tx
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let friend_ids = tx.friend_ids(user_id).await?;
        let friends = tx.get_users(&friend_ids).await?;
        let venue_ids = tx.venue_ids_for_user(user_id).await?;
        let venues = tx.get_venues(&venue_ids).await?;
        let items = tx.active_action_items_for_user(user_id).await?;
        let mut item_venue_ids: Vec<Uuid> = items.iter().map(|i| i.venue_id).collect();
        item_venue_ids.sort();
        item_venue_ids.dedup();
        let item_venues: HashMap<Uuid, VenueSummary> = tx
            .get_venues(&item_venue_ids)
            .await?
            .iter()
            .map(|v| (v.id, VenueSummary::from(v)))
            .collect();
        tx.commit().await?;

        let action_items = items
            .into_iter()
            .filter_map(|item| {
                let venue = item_venues.get(&item.venue_id)?.clone();
                Some(ProfileActionItem {
                    action_item: item,
                    venue,
                })
            })
            .collect();

        Ok(UserProfile {
            friends: friends.iter().map(UserSummary::from).collect(),
            interested_venues: venues.iter().map(VenueSummary::from).collect(),
            action_items,
            user,
        })
    }
}
