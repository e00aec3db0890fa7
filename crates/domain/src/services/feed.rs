//! Social feed aggregator.
//!
//! Friend activity and highlighted venues are read in one transaction. The
//! count helpers (`new_count`, per-venue totals) run afterwards in a separate
//! one and fall back to zero if the store fails, so the feed itself still
//! renders.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::pagination::{PageInfo, PageRequest};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::feed::HIGHLIGHT_FRIEND_CAP;
use crate::models::{
    FeedItem, FriendActivityPage, HighlightedVenue, Interest, SocialFeed, UserSummary, VenueSummary,
    ACTIVITY_INTERESTED,
};
use crate::ports::{SocialStore, SocialTx};

pub struct FeedService {
    store: Arc<dyn SocialStore>,
    highlight_threshold: usize,
}

impl FeedService {
    pub fn new(store: Arc<dyn SocialStore>, highlight_threshold: usize) -> Self {
        Self {
            store,
            highlight_threshold,
        }
    }

    /// Friend activity plus highlighted venues for `user_id`.
    pub async fn get_social_feed(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        page: PageRequest,
    ) -> Result<SocialFeed, DomainError> {
        let mut tx = self.store.begin().await?;
        if tx.get_user(user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }

        let friend_ids = tx.friend_ids(user_id).await?;
        if friend_ids.is_empty() {
            tx.commit().await?;
            return Ok(SocialFeed {
                activity: FriendActivityPage {
                    page: page.page(),
                    limit: page.limit(),
                    new_count: since.map(|_| 0),
                    ..Default::default()
                },
                highlighted_venues: Vec::new(),
            });
        }

        let mut activity = friend_activities(tx.as_mut(), &friend_ids, since, page).await?;
        let mut highlighted =
            highlighted_venues(tx.as_mut(), &friend_ids, self.highlight_threshold).await?;
        tx.commit().await?;

        if let Some(since) = since {
            activity.new_count = Some(self.new_activity_count(&friend_ids, since).await);
        }
        for venue in &mut highlighted {
            venue.total_interested = self.total_interested(venue.venue.id).await;
        }

        Ok(SocialFeed {
            activity,
            highlighted_venues: highlighted,
        })
    }

    /// Friend activity alone, without highlights.
    pub async fn get_friend_activity(
        &self,
        user_id: Uuid,
        since: Option<DateTime<Utc>>,
        page: PageRequest,
    ) -> Result<FriendActivityPage, DomainError> {
        let mut tx = self.store.begin().await?;
        if tx.get_user(user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }
        let friend_ids = tx.friend_ids(user_id).await?;
        if friend_ids.is_empty() {
            tx.commit().await?;
            return Ok(FriendActivityPage {
                page: page.page(),
                limit: page.limit(),
                new_count: since.map(|_| 0),
                ..Default::default()
            });
        }
        let mut activity = friend_activities(tx.as_mut(), &friend_ids, since, page).await?;
        tx.commit().await?;

        if let Some(since) = since {
            activity.new_count = Some(self.new_activity_count(&friend_ids, since).await);
        }
        Ok(activity)
    }

    /// Highlighted venues alone.
    pub async fn get_highlighted_venues(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<HighlightedVenue>, DomainError> {
        let mut tx = self.store.begin().await?;
        if tx.get_user(user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }
        let friend_ids = tx.friend_ids(user_id).await?;
        if friend_ids.is_empty() {
            tx.commit().await?;
            return Ok(Vec::new());
        }
        let mut highlighted =
            highlighted_venues(tx.as_mut(), &friend_ids, self.highlight_threshold).await?;
        tx.commit().await?;

        for venue in &mut highlighted {
            venue.total_interested = self.total_interested(venue.venue.id).await;
        }
        Ok(highlighted)
    }

    async fn new_activity_count(&self, friend_ids: &[Uuid], since: DateTime<Utc>) -> i64 {
        let result = async {
            let mut tx = self.store.begin().await?;
            let count = tx
                .count_activities(friend_ids, ACTIVITY_INTERESTED, Some(since))
                .await?;
            tx.commit().await?;
            Ok::<_, DomainError>(count)
        }
        .await;

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Counting new feed activity failed, reporting zero");
            0
        })
    }

    async fn total_interested(&self, venue_id: Uuid) -> i64 {
        let result = async {
            let mut tx = self.store.begin().await?;
            let count = tx.count_interested(venue_id).await?;
            tx.commit().await?;
            Ok::<_, DomainError>(count)
        }
        .await;

        result.unwrap_or_else(|e| {
            tracing::warn!(venue_id = %venue_id, error = %e, "Counting interest failed, reporting zero");
            0
        })
    }
}

/// Newest-first page of "interested" activities by `friend_ids`.
pub async fn friend_activities(
    tx: &mut dyn SocialTx,
    friend_ids: &[Uuid],
    since: Option<DateTime<Utc>>,
    page: PageRequest,
) -> Result<FriendActivityPage, DomainError> {
    let rows = tx
        .list_activities(
            friend_ids,
            ACTIVITY_INTERESTED,
            since,
            page.lookahead_limit(),
            page.offset(),
        )
        .await?;
    let (rows, info) = PageInfo::split(&page, rows);

    let mut user_ids: Vec<Uuid> = rows.iter().map(|a| a.user_id).collect();
    user_ids.sort();
    user_ids.dedup();
    let mut venue_ids: Vec<Uuid> = rows.iter().map(|a| a.venue_id).collect();
    venue_ids.sort();
    venue_ids.dedup();

    let users: HashMap<Uuid, UserSummary> = tx
        .get_users(&user_ids)
        .await?
        .iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();
    let venues: HashMap<Uuid, VenueSummary> = tx
        .get_venues(&venue_ids)
        .await?
        .iter()
        .map(|v| (v.id, VenueSummary::from(v)))
        .collect();

    let items = rows
        .into_iter()
        .filter_map(|a| {
            Some(FeedItem {
                activity_id: a.id,
                user: users.get(&a.user_id)?.clone(),
                venue: venues.get(&a.venue_id)?.clone(),
                action: a.action,
                created_at: a.created_at,
            })
        })
        .collect();

    Ok(FriendActivityPage {
        items,
        page: info.page,
        limit: info.limit,
        has_more: info.has_more,
        new_count: None,
    })
}

/// Venues with at least `threshold` distinct interested friends, most
/// recent friend interest first. `total_interested` is filled in by the caller.
pub async fn highlighted_venues(
    tx: &mut dyn SocialTx,
    friend_ids: &[Uuid],
    threshold: usize,
) -> Result<Vec<HighlightedVenue>, DomainError> {
    let interests = tx.interests_by_users(friend_ids).await?;

    let mut by_venue: HashMap<Uuid, Vec<Interest>> = HashMap::new();
    for interest in interests {
        by_venue.entry(interest.venue_id).or_default().push(interest);
    }

    let mut highlighted = Vec::new();
    for (venue_id, mut rows) in by_venue {
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let mut friends: Vec<Uuid> = Vec::new();
        for row in &rows {
            if !friends.contains(&row.user_id) {
                friends.push(row.user_id);
            }
        }
        if friends.len() < threshold {
            continue;
        }

        let Some(venue) = tx.get_venue(venue_id).await? else {
            continue;
        };
        let shown: Vec<Uuid> = friends.iter().take(HIGHLIGHT_FRIEND_CAP).copied().collect();
        let users = tx.get_users(&shown).await?;

        highlighted.push(HighlightedVenue {
            venue: VenueSummary::from(&venue),
            friends_interested: users.iter().map(UserSummary::from).collect(),
            friend_count: friends.len(),
            total_interested: 0,
            latest_interest_at: rows[0].created_at,
        });
    }

    highlighted.sort_by(|a, b| {
        b.latest_interest_at
            .cmp(&a.latest_interest_at)
            .then_with(|| a.venue.name.cmp(&b.venue.name))
    });
    Ok(highlighted)
}
