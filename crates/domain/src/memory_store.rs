//! In-memory implementation of the store ports.
//!
//! A transaction takes the single state mutex, works on a private copy of the
//! state and swaps it back in on commit. Transactions are therefore fully
//! serialized and the explicit lock operations are no-ops. Uniqueness and
//! format rules mirror the PostgreSQL schema so services observe the same
//! failures.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::action_item::is_valid_action_code;
use crate::models::{
    ActionItem, ActionItemConfirmation, ActionItemStatus, Activity, Chat, ChatMessage,
    ChatParticipant, ConfirmationStatus, Friendship, Interest, User, Venue,
};
use crate::ports::{SocialStore, SocialTx, StoreResult};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: Vec<User>,
    venues: Vec<Venue>,
    friendships: Vec<Friendship>,
    interests: Vec<Interest>,
    activities: Vec<Activity>,
    action_items: Vec<ActionItem>,
    confirmations: Vec<ActionItemConfirmation>,
    chats: Vec<Chat>,
    participants: Vec<ChatParticipant>,
    messages: Vec<ChatMessage>,
}

/// Switches used by tests to simulate adapter failures.
#[derive(Debug, Default)]
struct Faults {
    action_item_writes: AtomicBool,
    count_queries: AtomicBool,
}

/// Transactional store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    faults: Arc<Faults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every action-item insert fail with [`StoreError::Unavailable`].
    pub fn fail_action_item_writes(&self, fail: bool) {
        self.faults.action_item_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes count helper queries fail with [`StoreError::Unavailable`].
    pub fn fail_count_queries(&self, fail: bool) {
        self.faults.count_queries.store(fail, Ordering::SeqCst);
    }

    pub async fn seed_user(&self, user: User) -> StoreResult<()> {
        let mut tx = self.begin().await?;
        tx.insert_user(&user).await?;
        tx.commit().await
    }

    pub async fn seed_venue(&self, venue: Venue) -> StoreResult<()> {
        let mut tx = self.begin().await?;
        tx.insert_venue(&venue).await?;
        tx.commit().await
    }

    pub async fn seed_friendship(&self, a: Uuid, b: Uuid) -> StoreResult<()> {
        let mut tx = self.begin().await?;
        tx.insert_friendship(&Friendship::new(a, b, Utc::now())).await?;
        tx.commit().await
    }

    /// Overwrites an action item's expiry, for sweep tests.
    pub async fn set_action_item_expiry(&self, id: Uuid, expires_at: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        if let Some(item) = state.action_items.iter_mut().find(|i| i.id == id) {
            item.expires_at = expires_at;
        }
    }
}

#[async_trait]
impl SocialStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn SocialTx>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTx {
            guard,
            working,
            faults: self.faults.clone(),
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    faults: Arc<Faults>,
}

impl MemoryTx {
    fn check_counts(&self) -> StoreResult<()> {
        if self.faults.count_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated count failure".into()));
        }
        Ok(())
    }

    fn action_item_mut(&mut self, id: Uuid) -> StoreResult<&mut ActionItem> {
        self.working
            .action_items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::Query(format!("action item {} missing", id)))
    }
}

/// Sorts newest first; rows inserted later win ties.
fn newest_first<T: Clone>(rows: Vec<(usize, &T)>, at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows = rows;
    rows.sort_by(|(ia, a), (ib, b)| at(b).cmp(&at(a)).then(ib.cmp(ia)));
    rows.into_iter().map(|(_, r)| r.clone()).collect()
}

fn page<T>(rows: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    rows.into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl SocialTx for MemoryTx {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        Ok(())
    }

    async fn lock_interest(&mut self, _user_id: Uuid, _venue_id: Uuid) -> StoreResult<()> {
        Ok(())
    }

    async fn lock_venue(&mut self, _venue_id: Uuid) -> StoreResult<()> {
        Ok(())
    }

    async fn lock_action_item(&mut self, id: Uuid) -> StoreResult<Option<ActionItem>> {
        self.get_action_item(id).await
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        if self.working.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Conflict("users_pkey".into()));
        }
        self.working.users.push(user.clone());
        Ok(())
    }

    async fn get_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_users(&mut self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.users.iter().find(|u| u.id == *id).cloned())
            .collect())
    }

    async fn insert_friendship(&mut self, friendship: &Friendship) -> StoreResult<()> {
        let canonical = Friendship::new(
            friendship.user_id,
            friendship.friend_id,
            friendship.created_at,
        );
        if self.working.friendships.iter().any(|f| {
            f.user_id == canonical.user_id && f.friend_id == canonical.friend_id
        }) {
            return Err(StoreError::Conflict("friendships_pkey".into()));
        }
        self.working.friendships.push(canonical);
        Ok(())
    }

    async fn friend_ids(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .working
            .friendships
            .iter()
            .filter_map(|f| f.other(user_id))
            .collect())
    }

    async fn insert_venue(&mut self, venue: &Venue) -> StoreResult<()> {
        if self.working.venues.iter().any(|v| v.id == venue.id) {
            return Err(StoreError::Conflict("venues_pkey".into()));
        }
        self.working.venues.push(venue.clone());
        Ok(())
    }

    async fn get_venue(&mut self, id: Uuid) -> StoreResult<Option<Venue>> {
        Ok(self.working.venues.iter().find(|v| v.id == id).cloned())
    }

    async fn list_venues(&mut self) -> StoreResult<Vec<Venue>> {
        let mut venues = self.working.venues.clone();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn get_venues(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Venue>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.working.venues.iter().find(|v| v.id == *id).cloned())
            .collect())
    }

    async fn find_interest(
        &mut self,
        user_id: Uuid,
        venue_id: Uuid,
    ) -> StoreResult<Option<Interest>> {
        Ok(self
            .working
            .interests
            .iter()
            .find(|i| i.user_id == user_id && i.venue_id == venue_id)
            .cloned())
    }

    async fn insert_interest(&mut self, interest: &Interest) -> StoreResult<()> {
        if self
            .working
            .interests
            .iter()
            .any(|i| i.user_id == interest.user_id && i.venue_id == interest.venue_id)
        {
            return Err(StoreError::Conflict("interests_pkey".into()));
        }
        self.working.interests.push(interest.clone());
        Ok(())
    }

    async fn delete_interest(&mut self, user_id: Uuid, venue_id: Uuid) -> StoreResult<bool> {
        let before = self.working.interests.len();
        self.working
            .interests
            .retain(|i| !(i.user_id == user_id && i.venue_id == venue_id));
        Ok(self.working.interests.len() < before)
    }

    async fn interested_user_ids(&mut self, venue_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let mut rows: Vec<&Interest> = self
            .working
            .interests
            .iter()
            .filter(|i| i.venue_id == venue_id)
            .collect();
        rows.sort_by_key(|i| i.created_at);
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            if !ids.contains(&row.user_id) {
                ids.push(row.user_id);
            }
        }
        Ok(ids)
    }

    async fn interest_counts(&mut self) -> StoreResult<HashMap<Uuid, i64>> {
        let mut counts = HashMap::new();
        for interest in &self.working.interests {
            *counts.entry(interest.venue_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_interested(&mut self, venue_id: Uuid) -> StoreResult<i64> {
        self.check_counts()?;
        Ok(self
            .working
            .interests
            .iter()
            .filter(|i| i.venue_id == venue_id)
            .count() as i64)
    }

    async fn venue_ids_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        let rows = self
            .working
            .interests
            .iter()
            .enumerate()
            .filter(|(_, i)| i.user_id == user_id)
            .collect();
        Ok(newest_first(rows, |i| i.created_at)
            .into_iter()
            .map(|i| i.venue_id)
            .collect())
    }

    async fn interests_by_users(&mut self, user_ids: &[Uuid]) -> StoreResult<Vec<Interest>> {
        Ok(self
            .working
            .interests
            .iter()
            .filter(|i| user_ids.contains(&i.user_id))
            .cloned()
            .collect())
    }

    async fn insert_activity(&mut self, activity: &Activity) -> StoreResult<()> {
        self.working.activities.push(activity.clone());
        Ok(())
    }

    async fn delete_activities(
        &mut self,
        user_id: Uuid,
        venue_id: Uuid,
        action: &str,
    ) -> StoreResult<u64> {
        let before = self.working.activities.len();
        self.working.activities.retain(|a| {
            !(a.user_id == user_id && a.venue_id == venue_id && a.action == action)
        });
        Ok((before - self.working.activities.len()) as u64)
    }

    async fn list_activities(
        &mut self,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Activity>> {
        let rows = self
            .working
            .activities
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                user_ids.contains(&a.user_id)
                    && a.action == action
                    && since.map(|s| a.created_at > s).unwrap_or(true)
            })
            .collect();
        Ok(page(newest_first(rows, |a| a.created_at), limit, offset))
    }

    async fn count_activities(
        &mut self,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        self.check_counts()?;
        Ok(self
            .working
            .activities
            .iter()
            .filter(|a| {
                user_ids.contains(&a.user_id)
                    && a.action == action
                    && since.map(|s| a.created_at > s).unwrap_or(true)
            })
            .count() as i64)
    }

    async fn get_action_item(&mut self, id: Uuid) -> StoreResult<Option<ActionItem>> {
        Ok(self
            .working
            .action_items
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn find_active_action_item(
        &mut self,
        venue_id: Uuid,
    ) -> StoreResult<Option<ActionItem>> {
        Ok(self
            .working
            .action_items
            .iter()
            .find(|i| i.venue_id == venue_id && i.is_active())
            .cloned())
    }

    async fn insert_action_item(&mut self, item: &ActionItem) -> StoreResult<()> {
        if self.faults.action_item_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated action item failure".into()));
        }
        if !is_valid_action_code(&item.action_code) {
            return Err(StoreError::Query(format!(
                "action code {} violates action_items_action_code_format",
                item.action_code
            )));
        }
        if item.is_active()
            && self
                .working
                .action_items
                .iter()
                .any(|i| i.venue_id == item.venue_id && i.is_active())
        {
            return Err(StoreError::Conflict("action_items_one_active_per_venue".into()));
        }
        if self
            .working
            .action_items
            .iter()
            .any(|i| i.action_code == item.action_code)
        {
            return Err(StoreError::Conflict("action_items_action_code_key".into()));
        }
        self.working.action_items.push(item.clone());
        Ok(())
    }

    async fn update_action_item_status(
        &mut self,
        id: Uuid,
        status: ActionItemStatus,
        archived_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        let item = self.action_item_mut(id)?;
        item.status = status;
        item.archived_at = archived_at;
        Ok(())
    }

    async fn active_action_items_for_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Vec<ActionItem>> {
        let rows = self
            .working
            .action_items
            .iter()
            .enumerate()
            .filter(|(_, i)| i.is_active() && i.is_member(user_id))
            .collect();
        Ok(newest_first(rows, |i| i.created_at))
    }

    async fn expire_action_items(&mut self, now: DateTime<Utc>) -> StoreResult<u64> {
        let mut expired = 0;
        for item in self
            .working
            .action_items
            .iter_mut()
            .filter(|i| i.is_active() && i.expires_at <= now)
        {
            item.status = ActionItemStatus::Expired;
            item.archived_at = Some(now);
            expired += 1;
        }
        Ok(expired)
    }

    async fn list_confirmations(
        &mut self,
        action_item_id: Uuid,
    ) -> StoreResult<Vec<ActionItemConfirmation>> {
        Ok(self
            .working
            .confirmations
            .iter()
            .filter(|c| c.action_item_id == action_item_id)
            .cloned()
            .collect())
    }

    async fn insert_confirmations(
        &mut self,
        confirmations: &[ActionItemConfirmation],
    ) -> StoreResult<()> {
        for c in confirmations {
            if self
                .working
                .confirmations
                .iter()
                .any(|e| e.action_item_id == c.action_item_id && e.user_id == c.user_id)
            {
                return Err(StoreError::Conflict(
                    "action_item_confirmations_item_user_key".into(),
                ));
            }
            self.working.confirmations.push(c.clone());
        }
        Ok(())
    }

    async fn find_confirmation(
        &mut self,
        action_item_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<ActionItemConfirmation>> {
        Ok(self
            .working
            .confirmations
            .iter()
            .find(|c| c.action_item_id == action_item_id && c.user_id == user_id)
            .cloned())
    }

    async fn update_confirmation(
        &mut self,
        id: Uuid,
        status: ConfirmationStatus,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let confirmation = self
            .working
            .confirmations
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::Query(format!("confirmation {} missing", id)))?;
        confirmation.status = status;
        confirmation.responded_at = Some(responded_at);
        Ok(())
    }

    async fn get_chat(&mut self, id: Uuid) -> StoreResult<Option<Chat>> {
        Ok(self.working.chats.iter().find(|c| c.id == id).cloned())
    }

    async fn find_chat_for_action_item(
        &mut self,
        action_item_id: Uuid,
    ) -> StoreResult<Option<Chat>> {
        Ok(self
            .working
            .chats
            .iter()
            .find(|c| c.action_item_id == Some(action_item_id))
            .cloned())
    }

    async fn insert_chat(&mut self, chat: &Chat) -> StoreResult<()> {
        if let Some(item_id) = chat.action_item_id {
            if self
                .working
                .chats
                .iter()
                .any(|c| c.action_item_id == Some(item_id))
            {
                return Err(StoreError::Conflict("chats_action_item_id_key".into()));
            }
        }
        self.working.chats.push(chat.clone());
        Ok(())
    }

    async fn add_chat_participants(
        &mut self,
        chat_id: Uuid,
        user_ids: &[Uuid],
        joined_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        for user_id in user_ids {
            let exists = self
                .working
                .participants
                .iter()
                .any(|p| p.chat_id == chat_id && p.user_id == *user_id);
            if !exists {
                self.working.participants.push(ChatParticipant {
                    chat_id,
                    user_id: *user_id,
                    joined_at,
                });
            }
        }
        Ok(())
    }

    async fn is_chat_participant(&mut self, chat_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(self
            .working
            .participants
            .iter()
            .any(|p| p.chat_id == chat_id && p.user_id == user_id))
    }

    async fn list_chat_participants(
        &mut self,
        chat_id: Uuid,
    ) -> StoreResult<Vec<ChatParticipant>> {
        let mut rows: Vec<ChatParticipant> = self
            .working
            .participants
            .iter()
            .filter(|p| p.chat_id == chat_id)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.joined_at);
        Ok(rows)
    }

    async fn chats_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Chat>> {
        let state = &self.working;
        Ok(state
            .chats
            .iter()
            .filter(|c| {
                state
                    .participants
                    .iter()
                    .any(|p| p.chat_id == c.id && p.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn insert_message(&mut self, message: &ChatMessage) -> StoreResult<()> {
        self.working.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(
        &mut self,
        chat_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ChatMessage>> {
        let rows = self
            .working
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.chat_id == chat_id)
            .collect();
        Ok(page(newest_first(rows, |m| m.created_at), limit, offset))
    }

    async fn count_messages(&mut self, chat_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .working
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .count() as i64)
    }

    async fn latest_message(&mut self, chat_id: Uuid) -> StoreResult<Option<ChatMessage>> {
        Ok(self.list_messages(chat_id, 1, 0).await?.into_iter().next())
    }
}
