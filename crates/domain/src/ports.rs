//! Store ports.
//!
//! Services talk to persistence through [`SocialStore`], which hands out
//! [`SocialTx`] units of work. Every logical operation runs in exactly one
//! transaction and must call [`SocialTx::commit`]; dropping a transaction
//! rolls it back. Adapters map their failures into [`StoreError`] so callers
//! can tell uniqueness conflicts apart from outages.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    ActionItem, ActionItemConfirmation, ActionItemStatus, Activity, Chat, ChatMessage,
    ChatParticipant, ConfirmationStatus, Friendship, Interest, User, Venue,
};

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Entry point to a transactional store.
#[async_trait]
pub trait SocialStore: Send + Sync {
    /// Opens a new transaction.
    async fn begin(&self) -> StoreResult<Box<dyn SocialTx>>;

    /// Cheap liveness probe used by readiness checks.
    async fn ping(&self) -> StoreResult<()>;
}

/// A single unit of work against the store.
#[async_trait]
pub trait SocialTx: Send {
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;

    // ------------------------------------------------------------------
    // Locks, held until the transaction ends
    // ------------------------------------------------------------------

    /// Serializes toggles for one (user, venue) pair.
    async fn lock_interest(&mut self, user_id: Uuid, venue_id: Uuid) -> StoreResult<()>;

    /// Serializes action-item creation for one venue.
    async fn lock_venue(&mut self, venue_id: Uuid) -> StoreResult<()>;

    /// Loads an action item and locks its row.
    async fn lock_action_item(&mut self, id: Uuid) -> StoreResult<Option<ActionItem>>;

    // ------------------------------------------------------------------
    // Users and friendships
    // ------------------------------------------------------------------

    async fn insert_user(&mut self, user: &User) -> StoreResult<()>;

    async fn get_user(&mut self, id: Uuid) -> StoreResult<Option<User>>;

    /// Loads the given users, silently skipping unknown ids.
    async fn get_users(&mut self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    async fn insert_friendship(&mut self, friendship: &Friendship) -> StoreResult<()>;

    /// Ids of everyone sharing a friendship with `user_id`, in either column.
    async fn friend_ids(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;

    // ------------------------------------------------------------------
    // Venues
    // ------------------------------------------------------------------

    async fn insert_venue(&mut self, venue: &Venue) -> StoreResult<()>;

    async fn get_venue(&mut self, id: Uuid) -> StoreResult<Option<Venue>>;

    /// All venues ordered by name.
    async fn list_venues(&mut self) -> StoreResult<Vec<Venue>>;

    async fn get_venues(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Venue>>;

    // ------------------------------------------------------------------
    // Interests
    // ------------------------------------------------------------------

    async fn find_interest(&mut self, user_id: Uuid, venue_id: Uuid)
        -> StoreResult<Option<Interest>>;

    async fn insert_interest(&mut self, interest: &Interest) -> StoreResult<()>;

    /// Returns whether a row was removed.
    async fn delete_interest(&mut self, user_id: Uuid, venue_id: Uuid) -> StoreResult<bool>;

    /// Distinct interested users for a venue, oldest interest first.
    async fn interested_user_ids(&mut self, venue_id: Uuid) -> StoreResult<Vec<Uuid>>;

    /// Interested-user count per venue; venues without interest are absent.
    async fn interest_counts(&mut self) -> StoreResult<HashMap<Uuid, i64>>;

    async fn count_interested(&mut self, venue_id: Uuid) -> StoreResult<i64>;

    /// Venues a user is interested in, most recent first.
    async fn venue_ids_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>>;

    /// Current interests held by any of `user_ids`.
    async fn interests_by_users(&mut self, user_ids: &[Uuid]) -> StoreResult<Vec<Interest>>;

    // ------------------------------------------------------------------
    // Activities
    // ------------------------------------------------------------------

    async fn insert_activity(&mut self, activity: &Activity) -> StoreResult<()>;

    async fn delete_activities(
        &mut self,
        user_id: Uuid,
        venue_id: Uuid,
        action: &str,
    ) -> StoreResult<u64>;

    /// Activities by `user_ids` with `action`, newest first.
    async fn list_activities(
        &mut self,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Activity>>;

    async fn count_activities(
        &mut self,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<i64>;

    // ------------------------------------------------------------------
    // Action items
    // ------------------------------------------------------------------

    async fn get_action_item(&mut self, id: Uuid) -> StoreResult<Option<ActionItem>>;

    async fn find_active_action_item(&mut self, venue_id: Uuid)
        -> StoreResult<Option<ActionItem>>;

    /// Fails with [`StoreError::Conflict`] when the venue already has an
    /// active item or the action code is taken.
    async fn insert_action_item(&mut self, item: &ActionItem) -> StoreResult<()>;

    async fn update_action_item_status(
        &mut self,
        id: Uuid,
        status: ActionItemStatus,
        archived_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()>;

    /// Active items whose interested snapshot contains `user_id`, newest first.
    async fn active_action_items_for_user(&mut self, user_id: Uuid)
        -> StoreResult<Vec<ActionItem>>;

    /// Moves active items with `expires_at <= now` to expired. Returns the count.
    async fn expire_action_items(&mut self, now: DateTime<Utc>) -> StoreResult<u64>;

    // ------------------------------------------------------------------
    // Confirmations
    // ------------------------------------------------------------------

    /// Confirmations for an item, oldest first.
    async fn list_confirmations(
        &mut self,
        action_item_id: Uuid,
    ) -> StoreResult<Vec<ActionItemConfirmation>>;

    async fn insert_confirmations(
        &mut self,
        confirmations: &[ActionItemConfirmation],
    ) -> StoreResult<()>;

    async fn find_confirmation(
        &mut self,
        action_item_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<ActionItemConfirmation>>;

    async fn update_confirmation(
        &mut self,
        id: Uuid,
        status: ConfirmationStatus,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    // ------------------------------------------------------------------
    // Chats
    // ------------------------------------------------------------------

    async fn get_chat(&mut self, id: Uuid) -> StoreResult<Option<Chat>>;

    async fn find_chat_for_action_item(&mut self, action_item_id: Uuid)
        -> StoreResult<Option<Chat>>;

    /// Fails with [`StoreError::Conflict`] when the action item already has a chat.
    async fn insert_chat(&mut self, chat: &Chat) -> StoreResult<()>;

    /// Adds members, ignoring users already in the chat.
    async fn add_chat_participants(
        &mut self,
        chat_id: Uuid,
        user_ids: &[Uuid],
        joined_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    async fn is_chat_participant(&mut self, chat_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Participants ordered by join time.
    async fn list_chat_participants(&mut self, chat_id: Uuid)
        -> StoreResult<Vec<ChatParticipant>>;

    async fn chats_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Chat>>;

    async fn insert_message(&mut self, message: &ChatMessage) -> StoreResult<()>;

    /// Messages newest first.
    async fn list_messages(
        &mut self,
        chat_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ChatMessage>>;

    async fn count_messages(&mut self, chat_id: Uuid) -> StoreResult<i64>;

    async fn latest_message(&mut self, chat_id: Uuid) -> StoreResult<Option<ChatMessage>>;
}
