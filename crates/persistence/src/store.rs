//! PostgreSQL implementation of the store ports.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::{
    ActionItem, ActionItemConfirmation, ActionItemStatus, Activity, Chat, ChatMessage,
    ChatParticipant, ConfirmationStatus, Friendship, Interest, User, Venue,
};
use domain::ports::{SocialStore, SocialTx, StoreResult};
use domain::StoreError;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::entities::{
    ActionItemEntity, ActivityEntity, ChatEntity, ChatMessageEntity, ConfirmationEntity,
    VenueEntity,
};
use crate::repositories::{
    ActionItemRepository, ActivityRepository, AdvisoryLock, ChatMessageRepository,
    ChatRepository, ConfirmationRepository, InterestRepository, UserInput, UserRepository,
    VenueRepository, INTEREST_LOCK_NAMESPACE, VENUE_LOCK_NAMESPACE,
};

const UNIQUE_VIOLATION: &str = "23505";

/// Maps sqlx failures onto the store error taxonomy.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            StoreError::Conflict(db.constraint().unwrap_or("unique violation").to_string())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        _ => StoreError::Query(err.to_string()),
    }
}

/// Store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgSocialStore {
    pool: PgPool,
}

impl PgSocialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SocialStore for PgSocialStore {
    async fn begin(&self) -> StoreResult<Box<dyn SocialTx>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(PgSocialTx { tx }))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}

/// One database transaction. Dropping it without commit rolls back.
pub struct PgSocialTx {
    tx: Transaction<'static, Postgres>,
}

/// Reorders `rows` to follow `ids`, dropping ids with no row.
fn in_id_order<T>(ids: &[Uuid], rows: Vec<T>, id_of: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut by_id: HashMap<Uuid, T> = rows.into_iter().map(|r| (id_of(&r), r)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn confirmation_entity(c: &ActionItemConfirmation) -> ConfirmationEntity {
    ConfirmationEntity {
        id: c.id,
        action_item_id: c.action_item_id,
        user_id: c.user_id,
        initiator_id: c.initiator_id,
        status: c.status.as_str().to_string(),
        responded_at: c.responded_at,
        created_at: c.created_at,
    }
}

#[async_trait]
impl SocialTx for PgSocialTx {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }

    async fn lock_interest(&mut self, user_id: Uuid, venue_id: Uuid) -> StoreResult<()> {
        let key = format!("{}:{}", user_id, venue_id);
        AdvisoryLock::acquire(&mut self.tx, INTEREST_LOCK_NAMESPACE, &key)
            .await
            .map_err(map_sqlx_error)
    }

    async fn lock_venue(&mut self, venue_id: Uuid) -> StoreResult<()> {
        AdvisoryLock::acquire(&mut self.tx, VENUE_LOCK_NAMESPACE, &venue_id.to_string())
            .await
            .map_err(map_sqlx_error)
    }

    async fn lock_action_item(&mut self, id: Uuid) -> StoreResult<Option<ActionItem>> {
        Ok(ActionItemRepository::find_for_update(&mut self.tx, id)
            .await
            .map_err(map_sqlx_error)?
            .map(ActionItem::from))
    }

    async fn insert_user(&mut self, user: &User) -> StoreResult<()> {
        let input = UserInput {
            id: user.id,
            name: &user.name,
            avatar: user.avatar.as_deref(),
            bio: user.bio.as_deref(),
            latitude: user.latitude,
            longitude: user.longitude,
            interests: &user.interests,
            created_at: user.created_at,
        };
        UserRepository::insert(&mut self.tx, input)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get_user(&mut self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(UserRepository::find_by_id(&mut self.tx, id)
            .await
            .map_err(map_sqlx_error)?
            .map(User::from))
    }

    async fn get_users(&mut self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let rows = UserRepository::find_by_ids(&mut self.tx, ids)
            .await
            .map_err(map_sqlx_error)?;
        Ok(in_id_order(ids, rows, |r| r.id)
            .into_iter()
            .map(User::from)
            .collect())
    }

    async fn insert_friendship(&mut self, friendship: &Friendship) -> StoreResult<()> {
        let canonical = Friendship::new(
            friendship.user_id,
            friendship.friend_id,
            friendship.created_at,
        );
        UserRepository::insert_friendship(
            &mut self.tx,
            canonical.user_id,
            canonical.friend_id,
            canonical.created_at,
        )
        .await
        .map_err(map_sqlx_error)
    }

    async fn friend_ids(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        UserRepository::friend_ids(&mut self.tx, user_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn insert_venue(&mut self, venue: &Venue) -> StoreResult<()> {
        let entity = VenueEntity {
            id: venue.id,
            name: venue.name.clone(),
            category: venue.category.clone(),
            description: venue.description.clone(),
            image: venue.image.clone(),
            images: venue.images.clone(),
            address: venue.address.clone(),
            latitude: venue.latitude,
            longitude: venue.longitude,
            created_at: venue.created_at,
        };
        VenueRepository::insert(&mut self.tx, &entity)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get_venue(&mut self, id: Uuid) -> StoreResult<Option<Venue>> {
        Ok(VenueRepository::find_by_id(&mut self.tx, id)
            .await
            .map_err(map_sqlx_error)?
            .map(Venue::from))
    }

    async fn list_venues(&mut self) -> StoreResult<Vec<Venue>> {
        Ok(VenueRepository::list_all(&mut self.tx)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(Venue::from)
            .collect())
    }

    async fn get_venues(&mut self, ids: &[Uuid]) -> StoreResult<Vec<Venue>> {
        let rows = VenueRepository::find_by_ids(&mut self.tx, ids)
            .await
            .map_err(map_sqlx_error)?;
        Ok(in_id_order(ids, rows, |r| r.id)
            .into_iter()
            .map(Venue::from)
            .collect())
    }

    async fn find_interest(
        &mut self,
        user_id: Uuid,
        venue_id: Uuid,
    ) -> StoreResult<Option<Interest>> {
        Ok(InterestRepository::find(&mut self.tx, user_id, venue_id)
            .await
            .map_err(map_sqlx_error)?
            .map(Interest::from))
    }

    async fn insert_interest(&mut self, interest: &Interest) -> StoreResult<()> {
        InterestRepository::insert(
            &mut self.tx,
            interest.user_id,
            interest.venue_id,
            interest.created_at,
        )
        .await
        .map_err(map_sqlx_error)
    }

    async fn delete_interest(&mut self, user_id: Uuid, venue_id: Uuid) -> StoreResult<bool> {
        InterestRepository::delete(&mut self.tx, user_id, venue_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn interested_user_ids(&mut self, venue_id: Uuid) -> StoreResult<Vec<Uuid>> {
        InterestRepository::user_ids_for_venue(&mut self.tx, venue_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn interest_counts(&mut self) -> StoreResult<HashMap<Uuid, i64>> {
        Ok(InterestRepository::counts_by_venue(&mut self.tx)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(|row| (row.venue_id, row.interested))
            .collect())
    }

    async fn count_interested(&mut self, venue_id: Uuid) -> StoreResult<i64> {
        InterestRepository::count_for_venue(&mut self.tx, venue_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn venue_ids_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Uuid>> {
        InterestRepository::venue_ids_for_user(&mut self.tx, user_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn interests_by_users(&mut self, user_ids: &[Uuid]) -> StoreResult<Vec<Interest>> {
        Ok(InterestRepository::find_by_users(&mut self.tx, user_ids)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(Interest::from)
            .collect())
    }

    async fn insert_activity(&mut self, activity: &Activity) -> StoreResult<()> {
        let entity = ActivityEntity {
            id: activity.id,
            user_id: activity.user_id,
            venue_id: activity.venue_id,
            action: activity.action.clone(),
            created_at: activity.created_at,
        };
        ActivityRepository::insert(&mut self.tx, &entity)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_activities(
        &mut self,
        user_id: Uuid,
        venue_id: Uuid,
        action: &str,
    ) -> StoreResult<u64> {
        ActivityRepository::delete_for(&mut self.tx, user_id, venue_id, action)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_activities(
        &mut self,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<Activity>> {
        Ok(
            ActivityRepository::list(&mut self.tx, user_ids, action, since, limit, offset)
                .await
                .map_err(map_sqlx_error)?
                .into_iter()
                .map(Activity::from)
                .collect(),
        )
    }

    async fn count_activities(
        &mut self,
        user_ids: &[Uuid],
        action: &str,
        since: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        ActivityRepository::count(&mut self.tx, user_ids, action, since)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get_action_item(&mut self, id: Uuid) -> StoreResult<Option<ActionItem>> {
        Ok(ActionItemRepository::find_by_id(&mut self.tx, id)
            .await
            .map_err(map_sqlx_error)?
            .map(ActionItem::from))
    }

    async fn find_active_action_item(
        &mut self,
        venue_id: Uuid,
    ) -> StoreResult<Option<ActionItem>> {
        Ok(ActionItemRepository::find_active_for_venue(&mut self.tx, venue_id)
            .await
            .map_err(map_sqlx_error)?
            .map(ActionItem::from))
    }

    async fn insert_action_item(&mut self, item: &ActionItem) -> StoreResult<()> {
        let entity = ActionItemEntity {
            id: item.id,
            venue_id: item.venue_id,
            interested_user_ids: item.interested_user_ids.clone(),
            action_type: item.action_type.as_str().to_string(),
            action_code: item.action_code.clone(),
            description: item.description.clone(),
            status: item.status.as_str().to_string(),
            threshold_met: item.threshold_met,
            created_at: item.created_at,
            expires_at: item.expires_at,
            archived_at: item.archived_at,
        };
        ActionItemRepository::insert(&mut self.tx, &entity)
            .await
            .map_err(map_sqlx_error)
    }

    async fn update_action_item_status(
        &mut self,
        id: Uuid,
        status: ActionItemStatus,
        archived_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        let updated =
            ActionItemRepository::update_status(&mut self.tx, id, status.as_str(), archived_at)
                .await
                .map_err(map_sqlx_error)?;
        if updated == 0 {
            return Err(StoreError::Query(format!("action item {} missing", id)));
        }
        Ok(())
    }

    async fn active_action_items_for_user(
        &mut self,
        user_id: Uuid,
    ) -> StoreResult<Vec<ActionItem>> {
        Ok(ActionItemRepository::find_active_for_member(&mut self.tx, user_id)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(ActionItem::from)
            .collect())
    }

    async fn expire_action_items(&mut self, now: DateTime<Utc>) -> StoreResult<u64> {
        ActionItemRepository::expire_due(&mut self.tx, now)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_confirmations(
        &mut self,
        action_item_id: Uuid,
    ) -> StoreResult<Vec<ActionItemConfirmation>> {
        Ok(
            ConfirmationRepository::find_by_action_item(&mut self.tx, action_item_id)
                .await
                .map_err(map_sqlx_error)?
                .into_iter()
                .map(ActionItemConfirmation::from)
                .collect(),
        )
    }

    async fn insert_confirmations(
        &mut self,
        confirmations: &[ActionItemConfirmation],
    ) -> StoreResult<()> {
        let rows: Vec<ConfirmationEntity> = confirmations.iter().map(confirmation_entity).collect();
        ConfirmationRepository::insert_many(&mut self.tx, &rows)
            .await
            .map_err(map_sqlx_error)
    }

    async fn find_confirmation(
        &mut self,
        action_item_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<ActionItemConfirmation>> {
        Ok(
            ConfirmationRepository::find(&mut self.tx, action_item_id, user_id)
                .await
                .map_err(map_sqlx_error)?
                .map(ActionItemConfirmation::from),
        )
    }

    async fn update_confirmation(
        &mut self,
        id: Uuid,
        status: ConfirmationStatus,
        responded_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let updated =
            ConfirmationRepository::update_status(&mut self.tx, id, status.as_str(), responded_at)
                .await
                .map_err(map_sqlx_error)?;
        if updated == 0 {
            return Err(StoreError::Query(format!("confirmation {} missing", id)));
        }
        Ok(())
    }

    async fn get_chat(&mut self, id: Uuid) -> StoreResult<Option<Chat>> {
        Ok(ChatRepository::find_by_id(&mut self.tx, id)
            .await
            .map_err(map_sqlx_error)?
            .map(Chat::from))
    }

    async fn find_chat_for_action_item(
        &mut self,
        action_item_id: Uuid,
    ) -> StoreResult<Option<Chat>> {
        Ok(ChatRepository::find_by_action_item(&mut self.tx, action_item_id)
            .await
            .map_err(map_sqlx_error)?
            .map(Chat::from))
    }

    async fn insert_chat(&mut self, chat: &Chat) -> StoreResult<()> {
        let entity = ChatEntity {
            id: chat.id,
            action_item_id: chat.action_item_id,
            venue_id: chat.venue_id,
            created_by: chat.created_by,
            created_at: chat.created_at,
        };
        ChatRepository::insert(&mut self.tx, &entity)
            .await
            .map_err(map_sqlx_error)
    }

    async fn add_chat_participants(
        &mut self,
        chat_id: Uuid,
        user_ids: &[Uuid],
        joined_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        ChatRepository::add_participants(&mut self.tx, chat_id, user_ids, joined_at)
            .await
            .map_err(map_sqlx_error)
    }

    async fn is_chat_participant(&mut self, chat_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        ChatRepository::is_participant(&mut self.tx, chat_id, user_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_chat_participants(
        &mut self,
        chat_id: Uuid,
    ) -> StoreResult<Vec<ChatParticipant>> {
        Ok(ChatRepository::find_participants(&mut self.tx, chat_id)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(ChatParticipant::from)
            .collect())
    }

    async fn chats_for_user(&mut self, user_id: Uuid) -> StoreResult<Vec<Chat>> {
        Ok(ChatRepository::find_for_user(&mut self.tx, user_id)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(Chat::from)
            .collect())
    }

    async fn insert_message(&mut self, message: &ChatMessage) -> StoreResult<()> {
        let entity = ChatMessageEntity {
            id: message.id,
            chat_id: message.chat_id,
            sender_id: message.sender_id,
            content: message.content.clone(),
            created_at: message.created_at,
        };
        ChatMessageRepository::insert(&mut self.tx, &entity)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_messages(
        &mut self,
        chat_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<ChatMessage>> {
        Ok(ChatMessageRepository::list(&mut self.tx, chat_id, limit, offset)
            .await
            .map_err(map_sqlx_error)?
            .into_iter()
            .map(ChatMessage::from)
            .collect())
    }

    async fn count_messages(&mut self, chat_id: Uuid) -> StoreResult<i64> {
        ChatMessageRepository::count(&mut self.tx, chat_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn latest_message(&mut self, chat_id: Uuid) -> StoreResult<Option<ChatMessage>> {
        Ok(self.list_messages(chat_id, 1, 0).await?.into_iter().next())
    }
}
