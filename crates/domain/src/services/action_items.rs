//! Action-item coordinator.
//!
//! Owns the `active -> {dismissed, expired, completed}` lifecycle and the
//! go-ahead protocol (initiate, confirm, decline) that bootstraps a group chat
//! once enough people commit.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use crate::error::{DomainError, StoreError};
use crate::models::action_item::{generate_action_code, generate_description};
use crate::models::{
    ActionItem, ActionItemConfirmation, ActionItemStatus, ActionItemView, ActionType, Chat,
    CompletionOutcome, ConfirmOutcome, ConfirmationStatus, GoAheadStatus, Venue, VenueSummary,
};
use crate::ports::{SocialStore, SocialTx};

use super::booking::{BookingAgent, ReservationRequest};
use super::notification::{
    dispatch, ActionItemCreatedPayload, ChatCreatedPayload, GoAheadRequestedPayload,
    NotificationPayload, NotificationService, NotificationType,
};

/// Unique constraint on `action_items.action_code`.
const ACTION_CODE_CONSTRAINT: &str = "action_items_action_code_key";

/// Fresh codes drawn before creation is abandoned.
const MAX_CODE_ATTEMPTS: u32 = 5;

enum CreateAttempt {
    Created(Venue, ActionItem),
    Skipped,
    CodeTaken,
}

/// Tunables for the coordination workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinationSettings {
    /// Distinct interested users that trigger action-item creation.
    pub interest_threshold: usize,
    /// Confirmed participants, initiator included, that trigger chat creation.
    pub chat_quorum: usize,
    pub action_item_ttl_days: i64,
    /// Distinct friends needed for a venue to be highlighted in the feed.
    pub highlight_threshold: usize,
}

impl Default for CoordinationSettings {
    fn default() -> Self {
        Self {
            interest_threshold: 5,
            chat_quorum: 2,
            action_item_ttl_days: 90,
            highlight_threshold: 5,
        }
    }
}

/// Coordinates action items and their go-ahead flow.
pub struct ActionItemCoordinator {
    store: Arc<dyn SocialStore>,
    notifier: Arc<dyn NotificationService>,
    booking: Arc<dyn BookingAgent>,
    rng: Mutex<StdRng>,
    settings: CoordinationSettings,
}

impl ActionItemCoordinator {
    pub fn new(
        store: Arc<dyn SocialStore>,
        notifier: Arc<dyn NotificationService>,
        booking: Arc<dyn BookingAgent>,
        rng: StdRng,
        settings: CoordinationSettings,
    ) -> Self {
        Self {
            store,
            notifier,
            booking,
            rng: Mutex::new(rng),
            settings,
        }
    }

    /// Coordinator seeded from OS entropy.
    pub fn with_entropy(
        store: Arc<dyn SocialStore>,
        notifier: Arc<dyn NotificationService>,
        booking: Arc<dyn BookingAgent>,
        settings: CoordinationSettings,
    ) -> Self {
        Self::new(store, notifier, booking, StdRng::from_entropy(), settings)
    }

    pub fn settings(&self) -> &CoordinationSettings {
        &self.settings
    }

    /// Creates an action item for the venue when the threshold is met and
    /// none is active. Runs in its own transaction, serialized per venue.
    ///
    /// A uniqueness conflict means another caller won the race and yields
    /// `Ok(None)`. A clashing action code is redrawn in a fresh transaction
    /// up to `MAX_CODE_ATTEMPTS` times.
    pub async fn on_interest_added(&self, venue_id: Uuid) -> Result<Option<ActionItem>, DomainError> {
        let mut attempt = 1;
        let (venue, item) = loop {
            match self.try_create(venue_id).await? {
                CreateAttempt::Created(venue, item) => break (venue, item),
                CreateAttempt::Skipped => return Ok(None),
                CreateAttempt::CodeTaken if attempt < MAX_CODE_ATTEMPTS => {
                    tracing::debug!(venue_id = %venue_id, attempt, "Action code taken, redrawing");
                    attempt += 1;
                }
                CreateAttempt::CodeTaken => {
                    tracing::warn!(
                        venue_id = %venue_id,
                        attempts = attempt,
                        "No free action code, skipping creation"
                    );
                    return Ok(None);
                }
            }
        };

        tracing::info!(
            venue_id = %venue_id,
            action_item_id = %item.id,
            action_code = %item.action_code,
            action_type = %item.action_type,
            interested = item.interested_user_ids.len(),
            "Action item created"
        );

        dispatch(
            self.notifier.as_ref(),
            NotificationPayload::ActionItemCreated(ActionItemCreatedPayload {
                notification_type: NotificationType::ActionItemCreated,
                action_item_id: item.id,
                venue_id,
                venue_name: venue.name.clone(),
                action_code: item.action_code.clone(),
                description: item.description.clone(),
                recipient_ids: item.interested_user_ids.clone(),
                timestamp: item.created_at,
            }),
        )
        .await;

        Ok(Some(item))
    }

    async fn try_create(&self, venue_id: Uuid) -> Result<CreateAttempt, DomainError> {
        let mut tx = self.store.begin().await?;
        tx.lock_venue(venue_id).await?;

        let venue = tx
            .get_venue(venue_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue"))?;

        let interested = tx.interested_user_ids(venue_id).await?;
        if interested.len() < self.settings.interest_threshold {
            tracing::debug!(
                venue_id = %venue_id,
                interested = interested.len(),
                threshold = self.settings.interest_threshold,
                "Interest threshold not met"
            );
            return Ok(CreateAttempt::Skipped);
        }

        if let Some(existing) = tx.find_active_action_item(venue_id).await? {
            tracing::debug!(
                venue_id = %venue_id,
                action_item_id = %existing.id,
                "Venue already has an active action item"
            );
            return Ok(CreateAttempt::Skipped);
        }

        let item = self.build_action_item(&venue, interested, Utc::now())?;
        let inserted = tx.insert_action_item(&item).await;
        let written = match inserted {
            Ok(()) => tx.commit().await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => Ok(CreateAttempt::Created(venue, item)),
            Err(StoreError::Conflict(constraint)) if constraint == ACTION_CODE_CONSTRAINT => {
                Ok(CreateAttempt::CodeTaken)
            }
            Err(StoreError::Conflict(constraint)) => {
                tracing::warn!(
                    venue_id = %venue_id,
                    constraint = %constraint,
                    "Action item creation lost a uniqueness race"
                );
                Ok(CreateAttempt::Skipped)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn build_action_item(
        &self,
        venue: &Venue,
        interested_user_ids: Vec<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<ActionItem, DomainError> {
        let (action_code, description) = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| StoreError::Query("random source poisoned".into()))?;
            (
                generate_action_code(venue.id, &mut *rng),
                generate_description(interested_user_ids.len(), &mut *rng),
            )
        };

        let expires_at = Duration::try_days(self.settings.action_item_ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| DomainError::validation("action item lifetime is out of range"))?;

        Ok(ActionItem {
            id: Uuid::new_v4(),
            venue_id: venue.id,
            action_type: ActionType::for_category(&venue.category),
            action_code,
            description,
            status: ActionItemStatus::Active,
            threshold_met: true,
            created_at: now,
            expires_at,
            archived_at: None,
            interested_user_ids,
        })
    }

    /// Loads an action item with its venue and go-ahead state.
    pub async fn get_action_item(&self, action_item_id: Uuid) -> Result<ActionItemView, DomainError> {
        let mut tx = self.store.begin().await?;
        let item = tx
            .get_action_item(action_item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Action item"))?;
        let venue = tx
            .get_venue(item.venue_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Venue"))?;
        let go_ahead = go_ahead_status(tx.as_mut(), item.id).await?;
        tx.commit().await?;

        Ok(ActionItemView {
            venue: VenueSummary::from(&venue),
            action_item: item,
            go_ahead,
        })
    }

    /// Starts the go-ahead flow. Idempotent: a second call returns the
    /// confirmations created by the first.
    pub async fn initiate(
        &self,
        action_item_id: Uuid,
        initiator_id: Uuid,
    ) -> Result<GoAheadStatus, DomainError> {
        let mut tx = self.store.begin().await?;
        let item = tx
            .lock_action_item(action_item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Action item"))?;

        if !item.is_active() {
            return Err(DomainError::invalid_state(format!(
                "Action item is {}",
                item.status
            )));
        }
        if !item.is_member(initiator_id) {
            return Err(DomainError::unauthorized(
                "Only interested users can start a go-ahead",
            ));
        }

        let existing = tx.list_confirmations(item.id).await?;
        if !existing.is_empty() {
            let chat_id = tx.find_chat_for_action_item(item.id).await?.map(|c| c.id);
            tx.commit().await?;
            tracing::debug!(
                action_item_id = %item.id,
                "Go-ahead already initiated, returning existing confirmations"
            );
            return Ok(GoAheadStatus::new(item.id, existing, chat_id));
        }

        let now = Utc::now();
        let mut invited: Vec<Uuid> = Vec::new();
        for user_id in &item.interested_user_ids {
            if *user_id != initiator_id && !invited.contains(user_id) {
                invited.push(*user_id);
            }
        }
        let confirmations: Vec<ActionItemConfirmation> = invited
            .iter()
            .map(|user_id| ActionItemConfirmation::pending(item.id, *user_id, initiator_id, now))
            .collect();

        tx.insert_confirmations(&confirmations).await?;
        let chat_id = tx.find_chat_for_action_item(item.id).await?.map(|c| c.id);
        tx.commit().await?;

        tracing::info!(
            action_item_id = %item.id,
            initiator_id = %initiator_id,
            invited = invited.len(),
            "Go-ahead initiated"
        );

        dispatch(
            self.notifier.as_ref(),
            NotificationPayload::GoAheadRequested(GoAheadRequestedPayload {
                notification_type: NotificationType::GoAheadRequested,
                action_item_id: item.id,
                venue_id: item.venue_id,
                initiator_id,
                recipient_ids: invited,
                timestamp: now,
            }),
        )
        .await;

        Ok(GoAheadStatus::new(item.id, confirmations, chat_id))
    }

    /// Confirms a pending go-ahead and bootstraps the chat at quorum.
    pub async fn confirm(
        &self,
        action_item_id: Uuid,
        user_id: Uuid,
    ) -> Result<ConfirmOutcome, DomainError> {
        let mut tx = self.store.begin().await?;
        let (item, confirmation) =
            load_pending_confirmation(tx.as_mut(), action_item_id, user_id).await?;

        let now = Utc::now();
        tx.update_confirmation(confirmation.id, ConfirmationStatus::Confirmed, now)
            .await?;

        let confirmations = tx.list_confirmations(item.id).await?;
        let confirmed: Vec<Uuid> = confirmations
            .iter()
            .filter(|c| c.status == ConfirmationStatus::Confirmed)
            .map(|c| c.user_id)
            .collect();
        let confirmed_count = confirmed.len() + 1;

        let mut chat_created = false;
        let chat = match tx.find_chat_for_action_item(item.id).await? {
            Some(chat) => {
                tx.add_chat_participants(chat.id, &[user_id], now).await?;
                Some(chat)
            }
            None if confirmed_count >= self.settings.chat_quorum => {
                let chat = Chat {
                    id: Uuid::new_v4(),
                    action_item_id: Some(item.id),
                    venue_id: item.venue_id,
                    created_by: confirmation.initiator_id,
                    created_at: now,
                };
                let mut members = vec![confirmation.initiator_id];
                for id in confirmed.iter().chain(std::iter::once(&user_id)) {
                    if !members.contains(id) {
                        members.push(*id);
                    }
                }
                tx.insert_chat(&chat).await.map_err(|e| match e {
                    StoreError::Conflict(_) => {
                        DomainError::Conflict("Action item already has a chat".into())
                    }
                    other => other.into(),
                })?;
                tx.add_chat_participants(chat.id, &members, now).await?;
                chat_created = true;
                Some(chat)
            }
            None => None,
        };

        tx.commit().await?;

        let confirmation = ActionItemConfirmation {
            status: ConfirmationStatus::Confirmed,
            responded_at: Some(now),
            ..confirmation
        };

        tracing::info!(
            action_item_id = %item.id,
            user_id = %user_id,
            confirmed_count,
            chat_created,
            "Go-ahead confirmed"
        );

        if chat_created {
            if let Some(chat) = &chat {
                let mut recipients = vec![confirmation.initiator_id];
                recipients.extend(confirmed.iter().copied().filter(|id| *id != confirmation.initiator_id));
                dispatch(
                    self.notifier.as_ref(),
                    NotificationPayload::ChatCreated(ChatCreatedPayload {
                        notification_type: NotificationType::ChatCreated,
                        chat_id: chat.id,
                        action_item_id: chat.action_item_id,
                        venue_id: chat.venue_id,
                        recipient_ids: recipients,
                        timestamp: now,
                    }),
                )
                .await;
            }
        }

        Ok(ConfirmOutcome {
            confirmation,
            confirmed_count,
            chat,
            chat_created,
        })
    }

    /// Declines a pending go-ahead.
    pub async fn decline(
        &self,
        action_item_id: Uuid,
        user_id: Uuid,
    ) -> Result<ActionItemConfirmation, DomainError> {
        let mut tx = self.store.begin().await?;
        let (item, confirmation) =
            load_pending_confirmation(tx.as_mut(), action_item_id, user_id).await?;

        let now = Utc::now();
        tx.update_confirmation(confirmation.id, ConfirmationStatus::Declined, now)
            .await?;
        tx.commit().await?;

        tracing::info!(action_item_id = %item.id, user_id = %user_id, "Go-ahead declined");

        Ok(ActionItemConfirmation {
            status: ConfirmationStatus::Declined,
            responded_at: Some(now),
            ..confirmation
        })
    }

    /// Archives an action item as dismissed.
    pub async fn dismiss(&self, action_item_id: Uuid, user_id: Uuid) -> Result<ActionItem, DomainError> {
        let mut tx = self.store.begin().await?;
        let item = self
            .archive(tx.as_mut(), action_item_id, user_id, ActionItemStatus::Dismissed)
            .await?;
        tx.commit().await?;

        tracing::info!(action_item_id = %item.id, user_id = %user_id, "Action item dismissed");
        Ok(item)
    }

    /// Archives an action item as completed, reserving a table for
    /// `book_venue` items. A failed reservation does not undo the completion.
    pub async fn complete(
        &self,
        action_item_id: Uuid,
        user_id: Uuid,
    ) -> Result<CompletionOutcome, DomainError> {
        let mut tx = self.store.begin().await?;
        let item = self
            .archive(tx.as_mut(), action_item_id, user_id, ActionItemStatus::Completed)
            .await?;

        let booking_request = if item.action_type == ActionType::BookVenue {
            let venue = tx.get_venue(item.venue_id).await?;
            let status = go_ahead_status(tx.as_mut(), item.id).await?;
            let party_size = if status.initiator_id.is_some() {
                status.confirmed_count
            } else {
                item.interested_user_ids.len()
            };
            venue.map(|v| ReservationRequest {
                venue_id: v.id,
                venue_name: v.name,
                party_size,
            })
        } else {
            None
        };
        tx.commit().await?;

        tracing::info!(action_item_id = %item.id, user_id = %user_id, "Action item completed");

        let reservation = match booking_request {
            Some(request) => match self.booking.reserve(request).await {
                Ok(reservation) => Some(reservation),
                Err(e) => {
                    tracing::warn!(
                        action_item_id = %item.id,
                        error = %e,
                        "Reservation failed after completion"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(CompletionOutcome {
            action_item: item,
            reservation,
        })
    }

    async fn archive(
        &self,
        tx: &mut dyn SocialTx,
        action_item_id: Uuid,
        user_id: Uuid,
        status: ActionItemStatus,
    ) -> Result<ActionItem, DomainError> {
        let item = tx
            .lock_action_item(action_item_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Action item"))?;

        if !item.is_member(user_id) {
            return Err(DomainError::unauthorized(
                "Only interested users can update this action item",
            ));
        }
        if item.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "Action item is already {}",
                item.status
            )));
        }

        let now = Utc::now();
        tx.update_action_item_status(item.id, status, Some(now)).await?;
        Ok(ActionItem {
            status,
            archived_at: Some(now),
            ..item
        })
    }

    /// Expires every active item past its deadline. Returns how many moved.
    pub async fn expire(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut tx = self.store.begin().await?;
        let expired = tx.expire_action_items(now).await?;
        tx.commit().await?;

        if expired > 0 {
            tracing::info!(expired, "Expired action items");
        }
        Ok(expired)
    }
}

async fn load_pending_confirmation(
    tx: &mut dyn SocialTx,
    action_item_id: Uuid,
    user_id: Uuid,
) -> Result<(ActionItem, ActionItemConfirmation), DomainError> {
    let item = tx
        .lock_action_item(action_item_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Action item"))?;
    if !item.is_active() {
        return Err(DomainError::invalid_state(format!(
            "Action item is {}",
            item.status
        )));
    }

    let confirmation = tx
        .find_confirmation(item.id, user_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Confirmation"))?;
    if confirmation.status != ConfirmationStatus::Pending {
        return Err(DomainError::invalid_state(format!(
            "Confirmation already {}",
            confirmation.status
        )));
    }

    Ok((item, confirmation))
}

async fn go_ahead_status(
    tx: &mut dyn SocialTx,
    action_item_id: Uuid,
) -> Result<GoAheadStatus, DomainError> {
    let confirmations = tx.list_confirmations(action_item_id).await?;
    let chat_id = tx
        .find_chat_for_action_item(action_item_id)
        .await?
        .map(|c| c.id);
    Ok(GoAheadStatus::new(action_item_id, confirmations, chat_id))
}
