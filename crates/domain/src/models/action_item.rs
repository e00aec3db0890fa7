//! Action item and go-ahead confirmation models.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::chat::Chat;
use super::venue::VenueSummary;

lazy_static! {
    static ref ACTION_CODE_REGEX: Regex = Regex::new(r"^GO-[0-9A-F]{8}-[0-9]{4}$").unwrap();
}

/// Category fragments that make a venue bookable.
pub const BOOKABLE_CATEGORIES: &[&str] = &["restaurant", "bar", "club", "lounge", "bistro", "cafe"];

/// Description templates; `{count}` is replaced with the interested-user count.
pub const DESCRIPTION_TEMPLATES: &[&str] = &[
    "{count} people want to go here. Time to make plans!",
    "{count} people are interested. Coordinate a visit!",
    "Trending spot: {count} people interested. Ready to go?",
    "{count} people have this on their list. Get the group together!",
];

/// Lifecycle status of an action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionItemStatus {
    Active,
    Dismissed,
    Expired,
    Completed,
}

impl ActionItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionItemStatus::Active => "active",
            ActionItemStatus::Dismissed => "dismissed",
            ActionItemStatus::Expired => "expired",
            ActionItemStatus::Completed => "completed",
        }
    }

    /// Terminal states never return to active.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionItemStatus::Active)
    }
}

impl FromStr for ActionItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ActionItemStatus::Active),
            "dismissed" => Ok(ActionItemStatus::Dismissed),
            "expired" => Ok(ActionItemStatus::Expired),
            "completed" => Ok(ActionItemStatus::Completed),
            _ => Err(format!("Invalid action item status: {}", s)),
        }
    }
}

impl fmt::Display for ActionItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the group is expected to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    BookVenue,
    VisitVenue,
}

impl ActionType {
    /// Derives the action type from a venue category.
    ///
    /// Any bookable fragment appearing in the category, case-insensitively,
    /// yields `BookVenue`.
    pub fn for_category(category: &str) -> Self {
        let category = category.to_lowercase();
        if BOOKABLE_CATEGORIES.iter().any(|c| category.contains(c)) {
            ActionType::BookVenue
        } else {
            ActionType::VisitVenue
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::BookVenue => "book_venue",
            ActionType::VisitVenue => "visit_venue",
        }
    }
}

impl FromStr for ActionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book_venue" => Ok(ActionType::BookVenue),
            "visit_venue" => Ok(ActionType::VisitVenue),
            _ => Err(format!("Invalid action type: {}", s)),
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of one user's go-ahead response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    Pending,
    Confirmed,
    Declined,
}

impl ConfirmationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationStatus::Pending => "pending",
            ConfirmationStatus::Confirmed => "confirmed",
            ConfirmationStatus::Declined => "declined",
        }
    }
}

impl FromStr for ConfirmationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConfirmationStatus::Pending),
            "confirmed" => Ok(ConfirmationStatus::Confirmed),
            "declined" => Ok(ConfirmationStatus::Declined),
            _ => Err(format!("Invalid confirmation status: {}", s)),
        }
    }
}

impl fmt::Display for ConfirmationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared record created when enough users are interested in a venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: Uuid,
    pub venue_id: Uuid,
    /// Snapshot of interested users at creation time.
    pub interested_user_ids: Vec<Uuid>,
    pub action_type: ActionType,
    pub action_code: String,
    pub description: String,
    pub status: ActionItemStatus,
    pub threshold_met: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl ActionItem {
    /// Whether `user_id` is part of the interested snapshot.
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.interested_user_ids.contains(&user_id)
    }

    pub fn is_active(&self) -> bool {
        self.status == ActionItemStatus::Active
    }
}

/// One invited user's response to a go-ahead.
///
/// The initiator never has a row and is always counted as confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItemConfirmation {
    pub id: Uuid,
    pub action_item_id: Uuid,
    pub user_id: Uuid,
    pub initiator_id: Uuid,
    pub status: ConfirmationStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ActionItemConfirmation {
    pub fn pending(
        action_item_id: Uuid,
        user_id: Uuid,
        initiator_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action_item_id,
            user_id,
            initiator_id,
            status: ConfirmationStatus::Pending,
            responded_at: None,
            created_at,
        }
    }
}

/// Aggregated go-ahead state of an action item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoAheadStatus {
    pub action_item_id: Uuid,
    /// `None` until the go-ahead flow has been initiated.
    pub initiator_id: Option<Uuid>,
    pub confirmations: Vec<ActionItemConfirmation>,
    /// Confirmed rows plus the initiator.
    pub confirmed_count: usize,
    pub pending_count: usize,
    pub declined_count: usize,
    pub chat_id: Option<Uuid>,
}

impl GoAheadStatus {
    pub fn new(
        action_item_id: Uuid,
        confirmations: Vec<ActionItemConfirmation>,
        chat_id: Option<Uuid>,
    ) -> Self {
        let initiator_id = confirmations.first().map(|c| c.initiator_id);
        let count = |status| confirmations.iter().filter(|c| c.status == status).count();
        let confirmed_rows = count(ConfirmationStatus::Confirmed);
        let pending_count = count(ConfirmationStatus::Pending);
        let declined_count = count(ConfirmationStatus::Declined);

        Self {
            action_item_id,
            initiator_id,
            confirmed_count: confirmed_rows + usize::from(initiator_id.is_some()),
            pending_count,
            declined_count,
            confirmations,
            chat_id,
        }
    }
}

/// Result of a successful confirm.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmOutcome {
    pub confirmation: ActionItemConfirmation,
    pub confirmed_count: usize,
    pub chat: Option<Chat>,
    /// True only for the confirm that created the chat.
    pub chat_created: bool,
}

/// Simulated reservation returned by a booking agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub reservation_code: String,
    pub venue_id: Uuid,
    pub party_size: usize,
    pub message: String,
}

/// Result of completing an action item.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub action_item: ActionItem,
    pub reservation: Option<Reservation>,
}

/// Action item with its venue and go-ahead state.
#[derive(Debug, Clone, Serialize)]
pub struct ActionItemView {
    pub action_item: ActionItem,
    pub venue: VenueSummary,
    pub go_ahead: GoAheadStatus,
}

/// Request body carrying the acting user for coordinator operations.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionItemUserRequest {
    pub user_id: Uuid,
}

/// Response for an expire sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ExpireSweepResponse {
    pub expired: u64,
    pub swept_at: DateTime<Utc>,
}

/// Generates a shareable code of the form `GO-XXXXXXXX-NNNN`.
///
/// The hex block is the first 8 digits of the venue id, uppercased.
pub fn generate_action_code<R: Rng + ?Sized>(venue_id: Uuid, rng: &mut R) -> String {
    let simple = venue_id.simple().to_string().to_uppercase();
    format!("GO-{}-{:04}", &simple[..8], rng.gen_range(1000..=9999))
}

/// Checks an action code's format.
pub fn is_valid_action_code(code: &str) -> bool {
    ACTION_CODE_REGEX.is_match(code)
}

/// Picks a description template and embeds `count`.
pub fn generate_description<R: Rng + ?Sized>(count: usize, rng: &mut R) -> String {
    let template = DESCRIPTION_TEMPLATES[rng.gen_range(0..DESCRIPTION_TEMPLATES.len())];
    template.replace("{count}", &count.to_string())
}
