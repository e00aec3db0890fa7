//! Domain models for Rally.

pub mod action_item;
pub mod chat;
pub mod feed;
pub mod interest;
pub mod recommendation;
pub mod user;
pub mod venue;

pub use action_item::{
    ActionItem, ActionItemConfirmation, ActionItemStatus, ActionItemUserRequest, ActionItemView,
    ActionType, CompletionOutcome, ConfirmOutcome, ConfirmationStatus, ExpireSweepResponse,
    GoAheadStatus, Reservation,
};
pub use chat::{
    Chat, ChatMessage, ChatParticipant, ChatSummary, ChatWithParticipants, CreateChatRequest,
    ListMessagesQuery, MessagePage, MessagePreview, SendMessageRequest,
};
pub use feed::{FeedItem, FeedQuery, FriendActivityPage, HighlightedVenue, SocialFeed};
pub use interest::{Activity, Interest, ToggleInterestRequest, ToggleResult, ACTIVITY_INTERESTED};
pub use recommendation::{
    ComponentScore, Recommendation, RecommendationsResponse, ScoreBreakdown, VenueScore,
};
pub use user::{Friendship, ProfileActionItem, User, UserProfile, UserSummary};
pub use venue::{
    ListVenuesQuery, ListVenuesResponse, Venue, VenueDetail, VenueDetailQuery, VenueFilters,
    VenueListItem, VenueSortBy, VenueSummary,
};
