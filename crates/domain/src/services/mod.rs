//! Domain services for Rally.
//!
//! Services contain business logic that operates on domain models. The pure
//! scoring and proximity rules live alongside the store-backed services.

pub mod action_items;
pub mod booking;
pub mod catalogue;
pub mod chat;
pub mod feed;
pub mod interest;
pub mod notification;
pub mod proximity;
pub mod recommendation;
pub mod scoring;

pub use action_items::{ActionItemCoordinator, CoordinationSettings};
pub use booking::{BookingAgent, BookingError, MockBookingAgent, ReservationRequest};
pub use catalogue::CatalogueService;
pub use chat::ChatService;
pub use feed::FeedService;
pub use interest::InterestLedger;
pub use notification::{
    ActionItemCreatedPayload, ChatCreatedPayload, GoAheadRequestedPayload,
    MockNotificationService, NotificationPayload, NotificationResult, NotificationService,
    NotificationType,
};
pub use proximity::{haversine_distance, proximity_score};
pub use recommendation::RecommendationService;
pub use scoring::{score_venue, ScoreInput};
