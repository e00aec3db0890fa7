//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod action_item;
pub mod chat;
pub mod interest;
pub mod user;
pub mod venue;

pub use action_item::{ActionItemEntity, ConfirmationEntity};
pub use chat::{ChatEntity, ChatMessageEntity, ChatParticipantEntity};
pub use interest::{ActivityEntity, InterestEntity};
pub use user::{FriendshipEntity, UserEntity};
pub use venue::{VenueEntity, VenueInterestCountEntity};
