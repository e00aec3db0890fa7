//! Repository implementations for database operations.
//!
//! Repositories are stateless and take the connection to run on, so the
//! store adapter can compose them inside one transaction.

pub mod action_item;
pub mod chat;
pub mod interest;
pub mod lock;
pub mod user;
pub mod venue;

pub use action_item::{ActionItemRepository, ConfirmationRepository};
pub use chat::{ChatMessageRepository, ChatRepository};
pub use interest::{ActivityRepository, InterestRepository};
pub use lock::{AdvisoryLock, INTEREST_LOCK_NAMESPACE, VENUE_LOCK_NAMESPACE};
pub use user::{UserInput, UserRepository};
pub use venue::VenueRepository;
