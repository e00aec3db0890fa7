//! Domain layer for the Rally backend.
//!
//! This crate contains:
//! - Domain models (User, Venue, Interest, ActionItem, Chat, Activity)
//! - Pure scoring and proximity rules
//! - Store ports and an in-memory transactional store
//! - Coordination, chat, feed and catalogue services
//! - Domain error types

pub mod error;
pub mod memory_store;
pub mod models;
pub mod ports;
pub mod services;

pub use error::{DomainError, StoreError};
