//! Persistence layer for Rally.
//!
//! This crate contains:
//! - Database connection management and embedded migrations
//! - Entity definitions (database row mappings)
//! - Repositories over a single connection
//! - [`store::PgSocialStore`], the PostgreSQL implementation of the store ports

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod store;

pub use store::{PgSocialStore, PgSocialTx};
