//! HTTP route handlers.

pub mod action_items;
pub mod admin;
pub mod chats;
pub mod health;
pub mod interests;
pub mod users;
pub mod venues;
