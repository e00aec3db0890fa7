//! Shared utilities and common types for the Rally backend.
//!
//! This crate provides functionality used across all other crates:
//! - Page/limit pagination with clamping
//! - Common validation logic for request payloads

pub mod pagination;
pub mod validation;
