//! # quill_core
//!
//! Core domain logic for Quill.

pub mod auth;
pub mod channels;
pub mod chats;
pub mod inference;
pub mod migrate;
pub mod prompt;
pub mod retrieval;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
