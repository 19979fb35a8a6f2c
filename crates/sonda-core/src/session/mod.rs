//! Session domain module.
//!
//! This module contains the session and message domain models and the
//! in-memory buffer that owns the active session's visible message list.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`ChatSession`)
//! - `message`: Conversation message types (`MessageRole`, `Message`)
//! - `buffer`: Optimistic message list (`MessageBuffer`)

mod buffer;
mod message;
mod model;

// Re-export public API
pub use buffer::MessageBuffer;
pub use message::{Message, MessageRole};
pub use model::ChatSession;
