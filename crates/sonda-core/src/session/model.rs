//! Chat session domain model.
//!
//! This module contains the core ChatSession entity that represents
//! a persisted conversation thread on the backend.

use serde::{Deserialize, Serialize};

/// A persisted, titled conversation thread grouping ordered messages.
///
/// Sessions are created lazily: a conversation has no session until the
/// first message is sent, at which point the backend assigns an identifier.
/// Title, preview and counters are maintained server-side; the client never
/// mutates a session beyond replacing it with a server-confirmed copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Backend-assigned session identifier
    pub id: i64,
    /// Human-readable session title (derived server-side from the first question)
    pub title: String,
    /// Denormalized preview of the most recent message
    pub last_message: Option<String>,
    /// Total number of messages in the session
    pub messages_count: u32,
    /// Timestamp of the last update (ISO 8601 format)
    pub updated_at: String,
    /// Session status ("active", "archived", ...)
    pub status: String,
    /// Identifier of the agent that owns this session
    pub agent_id: i64,
}
