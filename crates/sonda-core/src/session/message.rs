//! Conversation message types.
//!
//! This module contains types for representing messages in a session,
//! including roles and message content.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
    /// System-generated message.
    System,
}

/// A single message in a session's conversation history.
///
/// Messages come in two provenances: *confirmed* messages carry a
/// backend-assigned identifier and content, while *optimistic* messages
/// carry a client-generated identifier (derived from the current time)
/// and placeholder content shown before the server responds. Both share
/// this shape so the buffer can replace one with the other in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier (backend-assigned, or provisional for optimistic entries)
    pub id: i64,
    /// Identifier of the owning session
    pub chat_session_id: i64,
    /// Identifier of the run that produced this message, if any
    pub run_id: Option<i64>,
    /// The role of the message sender
    pub role: MessageRole,
    /// The content of the message
    pub content: String,
    /// SQL statement the backend executed to answer, if any
    pub sql_query: Option<String>,
    /// Reference to a rendered chart for this answer, if any
    pub graph_url: Option<String>,
    /// Timestamp when the message was created (ISO 8601 format)
    pub created_at: String,
    /// Position of the message within the session
    pub sequence_order: u32,
    /// Optional structured metadata attached by the backend
    #[serde(default)]
    pub message_metadata: Option<HashMap<String, serde_json::Value>>,
}
