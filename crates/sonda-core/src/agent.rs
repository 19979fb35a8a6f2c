//! Agent domain model.

use serde::{Deserialize, Serialize};

/// A data-analysis agent a user converses with.
///
/// Only the fields the client surfaces are modeled; the backend record
/// carries further tuning parameters that are ignored on deserialization.
/// The wire name for `name` is the backend's `nome`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Backend-assigned agent identifier
    pub id: i64,
    /// Display name
    #[serde(rename = "nome")]
    pub name: String,
    /// Optional description shown on the agent picker
    pub description: Option<String>,
    /// Model the agent is configured to use
    pub selected_model: String,
    /// Database connection the agent queries, if configured
    pub connection_id: Option<i64>,
    /// Timestamp when the agent was created (ISO 8601 format)
    pub created_at: String,
}
