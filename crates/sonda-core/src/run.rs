//! Run domain model.
//!
//! A run is a backend-tracked unit of work that turns a question into an
//! answer (and optionally SQL and a chart). The client creates runs and
//! observes their status by polling; it never writes a run's state.

use serde::{Deserialize, Serialize};

/// Backend-reported run status.
///
/// `Queued` and `Running` are non-terminal; `Success` and `Failure` are
/// terminal. Attempt exhaustion on the client side is not a backend status
/// and is represented by the poller, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Success,
    Failure,
}

impl RunStatus {
    /// Returns true for statuses in which the backend will not change the run anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

/// A full run record as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Backend-assigned run identifier
    pub id: i64,
    /// Identifier of the agent executing the run
    pub agent_id: i64,
    /// Identifier of the user that submitted the question
    pub user_id: i64,
    /// The question text as submitted
    pub question: String,
    /// Backend task correlation identifier, if any
    pub task_id: Option<String>,
    /// SQL statement the backend executed, present once terminal
    pub sql_used: Option<String>,
    /// Answer text, present once terminal
    pub result_data: Option<String>,
    /// Reference to a rendered chart, if one was produced
    pub graph_url: Option<String>,
    /// Current status
    pub status: RunStatus,
    /// Execution time in milliseconds, once finished
    pub execution_ms: Option<i64>,
    /// Number of rows the executed SQL returned
    pub result_rows_count: Option<i64>,
    /// Error classification when `status` is `failure`
    pub error_type: Option<String>,
    /// Timestamp when the run was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the run reached a terminal status
    pub finished_at: Option<String>,
    /// Session the run belongs to
    pub chat_session_id: Option<i64>,
}

/// Payload for submitting a new run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// The trimmed, non-empty question text
    pub question: String,
    /// Session to attach the run to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_session_id: Option<i64>,
}
