//! Backend API trait.
//!
//! Defines the interface the orchestration layer uses to talk to the
//! backend, decoupling it from the HTTP implementation so tests can
//! substitute scripted fakes at this seam.

use crate::agent::Agent;
use crate::error::Result;
use crate::run::{Run, RunRequest};
use crate::session::{ChatSession, Message};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Pagination metadata returned by list endpoints.
///
/// The session list additionally reports `has_next`/`has_prev`; the
/// message list does not, so both are optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_prev: Option<bool>,
}

/// One page of an agent's session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPage {
    pub sessions: Vec<ChatSession>,
    pub pagination: PaginationInfo,
}

/// Session summary attached to a message page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: i64,
    pub title: String,
    pub total_messages: u64,
}

/// One page of a session's persisted messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub pagination: PaginationInfo,
    pub session_info: SessionSummary,
}

/// An abstract client for the data-analysis backend.
///
/// This trait defines the contract for every backend interaction the
/// orchestration engine performs: session lifecycle, message history,
/// and run submission/observation. All calls are stateless
/// request/response; none of them retry. Retrying a run status check is
/// the poller's policy, not the gateway's.
///
/// Authentication is the implementation's concern (the HTTP client
/// attaches a bearer credential); callers never see credentials.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Lists the agents available to the authenticated user.
    async fn list_agents(&self) -> Result<Vec<Agent>>;

    /// Fetches a single agent by its ID.
    async fn get_agent(&self, agent_id: i64) -> Result<Agent>;

    /// Creates a new chat session for an agent.
    ///
    /// The backend assigns the identifier and an initial title.
    async fn create_session(&self, agent_id: i64, title: Option<&str>) -> Result<ChatSession>;

    /// Fetches the canonical record of a session.
    async fn get_session(&self, session_id: i64) -> Result<ChatSession>;

    /// Lists an agent's active sessions, most recent first.
    async fn list_sessions(&self, agent_id: i64, page: u32, per_page: u32) -> Result<SessionPage>;

    /// Deletes a session and its messages.
    async fn delete_session(&self, session_id: i64) -> Result<()>;

    /// Fetches one page of a session's persisted messages in display order.
    async fn get_messages(&self, session_id: i64, page: u32, per_page: u32)
    -> Result<MessagePage>;

    /// Submits a question for execution and returns the run handle.
    ///
    /// The returned run starts in `queued` status; completion is observed
    /// via [`ChatApi::get_run`]. Transport and validation failures
    /// propagate to the caller unchanged.
    async fn create_run(&self, agent_id: i64, request: &RunRequest) -> Result<Run>;

    /// Fetches the current state of a run.
    async fn get_run(&self, run_id: i64) -> Result<Run>;
}
