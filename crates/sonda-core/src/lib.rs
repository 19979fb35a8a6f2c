//! Domain layer for Sonda.
//!
//! This crate holds the data model shared by every other crate (sessions,
//! messages, runs, agents), the [`ChatApi`] trait that abstracts the
//! backend, and the [`MessageBuffer`](session::MessageBuffer) owning the
//! active session's visible message list.

pub mod agent;
pub mod api;
pub mod error;
pub mod run;
pub mod session;

// Re-export common error type
pub use api::ChatApi;
pub use error::SondaError;
