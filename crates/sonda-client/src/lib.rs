//! HTTP infrastructure for Sonda.
//!
//! This crate provides the reqwest-backed implementation of
//! [`sonda_core::ChatApi`] and the configuration loading that locates the
//! backend and the bearer credential.

pub mod config;
pub mod http;

pub use config::ClientConfig;
pub use http::HttpChatApi;
