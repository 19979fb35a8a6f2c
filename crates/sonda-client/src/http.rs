//! HTTP implementation of the backend API.
//!
//! `HttpChatApi` talks REST to the data-analysis backend, attaching the
//! bearer credential from [`ClientConfig`] to every request and mapping
//! HTTP failures onto [`SondaError`].

use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use sonda_core::agent::Agent;
use sonda_core::api::{ChatApi, MessagePage, SessionPage};
use sonda_core::error::{Result, SondaError};
use sonda_core::run::{Run, RunRequest};
use sonda_core::session::ChatSession;

/// reqwest-backed client for the data-analysis backend.
#[derive(Clone)]
pub struct HttpChatApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpChatApi {
    /// Creates a client from resolved configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_url,
            token: config.api_token,
        }
    }

    /// Creates a client against an explicit base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| SondaError::transport(format!("Request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            tracing::warn!(target: "sonda_client", status = status.as_u16(), "backend rejected request");
            return Err(map_http_error(status, &body));
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response.json::<T>().await.map_err(|err| {
            SondaError::Serialization {
                format: "JSON".to_string(),
                message: format!("Failed to decode backend response: {err}"),
            }
        })
    }
}

/// Extracts the backend's `detail` field from an error body, falling back
/// to the raw body when it is absent or not JSON.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .map(|detail| match detail.as_str() {
                    Some(s) => s.to_string(),
                    None => detail.to_string(),
                })
        })
        .unwrap_or_else(|| body.to_string())
}

fn map_http_error(status: StatusCode, body: &str) -> SondaError {
    SondaError::api(status.as_u16(), error_detail(body))
}

#[async_trait]
impl ChatApi for HttpChatApi {
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.get_json(self.client.get(self.url("/agents"))).await
    }

    async fn get_agent(&self, agent_id: i64) -> Result<Agent> {
        self.get_json(self.client.get(self.url(&format!("/agents/{agent_id}"))))
            .await
    }

    async fn create_session(&self, agent_id: i64, title: Option<&str>) -> Result<ChatSession> {
        let request = self
            .client
            .post(self.url("/chat-sessions"))
            .json(&serde_json::json!({ "agent_id": agent_id, "title": title }));
        self.get_json(request).await
    }

    async fn get_session(&self, session_id: i64) -> Result<ChatSession> {
        self.get_json(
            self.client
                .get(self.url(&format!("/chat-sessions/{session_id}"))),
        )
        .await
    }

    async fn list_sessions(&self, agent_id: i64, page: u32, per_page: u32) -> Result<SessionPage> {
        let request = self.client.get(self.url("/chat-sessions")).query(&[
            ("agent_id", agent_id.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
            ("status", "active".to_string()),
        ]);
        self.get_json(request).await
    }

    async fn delete_session(&self, session_id: i64) -> Result<()> {
        self.send(
            self.client
                .delete(self.url(&format!("/chat-sessions/{session_id}"))),
        )
        .await?;
        Ok(())
    }

    async fn get_messages(
        &self,
        session_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<MessagePage> {
        let request = self
            .client
            .get(self.url(&format!("/chat-sessions/{session_id}/messages")))
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())]);
        self.get_json(request).await
    }

    async fn create_run(&self, agent_id: i64, request: &RunRequest) -> Result<Run> {
        let request = self
            .client
            .post(self.url(&format!("/agents/{agent_id}/run")))
            .json(request);
        self.get_json(request).await
    }

    async fn get_run(&self, run_id: i64) -> Result<Run> {
        self.get_json(self.client.get(self.url(&format!("/runs/{run_id}"))))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_the_detail_field() {
        assert_eq!(
            error_detail(r#"{"detail": "Agente sem conexão configurada"}"#),
            "Agente sem conexão configurada"
        );
    }

    #[test]
    fn error_detail_falls_back_to_raw_body() {
        assert_eq!(error_detail("boom"), "boom");
        assert_eq!(error_detail(r#"{"other": 1}"#), r#"{"other": 1}"#);
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let api = HttpChatApi::with_base_url("http://localhost:8000/", None);
        assert_eq!(api.url("/agents"), "http://localhost:8000/agents");
    }
}
