//! Run status polling.
//!
//! A run is observed, never driven: after submission the client checks the
//! run's status on a fixed cadence until the backend reports a terminal
//! state or the attempt budget runs out. Checks are strictly sequential;
//! the next one is only scheduled after the previous response is processed,
//! so a run never has two status requests in flight.

use crate::reply;
use sonda_core::error::SondaError;
use sonda_core::run::{Run, RunStatus};
use sonda_core::session::Message;
use sonda_core::ChatApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Timing and budget for one poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Delay before the first status check, giving the run a chance to start.
    pub initial_delay: Duration,
    /// Spacing between consecutive status checks.
    pub interval: Duration,
    /// Number of status checks before the client gives up.
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(2),
            interval: Duration::from_secs(1),
            max_attempts: 60,
        }
    }
}

/// How a poll loop settled.
///
/// Every variant is terminal; the loop never continues past any of them.
/// `TimedOut` and `PollFailed` are client-side outcomes the backend knows
/// nothing about.
#[derive(Debug)]
pub enum RunOutcome {
    /// The run reported `success`.
    Completed(Run),
    /// The run reported `failure` with an optional error classification.
    Failed(Run),
    /// The attempt budget was exhausted before a terminal status appeared.
    TimedOut,
    /// A status check itself failed; polling is not resumed.
    PollFailed(SondaError),
}

impl RunOutcome {
    /// Builds the final assistant message that replaces `placeholder`.
    ///
    /// Identity fields (id, session, role, timestamps) are carried over from
    /// the placeholder so reconciliation preserves position and identifier
    /// semantics; content and result fields come from the outcome.
    pub fn into_reply(self, placeholder: &Message) -> Message {
        let mut message = placeholder.clone();
        match self {
            RunOutcome::Completed(run) => {
                message.content = run
                    .result_data
                    .unwrap_or_else(|| reply::ANSWER_RECEIVED.to_string());
                message.sql_query = run.sql_used;
                message.graph_url = run.graph_url;
                message.run_id = Some(run.id);
            }
            RunOutcome::Failed(run) => {
                message.content = reply::failure_content(run.error_type.as_deref());
            }
            RunOutcome::TimedOut => {
                message.content = reply::TIMEOUT.to_string();
            }
            RunOutcome::PollFailed(_) => {
                message.content = reply::POLL_FAILURE.to_string();
            }
        }
        message
    }
}

/// Polls a run until terminal, timed out, or failed.
#[derive(Clone)]
pub struct RunPoller {
    api: Arc<dyn ChatApi>,
    policy: PollPolicy,
}

impl RunPoller {
    /// Creates a poller over the given backend with the given policy.
    pub fn new(api: Arc<dyn ChatApi>, policy: PollPolicy) -> Self {
        Self { api, policy }
    }

    /// Returns the poller's policy.
    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Runs the poll loop for `run_id` to completion.
    ///
    /// Waits the initial delay, then checks the run's status once per
    /// interval. Settles on the first terminal status, on the first
    /// transport failure, or after `max_attempts` checks.
    pub async fn poll(&self, run_id: i64) -> RunOutcome {
        sleep(self.policy.initial_delay).await;

        for attempt in 1..=self.policy.max_attempts {
            match self.api.get_run(run_id).await {
                Ok(run) => match run.status {
                    RunStatus::Success => {
                        tracing::debug!(target: "sonda_poll", run_id, attempt, "run completed");
                        return RunOutcome::Completed(run);
                    }
                    RunStatus::Failure => {
                        tracing::debug!(
                            target: "sonda_poll",
                            run_id,
                            attempt,
                            error_type = run.error_type.as_deref().unwrap_or("-"),
                            "run failed"
                        );
                        return RunOutcome::Failed(run);
                    }
                    RunStatus::Queued | RunStatus::Running => {
                        if attempt == self.policy.max_attempts {
                            tracing::warn!(target: "sonda_poll", run_id, attempt, "poll budget exhausted");
                            return RunOutcome::TimedOut;
                        }
                    }
                },
                Err(err) => {
                    tracing::warn!(target: "sonda_poll", run_id, attempt, %err, "poll request failed");
                    return RunOutcome::PollFailed(err);
                }
            }

            sleep(self.policy.interval).await;
        }

        RunOutcome::TimedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sonda_core::agent::Agent;
    use sonda_core::api::{MessagePage, SessionPage};
    use sonda_core::error::Result;
    use sonda_core::run::RunRequest;
    use sonda_core::session::ChatSession;
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn run_with_status(status: RunStatus) -> Run {
        Run {
            id: 7,
            agent_id: 1,
            user_id: 1,
            question: "total de vendas".to_string(),
            task_id: None,
            sql_used: None,
            result_data: None,
            graph_url: None,
            status,
            execution_ms: None,
            result_rows_count: None,
            error_type: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            finished_at: None,
            chat_session_id: Some(1),
        }
    }

    /// Backend stub that serves a scripted sequence of run states, then
    /// keeps repeating the last one. Only `get_run` is exercised here.
    struct ScriptedRunApi {
        script: Mutex<Vec<Result<Run>>>,
        calls: Mutex<u32>,
    }

    impl ScriptedRunApi {
        fn new(script: Vec<Result<Run>>) -> Self {
            Self {
                script: Mutex::new(script),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl ChatApi for ScriptedRunApi {
        async fn list_agents(&self) -> Result<Vec<Agent>> {
            Err(SondaError::internal("not used"))
        }
        async fn get_agent(&self, _: i64) -> Result<Agent> {
            Err(SondaError::internal("not used"))
        }
        async fn create_session(&self, _: i64, _: Option<&str>) -> Result<ChatSession> {
            Err(SondaError::internal("not used"))
        }
        async fn get_session(&self, _: i64) -> Result<ChatSession> {
            Err(SondaError::internal("not used"))
        }
        async fn list_sessions(&self, _: i64, _: u32, _: u32) -> Result<SessionPage> {
            Err(SondaError::internal("not used"))
        }
        async fn delete_session(&self, _: i64) -> Result<()> {
            Err(SondaError::internal("not used"))
        }
        async fn get_messages(&self, _: i64, _: u32, _: u32) -> Result<MessagePage> {
            Err(SondaError::internal("not used"))
        }
        async fn create_run(&self, _: i64, _: &RunRequest) -> Result<Run> {
            Err(SondaError::internal("not used"))
        }

        async fn get_run(&self, _: i64) -> Result<Run> {
            *self.calls.lock().unwrap() += 1;
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            }
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy::default()
    }

    #[tokio::test(start_paused = true)]
    async fn settles_on_success_by_third_attempt() {
        let mut success = run_with_status(RunStatus::Success);
        success.result_data = Some("R$100".to_string());
        let api = Arc::new(ScriptedRunApi::new(vec![
            Ok(run_with_status(RunStatus::Queued)),
            Ok(run_with_status(RunStatus::Running)),
            Ok(success),
        ]));

        let poller = RunPoller::new(api.clone(), policy());
        let outcome = poller.poll(7).await;

        assert_eq!(api.calls(), 3);
        match outcome {
            RunOutcome::Completed(run) => assert_eq!(run.result_data.as_deref(), Some("R$100")),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_check_waits_the_initial_delay() {
        let api = Arc::new(ScriptedRunApi::new(vec![Ok(run_with_status(
            RunStatus::Success,
        ))]));
        let poller = RunPoller::new(api, policy());

        let started = Instant::now();
        poller.poll(7).await;

        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_the_budget_after_sixty_checks() {
        let api = Arc::new(ScriptedRunApi::new(vec![Ok(run_with_status(
            RunStatus::Running,
        ))]));
        let poller = RunPoller::new(api.clone(), policy());

        let started = Instant::now();
        let outcome = poller.poll(7).await;

        assert!(matches!(outcome, RunOutcome::TimedOut));
        assert_eq!(api.calls(), 60);
        // 2s initial delay + 59 one-second gaps between the 60 checks.
        assert_eq!(started.elapsed(), Duration::from_secs(61));
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_is_terminal() {
        let api = Arc::new(ScriptedRunApi::new(vec![
            Ok(run_with_status(RunStatus::Queued)),
            Err(SondaError::transport("connection reset")),
            Ok(run_with_status(RunStatus::Success)),
        ]));
        let poller = RunPoller::new(api.clone(), policy());

        let outcome = poller.poll(7).await;

        assert!(matches!(outcome, RunOutcome::PollFailed(_)));
        assert_eq!(api.calls(), 2);
    }

    #[test]
    fn reply_for_failure_carries_the_classification() {
        let placeholder = Message {
            id: 11,
            chat_session_id: 1,
            run_id: None,
            role: sonda_core::session::MessageRole::Assistant,
            content: reply::PROCESSING.to_string(),
            sql_query: None,
            graph_url: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            sequence_order: 1,
            message_metadata: None,
        };

        let mut failed = run_with_status(RunStatus::Failure);
        failed.error_type = Some("SQL_ERROR".to_string());

        let message = RunOutcome::Failed(failed).into_reply(&placeholder);
        assert_eq!(message.content, "Erro: SQL_ERROR");
        assert_eq!(message.id, 11);
    }
}
