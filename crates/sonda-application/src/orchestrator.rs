//! Chat run orchestration.
//!
//! One orchestrator instance owns the active session, the visible message
//! buffer and every in-flight poll loop, and reports state changes through
//! a single event stream. Surfaces call into it and render from its events;
//! they never talk to the backend or mutate the buffer themselves.

use crate::event::{self, ChatEvent, EventReceiver, EventSender};
use crate::poller::{PollPolicy, RunPoller};
use crate::reply;
use chrono::Utc;
use sonda_core::api::SessionPage;
use sonda_core::error::Result;
use sonda_core::run::RunRequest;
use sonda_core::session::{ChatSession, Message, MessageBuffer, MessageRole};
use sonda_core::{ChatApi, SondaError};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Page size used when loading a session's history.
const HISTORY_PAGE_SIZE: u32 = 100;

/// Handle to one live poll loop, kept so session switches can cancel it.
struct PollHandle {
    session_id: i64,
    placeholder_id: i64,
    token: CancellationToken,
}

/// Receipt for an accepted send.
///
/// Returned once the optimistic pair is staged and the run is submitted.
/// `settled` completes when the poll loop has reconciled the placeholder
/// (or was cancelled); callers that need to know when the answer landed
/// await it, everyone else drops it.
#[derive(Debug)]
pub struct SendTicket {
    pub session_id: i64,
    pub run_id: i64,
    pub user_message_id: i64,
    pub placeholder_id: i64,
    pub settled: JoinHandle<()>,
}

/// Shared orchestrator for one conversation surface group.
pub struct ChatOrchestrator {
    api: Arc<dyn ChatApi>,
    poller: RunPoller,
    buffer: Arc<RwLock<MessageBuffer>>,
    events: EventSender,
    selected: RwLock<Option<ChatSession>>,
    /// Session id of a session created by a send and not yet settled, so
    /// selecting it again does not clobber the optimistic pair with an
    /// empty history load. Zero means none; cleared once a run for the
    /// session settles and the server history is authoritative again.
    fresh_session_id: Arc<AtomicI64>,
    polls: Arc<Mutex<Vec<PollHandle>>>,
    /// Monotonic provisional-id source, advanced to wall-clock millis on
    /// each allocation so ids stay time-ordered yet collision-free.
    clock: AtomicI64,
}

impl ChatOrchestrator {
    /// Creates an orchestrator over `api` together with its event stream.
    pub fn new(api: Arc<dyn ChatApi>, policy: PollPolicy) -> (Self, EventReceiver) {
        let (events, receiver) = event::channel();
        let orchestrator = Self {
            poller: RunPoller::new(api.clone(), policy),
            api,
            buffer: Arc::new(RwLock::new(MessageBuffer::new())),
            events,
            selected: RwLock::new(None),
            fresh_session_id: Arc::new(AtomicI64::new(0)),
            polls: Arc::new(Mutex::new(Vec::new())),
            clock: AtomicI64::new(0),
        };
        (orchestrator, receiver)
    }

    /// Returns a snapshot of the visible message list.
    pub fn messages(&self) -> Vec<Message> {
        self.buffer.read().unwrap().messages().to_vec()
    }

    /// Returns the currently active session, if any.
    pub fn selected_session(&self) -> Option<ChatSession> {
        self.selected.read().unwrap().clone()
    }

    /// Submits a question to `agent_id` within the active session.
    ///
    /// Stages the optimistic user/placeholder pair, creates the session
    /// first when none is active, submits the run and spawns the poll loop
    /// that will reconcile the placeholder. Concurrent sends are allowed;
    /// each pair reconciles independently. Returns an error without side
    /// effects for a blank question or a failed session creation; a failed
    /// run submission settles the already-visible placeholder with a retry
    /// hint before the error propagates.
    pub async fn send(&self, agent_id: i64, input: &str) -> Result<SendTicket> {
        let question = input.trim();
        if question.is_empty() {
            return Err(SondaError::EmptyQuestion);
        }

        let session = match self.selected_session() {
            Some(session) => session,
            None => self.start_session(agent_id).await?,
        };

        let (user, placeholder) = self.stage_pair(&session, question);
        {
            let mut buffer = self.buffer.write().unwrap();
            buffer.seed(user.clone(), placeholder.clone());
        }
        let _ = self.events.send(ChatEvent::MessagePairStaged {
            user: user.clone(),
            placeholder: placeholder.clone(),
        });

        let request = RunRequest {
            question: question.to_string(),
            chat_session_id: Some(session.id),
        };
        let run = match self.api.create_run(agent_id, &request).await {
            Ok(run) => run,
            Err(err) => {
                tracing::warn!(target: "sonda_chat", agent_id, %err, "run submission failed");
                self.settle(&placeholder, reply::SUBMIT_FAILURE.to_string());
                let _ = self.events.send(ChatEvent::SendFailed {
                    message: err.to_string(),
                });
                return Err(err);
            }
        };
        tracing::debug!(target: "sonda_chat", run_id = run.id, session_id = session.id, "run submitted");

        let token = CancellationToken::new();
        self.polls.lock().unwrap().push(PollHandle {
            session_id: session.id,
            placeholder_id: placeholder.id,
            token: token.clone(),
        });

        let settled = tokio::spawn(Self::observe(
            self.poller.clone(),
            run.id,
            placeholder.clone(),
            token,
            self.buffer.clone(),
            self.polls.clone(),
            self.fresh_session_id.clone(),
            self.events.clone(),
        ));

        Ok(SendTicket {
            session_id: session.id,
            run_id: run.id,
            user_message_id: user.id,
            placeholder_id: placeholder.id,
            settled,
        })
    }

    /// Makes `session` the active one and loads its history.
    ///
    /// Poll loops belonging to other sessions are cancelled; their late
    /// results must not touch the new session's buffer. The history load
    /// is skipped when the session was just created by a send and the
    /// server has nothing beyond the optimistic pair yet.
    pub async fn select_session(&self, session: ChatSession) -> Result<()> {
        self.cancel_polls(|handle| handle.session_id != session.id);

        let session_id = session.id;
        *self.selected.write().unwrap() = Some(session.clone());
        let _ = self.events.send(ChatEvent::SessionSelected(session));

        if self.fresh_session_id.load(Ordering::Relaxed) == session_id {
            return Ok(());
        }

        let page = match self.api.get_messages(session_id, 1, HISTORY_PAGE_SIZE).await {
            Ok(page) => page,
            Err(err) => {
                // The previous session's messages must not stay visible
                // under the newly selected one.
                self.buffer.write().unwrap().clear();
                let _ = self.events.send(ChatEvent::MessagesReplaced(Vec::new()));
                return Err(err);
            }
        };
        {
            let mut buffer = self.buffer.write().unwrap();
            buffer.replace_all(page.messages.clone());
        }
        let _ = self.events.send(ChatEvent::MessagesReplaced(page.messages));
        Ok(())
    }

    /// Clears the active session, the buffer and every in-flight poll.
    pub fn new_chat(&self) {
        self.cancel_polls(|_| true);
        *self.selected.write().unwrap() = None;
        self.fresh_session_id.store(0, Ordering::Relaxed);
        self.buffer.write().unwrap().clear();
        let _ = self.events.send(ChatEvent::SessionCleared);
    }

    /// Lists an agent's sessions, most recent first.
    pub async fn list_sessions(&self, agent_id: i64, page: u32, per_page: u32) -> Result<SessionPage> {
        self.api.list_sessions(agent_id, page, per_page).await
    }

    /// Deletes a session; if it is the active one, local state is reset.
    pub async fn delete_session(&self, session_id: i64) -> Result<()> {
        self.api.delete_session(session_id).await?;
        let was_active = self
            .selected_session()
            .is_some_and(|session| session.id == session_id);
        if was_active {
            self.new_chat();
        }
        let _ = self.events.send(ChatEvent::SessionsInvalidated);
        Ok(())
    }

    /// Creates a backend session and makes it active.
    ///
    /// The canonical record is re-fetched after creation; the create
    /// response may omit server-derived fields. Failure at either step
    /// aborts the send before anything optimistic is staged.
    async fn start_session(&self, agent_id: i64) -> Result<ChatSession> {
        let created = self.api.create_session(agent_id, None).await?;
        let session = self.api.get_session(created.id).await?;
        tracing::debug!(target: "sonda_chat", session_id = session.id, agent_id, "session created");
        self.fresh_session_id.store(session.id, Ordering::Relaxed);
        *self.selected.write().unwrap() = Some(session.clone());
        let _ = self
            .events
            .send(ChatEvent::SessionSelected(session.clone()));
        Ok(session)
    }

    /// Builds the optimistic user/placeholder pair for `question`.
    fn stage_pair(&self, session: &ChatSession, question: &str) -> (Message, Message) {
        let created_at = Utc::now().to_rfc3339();
        let user = Message {
            id: self.next_provisional_id(),
            chat_session_id: session.id,
            run_id: None,
            role: MessageRole::User,
            content: question.to_string(),
            sql_query: None,
            graph_url: None,
            created_at: created_at.clone(),
            sequence_order: 0,
            message_metadata: None,
        };
        let placeholder = Message {
            id: self.next_provisional_id(),
            chat_session_id: session.id,
            run_id: None,
            role: MessageRole::Assistant,
            content: reply::PROCESSING.to_string(),
            sql_query: None,
            graph_url: None,
            created_at,
            sequence_order: 1,
            message_metadata: None,
        };
        (user, placeholder)
    }

    /// Allocates a provisional message id.
    ///
    /// Ids are strictly increasing and never repeat within a process, even
    /// for allocations inside the same millisecond.
    fn next_provisional_id(&self) -> i64 {
        self.clock
            .fetch_max(Utc::now().timestamp_millis(), Ordering::Relaxed);
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Reconciles `placeholder` with `content` and announces the result.
    fn settle(&self, placeholder: &Message, content: String) {
        let mut message = placeholder.clone();
        message.content = content;
        let reconciled = self
            .buffer
            .write()
            .unwrap()
            .reconcile(placeholder.id, message.clone());
        if reconciled {
            let _ = self.events.send(ChatEvent::MessageSettled(message));
        }
    }

    /// Cancels and forgets every poll handle matching `doomed`.
    fn cancel_polls(&self, doomed: impl Fn(&PollHandle) -> bool) {
        let mut polls = self.polls.lock().unwrap();
        polls.retain(|handle| {
            if doomed(handle) {
                handle.token.cancel();
                false
            } else {
                true
            }
        });
    }

    /// Poll loop body spawned per accepted send.
    ///
    /// Runs the poller to a terminal outcome, then reconciles the
    /// placeholder unless the loop was cancelled in the meantime. A result
    /// arriving after cancellation or a buffer swap is dropped silently;
    /// reconciliation by id makes that a no-op rather than a duplicate.
    #[allow(clippy::too_many_arguments)]
    async fn observe(
        poller: RunPoller,
        run_id: i64,
        placeholder: Message,
        token: CancellationToken,
        buffer: Arc<RwLock<MessageBuffer>>,
        polls: Arc<Mutex<Vec<PollHandle>>>,
        fresh_session_id: Arc<AtomicI64>,
        events: EventSender,
    ) {
        let outcome = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(target: "sonda_chat", run_id, "poll cancelled");
                return;
            }
            outcome = poller.poll(run_id) => outcome,
        };

        polls
            .lock()
            .unwrap()
            .retain(|handle| handle.placeholder_id != placeholder.id);
        if token.is_cancelled() {
            return;
        }

        // The run settled, so the session's server history is populated;
        // subsequent selections must load it again.
        let _ = fresh_session_id.compare_exchange(
            placeholder.chat_session_id,
            0,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );

        let message = outcome.into_reply(&placeholder);
        let reconciled = buffer
            .write()
            .unwrap()
            .reconcile(placeholder.id, message.clone());
        if reconciled {
            let _ = events.send(ChatEvent::MessageSettled(message));
            let _ = events.send(ChatEvent::SessionsInvalidated);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::PollPolicy;
    use async_trait::async_trait;
    use sonda_core::agent::Agent;
    use sonda_core::api::MessagePage;
    use sonda_core::run::Run;

    struct NullApi;

    #[async_trait]
    impl ChatApi for NullApi {
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
            Err(SondaError::internal("not used"))
        }
    }

    #[tokio::test]
    async fn blank_question_is_rejected_without_side_effects() {
        let (orchestrator, mut events) = ChatOrchestrator::new(Arc::new(NullApi), PollPolicy::default());

        let err = orchestrator.send(1, "   ").await.unwrap_err();
        assert!(matches!(err, SondaError::EmptyQuestion));
        assert!(orchestrator.messages().is_empty());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn provisional_ids_are_strictly_increasing() {
        let (orchestrator, _events) = ChatOrchestrator::new(Arc::new(NullApi), PollPolicy::default());

        let mut previous = orchestrator.next_provisional_id();
        for _ in 0..1000 {
            let next = orchestrator.next_provisional_id();
            assert!(next > previous);
            previous = next;
        }
    }
}
