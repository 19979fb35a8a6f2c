//! Send-state guard for a single input surface.
//!
//! The orchestrator itself accepts concurrent sends; it is the input box
//! that must not fire twice for one press. `Composer` models that surface:
//! it holds an explicit idle/sending state and rejects a send while one is
//! already in flight, flipping back to idle only when the previous send
//! has settled (answered, failed, timed out or cancelled).

use crate::orchestrator::{ChatOrchestrator, SendTicket};
use sonda_core::error::Result;
use sonda_core::SondaError;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SendState {
    Idle,
    Sending,
}

/// One input surface bound to a shared orchestrator.
#[derive(Clone)]
pub struct Composer {
    orchestrator: Arc<ChatOrchestrator>,
    state: Arc<Mutex<SendState>>,
}

impl Composer {
    /// Creates a composer over `orchestrator`, initially idle.
    pub fn new(orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self {
            orchestrator,
            state: Arc::new(Mutex::new(SendState::Idle)),
        }
    }

    /// Returns true while a send from this composer is unsettled.
    pub fn is_sending(&self) -> bool {
        *self.state.lock().unwrap() == SendState::Sending
    }

    /// Submits `input` through the orchestrator, guarding reentrancy.
    ///
    /// Fails fast with [`SondaError::SendInFlight`] when the previous send
    /// from this composer has not settled yet. A rejected or failed send
    /// leaves the composer idle so the user can retry immediately.
    pub async fn send(&self, agent_id: i64, input: &str) -> Result<SendTicket> {
        {
            let mut state = self.state.lock().unwrap();
            if *state == SendState::Sending {
                return Err(SondaError::SendInFlight);
            }
            *state = SendState::Sending;
        }

        let ticket = match self.orchestrator.send(agent_id, input).await {
            Ok(ticket) => ticket,
            Err(err) => {
                *self.state.lock().unwrap() = SendState::Idle;
                return Err(err);
            }
        };

        let SendTicket {
            session_id,
            run_id,
            user_message_id,
            placeholder_id,
            settled,
        } = ticket;

        let state = self.state.clone();
        let settled = tokio::spawn(async move {
            if let Err(err) = settled.await {
                tracing::warn!(target: "sonda_chat", run_id, %err, "poll task aborted");
            }
            *state.lock().unwrap() = SendState::Idle;
        });

        Ok(SendTicket {
            session_id,
            run_id,
            user_message_id,
            placeholder_id,
            settled,
        })
    }
}
