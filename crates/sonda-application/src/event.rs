//! Orchestration events for UI surfaces.
//!
//! The orchestrator reports everything a surface needs to render through a
//! single event stream instead of per-surface callbacks, so any number of
//! consumers (a full chat page, an embedded input widget, a terminal) can
//! share one orchestrator instance.

use sonda_core::session::{ChatSession, Message};
use tokio::sync::mpsc;

/// Event data sent to surfaces observing the orchestrator.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A session became the active one (selected by the user, or freshly
    /// created by a send into a session-less conversation).
    SessionSelected(ChatSession),
    /// The active session was cleared (new chat).
    SessionCleared,
    /// The visible message list was replaced wholesale (history load).
    MessagesReplaced(Vec<Message>),
    /// An optimistic user/placeholder pair was staged for display.
    MessagePairStaged { user: Message, placeholder: Message },
    /// A placeholder was reconciled with its final content.
    MessageSettled(Message),
    /// Session previews/counts changed server-side; lists should refresh.
    SessionsInvalidated,
    /// A send failed before any poll loop started.
    SendFailed { message: String },
}

/// Sender half handed to the orchestrator.
pub type EventSender = mpsc::UnboundedSender<ChatEvent>;

/// Receiver half consumed by a surface.
pub type EventReceiver = mpsc::UnboundedReceiver<ChatEvent>;

/// Creates the event channel connecting an orchestrator to its surfaces.
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
