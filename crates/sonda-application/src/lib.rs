//! Orchestration layer for Sonda chat surfaces.
//!
//! Coordinates sessions, optimistic messages, run submission and status
//! polling on top of the [`sonda_core::ChatApi`] seam, and publishes state
//! changes as [`event::ChatEvent`]s for surfaces to render.

pub mod composer;
pub mod event;
pub mod orchestrator;
pub mod poller;
pub mod reply;

pub use composer::Composer;
pub use event::{ChatEvent, EventReceiver, EventSender};
pub use orchestrator::{ChatOrchestrator, SendTicket};
pub use poller::{PollPolicy, RunOutcome, RunPoller};
