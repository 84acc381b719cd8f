//! Conversation session orchestration.
//!
//! [`Controller`] owns the active chat and its turns, runs the send/receive
//! protocol with optimistic insert and exact rollback, and coordinates the
//! [`HistoryCache`] and the [`AttachmentStager`]. Everything remote goes
//! through the [`ChatBackend`] seam so the state machine can be driven by
//! a scripted backend in tests.

pub mod account;
pub mod attachment;
pub mod backend;
pub mod controller;
pub mod error;
pub mod history;

#[cfg(test)]
pub(crate) mod fake;

pub use account::{Account, StartRoute};
pub use attachment::{AttachmentStager, StagedAttachment};
pub use backend::{ChatBackend, TurnReply};
pub use controller::{Controller, PendingTurn, TurnOutcome, TurnState};
pub use error::{ChatError, UploadError};
pub use history::HistoryCache;
