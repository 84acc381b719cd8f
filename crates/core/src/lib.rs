//! Core chat types shared by the BiasBuster client crates.
//!
//! A [`Message`] is one whole turn: the user's text and the assistant's
//! reply live in the same entity, with either side left empty while the
//! other is pending or when the turn is assistant-only.

pub mod chat;
pub mod message;
pub mod model;
pub mod report;
pub mod session;
pub mod upload;

pub use chat::{ChatSummary, Conversation};
pub use message::Message;
pub use model::Model;
pub use report::{BiasReport, Verdict};
pub use session::{MemorySessionStore, SessionStore};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
