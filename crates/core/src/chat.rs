use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::report::BiasReport;

/// A persisted chat as listed by the history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSummary {
    pub id: String,
    pub last_message: String,
    pub created_at: DateTime<Utc>,
}

/// The active chat and its ordered turns.
///
/// `chat_id == None` means no chat has been started yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub chat_id: Option<String>,
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(chat_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            messages,
        }
    }

    /// Fresh, empty conversation bound to a server-assigned id.
    pub fn started(chat_id: impl Into<String>) -> Self {
        Self::with_messages(chat_id, Vec::new())
    }

    pub fn is_started(&self) -> bool {
        self.chat_id.is_some()
    }

    pub fn is_active(&self, chat_id: &str) -> bool {
        self.chat_id.as_deref() == Some(chat_id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn report_for(&self, message_id: &str) -> Option<&BiasReport> {
        self.message(message_id).and_then(|m| m.report.as_ref())
    }

    /// Most recent turn carrying a report, with its message id.
    pub fn latest_report(&self) -> Option<(&str, &BiasReport)> {
        self.messages
            .iter()
            .rev()
            .find_map(|m| m.report.as_ref().map(|r| (m.id.as_str(), r)))
    }
}
