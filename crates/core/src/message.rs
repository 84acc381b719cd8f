use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::BiasReport;

/// One conversation turn.
///
/// Optimistic user turns carry `text` with an empty `response`; assistant
/// turns carry `response` (and maybe `report`) with an empty `text`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<BiasReport>,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Locally generated user turn, shown before the collaborator answers.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            text: text.into(),
            response: String::new(),
            report: None,
            timestamp: Utc::now(),
        }
    }

    /// Assistant turn built from a settled reply.
    pub fn assistant(response: impl Into<String>, report: Option<BiasReport>) -> Self {
        Self {
            id: new_message_id(),
            text: String::new(),
            response: response.into(),
            report,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user_turn(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.is_user_turn() && self.response.is_empty() && self.report.is_none()
    }
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
