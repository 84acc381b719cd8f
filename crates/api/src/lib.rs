//! Request/response types for the BiasBuster HTTP API.
//!
//! This crate is the single place where the wire shape of the remote
//! collaborator is written down. Field names follow the server's JSON
//! (`camelCase` for chat routes); conversion into the core domain types
//! happens here so callers never see wire-only variants.

use biasbuster_core::{BiasReport, ChatSummary, Model, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod timestamp;

// Re-export the core types used in request/response bodies.
pub use biasbuster_core;

/// Label the server uses for chats that have no message yet.
pub const NEW_CHAT_LABEL: &str = "New chat";

// ─── Auth ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Returned by login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

/// Body of a successful signup. Servers echo back different things (a
/// message, the new user, sometimes a token), so nothing is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

/// Returned by `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserResponse,
}

// ─── Chats ───────────────────────────────────────────────────────────────────

/// One row of `GET /api/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub chat_id: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl From<HistoryEntry> for ChatSummary {
    fn from(entry: HistoryEntry) -> Self {
        let last_message = entry
            .last_message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| NEW_CHAT_LABEL.to_string());
        ChatSummary {
            id: entry.chat_id,
            last_message,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChatResponse {
    pub chat_id: String,
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub chat_id: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub model: Model,
}

/// Reply to `POST /api/chat`. `report` is present only when analysis ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(alias = "reply")]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<WireReport>,
}

impl ChatResponse {
    pub fn into_parts(self) -> (String, Option<BiasReport>) {
        (self.message, self.report.map(BiasReport::from))
    }
}

/// Report as it may appear on the wire.
///
/// Newer servers send the structured verdict; older ones send the raw
/// detector output, which is folded into the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireReport {
    Structured(BiasReport),
    Legacy(LegacyReport),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyReport {
    pub bias_detected: bool,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub fixes: Vec<String>,
}

impl From<WireReport> for BiasReport {
    fn from(report: WireReport) -> Self {
        match report {
            WireReport::Structured(report) => report,
            WireReport::Legacy(legacy) => BiasReport {
                result: Verdict::from_detected(legacy.bias_detected),
                explanation: legacy.reasons.join("\n"),
                how_to_fix: legacy.fixes.join("\n"),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteChatResponse {
    #[serde(default)]
    pub success: bool,
}

// ─── Uploads ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": ...}`, `{"message": ...}` and `{"error": ...}`.
/// Non-string details (validation lists) are returned as compact JSON.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key))
        .map(|field| match field {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signup_response_tolerates_message_only_body() {
        let resp: SignupResponse =
            serde_json::from_str(r#"{"message":"User created"}"#).unwrap();
        assert_eq!(resp.message.as_deref(), Some("User created"));
        assert!(resp.token.is_none());
        assert!(resp.user.is_none());
    }

    #[test]
    fn history_entry_maps_to_summary() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "chatId": "c-1",
            "lastMessage": null,
            "createdAt": "2024-05-01T09:30:00.123456"
        }))
        .unwrap();
        let summary = ChatSummary::from(entry);
        assert_eq!(summary.id, "c-1");
        assert_eq!(summary.last_message, NEW_CHAT_LABEL);
        assert_eq!(summary.created_at.to_rfc3339(), "2024-05-01T09:30:00.123456+00:00");
    }

    #[test]
    fn chat_request_omits_missing_file() {
        let req = ChatRequest {
            chat_id: "c-1".into(),
            message: "Is this biased?".into(),
            file_url: None,
            model: Model::Gpt35Turbo,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"chatId": "c-1", "message": "Is this biased?", "model": "gpt-3.5-turbo"})
        );
    }

    #[test]
    fn chat_response_accepts_structured_report() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "message": "Found a skew",
            "report": {"result": "Bias", "explanation": "e", "howToFix": "f"}
        }))
        .unwrap();
        let (text, report) = resp.into_parts();
        assert_eq!(text, "Found a skew");
        let report = report.unwrap();
        assert_eq!(report.result, Verdict::Bias);
        assert_eq!(report.how_to_fix, "f");
    }

    #[test]
    fn chat_response_accepts_legacy_reply_and_report() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "reply": "Looks fine",
            "report": {"bias_detected": false, "reasons": ["a", "b"], "fixes": []},
            "updatedChat": {"id": "c-1", "messages": []}
        }))
        .unwrap();
        let (text, report) = resp.into_parts();
        assert_eq!(text, "Looks fine");
        let report = report.unwrap();
        assert_eq!(report.result, Verdict::NotBias);
        assert_eq!(report.explanation, "a\nb");
        assert_eq!(report.how_to_fix, "");
    }

    #[test]
    fn chat_response_without_report() {
        let resp: ChatResponse =
            serde_json::from_value(json!({"message": "No evidence found", "report": null}))
                .unwrap();
        assert!(resp.into_parts().1.is_none());
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            error_message(r#"{"error": "boom"}"#).as_deref(),
            Some("boom")
        );
        assert_eq!(
            error_message(r#"{"detail": [{"loc": ["body"]}]}"#).as_deref(),
            Some(r#"[{"loc":["body"]}]"#)
        );
        assert_eq!(error_message("<html>502</html>"), None);
    }
}
