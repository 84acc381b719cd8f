//! Scripted in-process backend for controller tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use biasbuster_api::{
    AuthResponse, ChatRequest, LoginRequest, SignupRequest, SignupResponse, UploadResponse,
    UserResponse,
};
use biasbuster_api_client::{ApiError, StatusCode};
use biasbuster_core::ChatSummary;

use crate::backend::{ChatBackend, TurnReply};

/// Each queue is consumed front-first; an empty queue falls back to a
/// canned success.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub chat_ids: Mutex<VecDeque<Result<String, ApiError>>>,
    pub replies: Mutex<VecDeque<Result<TurnReply, ApiError>>>,
    pub uploads: Mutex<VecDeque<Result<UploadResponse, ApiError>>>,
    pub histories: Mutex<VecDeque<Result<Vec<ChatSummary>, ApiError>>>,
    pub logins: Mutex<VecDeque<Result<AuthResponse, ApiError>>>,
    pub sent: Mutex<Vec<ChatRequest>>,
    pub deleted: Mutex<Vec<String>>,
    pub uploaded: Mutex<Vec<(String, Vec<u8>)>>,
    pub created: AtomicUsize,
    pub history_calls: AtomicUsize,
}

pub(crate) fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.to_string(),
    }
}

pub(crate) fn reply(message: &str) -> TurnReply {
    TurnReply {
        message: message.to_string(),
        report: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chat_id(&self, result: Result<String, ApiError>) {
        self.chat_ids.lock().unwrap().push_back(result);
    }

    pub fn push_reply(&self, result: Result<TurnReply, ApiError>) {
        self.replies.lock().unwrap().push_back(result);
    }

    pub fn push_upload(&self, result: Result<UploadResponse, ApiError>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    pub fn push_history(&self, result: Result<Vec<ChatSummary>, ApiError>) {
        self.histories.lock().unwrap().push_back(result);
    }

    pub fn push_login(&self, result: Result<AuthResponse, ApiError>) {
        self.logins.lock().unwrap().push_back(result);
    }

    pub fn sent(&self) -> Vec<ChatRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn authenticate(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.logins.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(AuthResponse {
                token: format!("token-for-{}", req.email),
                user: None,
            })
        })
    }

    async fn register(&self, req: &SignupRequest) -> Result<SignupResponse, ApiError> {
        Ok(SignupResponse {
            message: Some("User created".into()),
            token: Some(format!("token-for-{}", req.email)),
            user: Some(UserResponse {
                id: "u-new".into(),
                username: req.username.clone(),
                email: req.email.clone(),
            }),
        })
    }

    async fn current_user(&self) -> Result<UserResponse, ApiError> {
        Ok(UserResponse {
            id: "u-1".into(),
            username: "ana".into(),
            email: "ana@example.com".into(),
        })
    }

    async fn fetch_history(&self) -> Result<Vec<ChatSummary>, ApiError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        self.histories
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_chat(&self) -> Result<String, ApiError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        self.chat_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("chat-{n}")))
    }

    async fn post_turn(&self, req: &ChatRequest) -> Result<TurnReply, ApiError> {
        self.sent.lock().unwrap().push(req.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(reply(&format!("echo: {}", req.message))))
    }

    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        self.uploaded
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.clone()));
        self.uploads.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(UploadResponse {
                file_url: format!("https://files.example/{file_name}"),
                file_name: Some(file_name.to_string()),
                file_size: Some(bytes.len() as u64),
            })
        })
    }

    async fn remove_chat(&self, chat_id: &str) -> Result<(), ApiError> {
        self.deleted.lock().unwrap().push(chat_id.to_string());
        Ok(())
    }
}
