use std::sync::Arc;
use std::time::Duration;

use biasbuster_api::*;
use biasbuster_core::SessionStore;
use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

/// Typed HTTP client for the BiasBuster API.
///
/// Authenticated routes read the bearer token from the injected
/// [`SessionStore`] at call time, so a login or logout elsewhere in the
/// process takes effect on the next request.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    /// Create a new client with the given base URL and timeout.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Build)?;
        Ok(Self::with_client(client, base_url, session))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(
        client: reqwest::Client,
        base_url: &str,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.session.token().ok_or(ApiError::Unauthenticated)?;
        Ok(builder.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let resp = builder.send().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        parse_response(path, resp).await
    }

    // ── Auth ──────────────────────────────────────────────────────────────

    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        debug!("POST /login");
        let builder = self.client.post(self.url("/login")).json(req);
        self.send("/login", builder).await
    }

    /// Register an account. Any 2xx counts as success; the body is decoded
    /// when it parses and ignored otherwise.
    pub async fn signup(&self, req: &SignupRequest) -> Result<SignupResponse, ApiError> {
        const PATH: &str = "/signup";
        debug!("POST {PATH}");
        let resp = self
            .client
            .post(self.url(PATH))
            .json(req)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: PATH.to_string(),
                source,
            })?;
        let body = check_status(resp)
            .await?
            .text()
            .await
            .map_err(|source| ApiError::Decode {
                path: PATH.to_string(),
                source,
            })?;
        match serde_json::from_str(&body) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                debug!("ignoring signup body: {err}");
                Ok(SignupResponse::default())
            }
        }
    }

    pub async fn me(&self) -> Result<MeResponse, ApiError> {
        debug!("GET /me");
        let builder = self.authed(self.client.get(self.url("/me")))?;
        self.send("/me", builder).await
    }

    // ── Chats ─────────────────────────────────────────────────────────────

    pub async fn history(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        debug!("GET /api/history");
        let builder = self.authed(self.client.get(self.url("/api/history")))?;
        self.send("/api/history", builder).await
    }

    pub async fn new_chat(&self) -> Result<NewChatResponse, ApiError> {
        debug!("POST /api/chat/new");
        let builder = self.authed(self.client.post(self.url("/api/chat/new")))?;
        self.send("/api/chat/new", builder).await
    }

    pub async fn send_chat(&self, req: &ChatRequest) -> Result<ChatResponse, ApiError> {
        debug!(chat_id = %req.chat_id, model = %req.model, "POST /api/chat");
        let builder = self.authed(self.client.post(self.url("/api/chat")).json(req))?;
        self.send("/api/chat", builder).await
    }

    pub async fn delete_chat(&self, chat_id: &str) -> Result<DeleteChatResponse, ApiError> {
        let path = format!("/api/chat/{chat_id}");
        debug!("DELETE {path}");
        let builder = self.authed(self.client.delete(self.url(&path)))?;
        self.send(&path, builder).await
    }

    // ── Uploads ───────────────────────────────────────────────────────────

    /// Upload raw file bytes as the multipart field `file`.
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadResponse, ApiError> {
        debug!(file_name, size = bytes.len(), "POST /api/upload");
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))
            .map_err(ApiError::Build)?;
        let form = Form::new().part("file", part);
        let builder = self.authed(self.client.post(self.url("/api/upload")).multipart(form))?;
        self.send("/api/upload", builder).await
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => "text/csv",
        "json" => "application/json",
        "txt" => "text/plain",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error carrying the status and the server's message.
async fn parse_response<T: DeserializeOwned>(
    path: &str,
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    check_status(resp)
        .await?
        .json()
        .await
        .map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
}

/// Pass 2xx responses through; turn anything else into [`ApiError::Status`].
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body
            }
        });
        return Err(ApiError::Status { status, message });
    }
    Ok(resp)
}
