use async_trait::async_trait;
use biasbuster_api::{
    AuthResponse, ChatRequest, LoginRequest, SignupRequest, SignupResponse, UploadResponse,
    UserResponse,
};
use biasbuster_api_client::{ApiClient, ApiError};
use biasbuster_core::{BiasReport, ChatSummary};

/// Settled answer to one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub message: String,
    pub report: Option<BiasReport>,
}

/// The remote collaborator as seen by the conversation layer.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn authenticate(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;

    async fn register(&self, req: &SignupRequest) -> Result<SignupResponse, ApiError>;

    async fn current_user(&self) -> Result<UserResponse, ApiError>;

    /// Chat summaries in the order the server returns them.
    async fn fetch_history(&self) -> Result<Vec<ChatSummary>, ApiError>;

    /// Ask the server for a fresh chat id.
    async fn create_chat(&self) -> Result<String, ApiError>;

    async fn post_turn(&self, req: &ChatRequest) -> Result<TurnReply, ApiError>;

    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>)
    -> Result<UploadResponse, ApiError>;

    async fn remove_chat(&self, chat_id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn authenticate(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.login(req).await
    }

    async fn register(&self, req: &SignupRequest) -> Result<SignupResponse, ApiError> {
        self.signup(req).await
    }

    async fn current_user(&self) -> Result<UserResponse, ApiError> {
        Ok(self.me().await?.user)
    }

    async fn fetch_history(&self) -> Result<Vec<ChatSummary>, ApiError> {
        let entries = self.history().await?;
        Ok(entries.into_iter().map(ChatSummary::from).collect())
    }

    async fn create_chat(&self) -> Result<String, ApiError> {
        Ok(self.new_chat().await?.chat_id)
    }

    async fn post_turn(&self, req: &ChatRequest) -> Result<TurnReply, ApiError> {
        let (message, report) = self.send_chat(req).await?.into_parts();
        Ok(TurnReply { message, report })
    }

    async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        self.upload(file_name, bytes).await
    }

    async fn remove_chat(&self, chat_id: &str) -> Result<(), ApiError> {
        self.delete_chat(chat_id).await.map(|_| ())
    }
}
