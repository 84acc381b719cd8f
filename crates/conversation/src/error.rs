use std::path::PathBuf;

use biasbuster_api_client::ApiError;

/// Failure of a single user action. None of these are fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The collaborator was unreachable or answered with a non-2xx status.
    #[error("network error: {0}")]
    Network(ApiError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("a turn is already being sent in chat {chat_id}")]
    TurnInFlight { chat_id: String },

    #[error("no active chat")]
    NoActiveChat,
}

impl ChatError {
    /// The server rejected (or never received) credentials.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Network(e) | Self::Upload(UploadError::Api(e)) => e.is_unauthorized(),
            _ => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not read {}: {err}", .path.display())]
    Read { path: PathBuf, err: std::io::Error },

    #[error("upload failed: {0}")]
    Api(ApiError),
}
