use reqwest::StatusCode;

/// Failure talking to the BiasBuster API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("not logged in")]
    Unauthenticated,
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server rejected the token, or there was none to send.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthenticated) || self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}
