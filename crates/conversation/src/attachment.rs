use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::backend::ChatBackend;
use crate::error::UploadError;

/// A file the server has accepted, waiting to ride along with the next turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedAttachment {
    /// Server-side reference sent as `fileUrl`.
    pub file_ref: String,
    pub file_name: String,
    pub size: u64,
}

/// Holds at most one staged upload. A new upload replaces the old one.
pub struct AttachmentStager {
    backend: Arc<dyn ChatBackend>,
    staged: Option<StagedAttachment>,
}

impl AttachmentStager {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            staged: None,
        }
    }

    pub fn staged(&self) -> Option<&StagedAttachment> {
        self.staged.as_ref()
    }

    pub fn file_ref(&self) -> Option<&str> {
        self.staged.as_ref().map(|s| s.file_ref.as_str())
    }

    pub fn clear(&mut self) {
        self.staged = None;
    }

    /// Upload `bytes` and stage the result. On error the previous
    /// attachment, if any, stays staged.
    pub async fn upload(
        &mut self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<&StagedAttachment, UploadError> {
        let len = bytes.len() as u64;
        let resp = self
            .backend
            .upload_file(file_name, bytes)
            .await
            .map_err(UploadError::Api)?;

        info!(file = file_name, url = %resp.file_url, "attachment staged");
        let staged = self.staged.insert(StagedAttachment {
            file_ref: resp.file_url,
            file_name: resp.file_name.unwrap_or_else(|| file_name.to_string()),
            size: resp.file_size.unwrap_or(len),
        });
        Ok(staged)
    }

    pub async fn upload_path(&mut self, path: &Path) -> Result<&StagedAttachment, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| UploadError::Read {
            path: path.to_path_buf(),
            err,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        self.upload(&name, bytes).await
    }
}
