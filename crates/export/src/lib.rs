//! Bias report export.
//!
//! [`export`] lays a [`BiasReport`] out as a paginated [`Document`];
//! [`Document::to_pdf`] serializes it. Layout is a pure function of the
//! report, the identifier and the generation time, so two exports of the
//! same report differ only in the "Generated" line and the PDF info date.

pub mod json;
pub mod layout;
pub mod pdf;
pub mod wrap;

use std::path::{Path, PathBuf};

use biasbuster_core::BiasReport;
use chrono::{DateTime, Utc};
use tracing::info;

pub use layout::{Document, Page, TextItem, TextRole};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Pdf,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Json => "json",
        }
    }
}

/// Lay out `report` stamped with the current time.
pub fn export(report: &BiasReport, identifier: &str) -> Document {
    export_at(report, identifier, Utc::now())
}

/// Lay out `report` stamped with `generated_at`.
pub fn export_at(report: &BiasReport, identifier: &str, generated_at: DateTime<Utc>) -> Document {
    layout::layout(report, identifier, generated_at)
}

/// Encode `report` in `format` stamped with `generated_at`.
pub fn render(
    report: &BiasReport,
    identifier: &str,
    format: ExportFormat,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    match format {
        ExportFormat::Pdf => Ok(export_at(report, identifier, generated_at).to_pdf()),
        ExportFormat::Json => json::to_json(report, identifier, generated_at),
    }
}

/// `bias-report-<identifier>.<ext>` with path-hostile characters replaced.
pub fn file_name(identifier: &str, format: ExportFormat) -> String {
    let safe: String = identifier
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("bias-report-{safe}.{}", format.extension())
}

/// Export `report` into `dir`, returning the written path.
pub fn write_report(
    report: &BiasReport,
    identifier: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = render(report, identifier, format, Utc::now())?;
    let path = dir.join(file_name(identifier, format));
    std::fs::create_dir_all(dir)
        .and_then(|()| std::fs::write(&path, &bytes))
        .map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), bytes = bytes.len(), "report exported");
    Ok(path)
}
