use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use biasbuster_api::WireReport;
use biasbuster_core::{BiasReport, Conversation};
use biasbuster_export::ExportFormat;
use biasbuster_runtime_config::{ClientConfig, ExportFormatSetting};

use crate::config::{export_dir, load_config};

/// Output format for exported reports.
#[derive(Debug, Clone, Copy, PartialEq, clap::ValueEnum)]
pub enum FormatArg {
    Pdf,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Json => ExportFormat::Json,
        }
    }
}

pub fn configured_format(config: &ClientConfig) -> ExportFormat {
    match config.export.default_format {
        ExportFormatSetting::Pdf => ExportFormat::Pdf,
        ExportFormatSetting::Json => ExportFormat::Json,
    }
}

/// Read a report saved as JSON. Both the structured and the legacy
/// detector shapes are accepted.
pub fn read_report(path: &Path) -> Result<BiasReport> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report at {}", path.display()))?;
    let wire: WireReport = serde_json::from_str(&raw)
        .with_context(|| format!("Not a bias report: {}", path.display()))?;
    Ok(wire.into())
}

/// `biasbuster export --report FILE --id ID`
pub fn run_export(
    report_file: &Path,
    identifier: &str,
    format: Option<FormatArg>,
    out: Option<PathBuf>,
) -> Result<()> {
    let config = load_config()?;
    let report = read_report(report_file)?;
    let format = format.map(ExportFormat::from).unwrap_or_else(|| configured_format(&config));
    let dir = out.unwrap_or_else(|| export_dir(&config));

    let path = biasbuster_export::write_report(&report, identifier, format, &dir)?;
    println!("Exported {}", path.display());
    Ok(())
}

/// Export the report attached to `message_id`, or the latest one in the
/// conversation.
pub fn export_from_conversation(
    conversation: &Conversation,
    message_id: Option<&str>,
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf> {
    let (id, report) = match message_id {
        Some(id) => match conversation.report_for(id) {
            Some(report) => (id, report),
            None => bail!("message {id} has no bias report"),
        },
        None => match conversation.latest_report() {
            Some(found) => found,
            None => bail!("no bias report in this chat yet"),
        },
    };
    Ok(biasbuster_export::write_report(report, id, format, dir)?)
}
