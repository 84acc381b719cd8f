use biasbuster_core::{BiasReport, Verdict};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ExportError;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    report_id: &'a str,
    generated_at: String,
    result: Verdict,
    explanation: &'a str,
    #[serde(rename = "howToFix")]
    how_to_fix: &'a str,
}

/// Pretty JSON rendition of a report.
pub fn to_json(
    report: &BiasReport,
    identifier: &str,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ExportError> {
    let body = JsonReport {
        report_id: identifier,
        generated_at: generated_at.to_rfc3339(),
        result: report.result,
        explanation: &report.explanation,
        how_to_fix: &report.how_to_fix,
    };
    let mut bytes = serde_json::to_vec_pretty(&body)?;
    bytes.push(b'\n');
    Ok(bytes)
}
