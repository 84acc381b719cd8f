use crate::{BiasReport, Message, Verdict};

/// Report with a `Bias` verdict.
pub fn report_biased() -> BiasReport {
    BiasReport {
        result: Verdict::Bias,
        explanation: "Applicants over 50 are rejected at twice the base rate.".to_string(),
        how_to_fix: "Drop age-derived features and re-weight the training sample.".to_string(),
    }
}

/// Report with a `Not Bias` verdict.
pub fn report_clean() -> BiasReport {
    BiasReport {
        result: Verdict::NotBias,
        explanation: "Outcomes are evenly distributed across groups.".to_string(),
        how_to_fix: "No changes required.".to_string(),
    }
}

pub fn user(text: &str) -> Message {
    Message::user(text)
}

pub fn assistant(text: &str) -> Message {
    Message::assistant(text, None)
}

pub fn assistant_with_report(text: &str, report: BiasReport) -> Message {
    Message::assistant(text, Some(report))
}
