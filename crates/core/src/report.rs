use serde::{Deserialize, Serialize};

/// Verdict produced by the remote bias analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    #[serde(rename = "Bias")]
    Bias,
    #[serde(rename = "Not Bias")]
    NotBias,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bias => "Bias",
            Self::NotBias => "Not Bias",
        }
    }

    pub fn from_detected(detected: bool) -> Self {
        if detected { Self::Bias } else { Self::NotBias }
    }

    pub fn is_bias(&self) -> bool {
        matches!(self, Self::Bias)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured verdict returned alongside a reply when analysis ran.
///
/// Produced only by the remote collaborator and never edited locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BiasReport {
    pub result: Verdict,
    pub explanation: String,
    pub how_to_fix: String,
}
