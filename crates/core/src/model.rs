use serde::{Deserialize, Serialize};

/// Model the collaborator is asked to answer with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum Model {
    #[default]
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "claude-3")]
    Claude3,
}

impl Model {
    pub const ALL: [Model; 3] = [Model::Gpt4, Model::Gpt35Turbo, Model::Claude3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
            Self::Claude3 => "claude-3",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gpt4 => "GPT-4",
            Self::Gpt35Turbo => "GPT-3.5 Turbo",
            Self::Claude3 => "Claude 3",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModel(pub String);

impl std::fmt::Display for UnknownModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let known: Vec<&str> = Model::ALL.iter().map(Model::as_str).collect();
        write!(f, "unknown model '{}' (expected one of: {})", self.0, known.join(", "))
    }
}

impl std::error::Error for UnknownModel {}

impl std::str::FromStr for Model {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Model::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}
