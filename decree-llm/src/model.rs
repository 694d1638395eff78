//! Supported oracle models

use decree_core::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Backend service a model is hosted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

/// The closed set of models the oracle adapter supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Gpt35Turbo,
    Gpt4Turbo,
    Gpt4oMini,
    ClaudeSonnet,
    ClaudeHaiku,
}

impl Model {
    /// Every supported model, for help text and validation messages.
    pub const ALL: [Model; 5] = [
        Model::Gpt35Turbo,
        Model::Gpt4Turbo,
        Model::Gpt4oMini,
        Model::ClaudeSonnet,
        Model::ClaudeHaiku,
    ];

    /// Wire identifier sent to the backend.
    pub fn id(&self) -> &'static str {
        match self {
            Model::Gpt35Turbo => "gpt-3.5-turbo",
            Model::Gpt4Turbo => "gpt-4-turbo",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::ClaudeSonnet => "claude-3-5-sonnet-latest",
            Model::ClaudeHaiku => "claude-3-5-haiku-latest",
        }
    }

    /// Which backend hosts this model.
    pub fn provider(&self) -> Provider {
        match self {
            Model::Gpt35Turbo | Model::Gpt4Turbo | Model::Gpt4oMini => Provider::OpenAI,
            Model::ClaudeSonnet | Model::ClaudeHaiku => Provider::Anthropic,
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Model {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .iter()
            .find(|model| model.id() == s)
            .copied()
            .ok_or_else(|| ConfigError::ModelNotSupported {
                model: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids_round_trip() {
        for model in Model::ALL {
            assert_eq!(model.id().parse::<Model>().unwrap(), model);
        }
    }

    #[test]
    fn test_unknown_model_rejected() {
        let err = "gpt-9000".parse::<Model>().unwrap_err();
        assert!(matches!(err, ConfigError::ModelNotSupported { .. }));
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(Model::Gpt35Turbo.provider(), Provider::OpenAI);
        assert_eq!(Model::ClaudeSonnet.provider(), Provider::Anthropic);
    }
}
