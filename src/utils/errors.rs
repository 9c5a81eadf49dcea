use thiserror::Error;

use crate::constants::SUGGESTED_MODEL;

/// Errors surfaced by a chat session.
///
/// None of these are fatal: the session engine turns each one into a single
/// log entry and keeps accepting input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Cannot connect to Ollama. Make sure Ollama is running on {0}")]
    BackendUnreachable(String),

    #[error("Model '{0}' not found. Run 'ollama pull {0}' to download it, or type /model to list installed models")]
    ModelNotFound(String),

    #[error("Model {name} not available. Available models: {}", format_available(.available))]
    ModelNotAvailable { name: String, available: Vec<String> },

    #[error("Ollama discovery failed: {0}")]
    Discovery(String),

    #[error("No model selected. Type /model to list models, then /model <name> to pick one")]
    NoModelSelected,

    #[error("Unknown command: /{0}. Type /help for available commands")]
    UnknownCommand(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl ChatError {
    /// Whether this error is a user slip rather than a failure, and should be
    /// logged as an informational entry
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::UnknownCommand(_))
    }

    /// A short hint for the user on how to recover, if there is one
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::BackendUnreachable(_) => Some("Start the server with: ollama serve".to_string()),
            Self::Discovery(reason) if reason == crate::constants::NOT_INSTALLED_REASON => {
                Some("Install Ollama from https://ollama.com/download".to_string())
            }
            Self::NoModelSelected => Some(format!("For example: ollama pull {SUGGESTED_MODEL}")),
            _ => None,
        }
    }
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_not_available_lists_models() {
        let err = ChatError::ModelNotAvailable {
            name: "gemma2".to_string(),
            available: vec!["llama3.2".to_string(), "mistral".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Model gemma2 not available. Available models: llama3.2, mistral"
        );
    }

    #[test]
    fn test_model_not_available_without_models() {
        let err = ChatError::ModelNotAvailable {
            name: "gemma2".to_string(),
            available: vec![],
        };
        assert!(err.to_string().ends_with("Available models: none"));
    }

    #[test]
    fn test_model_not_found_suggests_pull() {
        let err = ChatError::ModelNotFound("gemma2".to_string());
        assert!(err.to_string().contains("ollama pull gemma2"));
    }

    #[test]
    fn test_only_unknown_command_is_informational() {
        assert!(ChatError::UnknownCommand("frobnicate".to_string()).is_informational());
        assert!(!ChatError::NoModelSelected.is_informational());
        assert!(!ChatError::Backend("boom".to_string()).is_informational());
    }
}
