//! Draft generation errors

use thiserror::Error;

use crate::llm::LlmError;

/// Why a draft request produced nothing usable
///
/// Partial results are never returned alongside an error.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Failed to build prompt: {0}")]
    Prompt(String),

    #[error("Generative service failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed reply: {0}")]
    Parse(String),
}

impl GenerationError {
    /// Message suitable for the end user
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Prompt(_) => "Prompt templates are broken. Check your prompts directory.",
            Self::Llm(e) if e.is_configuration() => "The generative service is not configured.",
            Self::Llm(_) | Self::Parse(_) => "Failed to generate messages. Please try again.",
        }
    }
}
