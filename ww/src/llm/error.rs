//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the generative service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider blocked the request: {0}")]
    Blocked(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API key not found. Set the {0} environment variable.")]
    MissingApiKey(String),

    #[error("Unknown LLM provider: '{0}'. Supported: gemini, anthropic")]
    UnknownProvider(String),
}

impl LlmError {
    /// Server-suggested wait, for rate limit errors
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// HTTP status behind the error, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::RateLimited { .. } => Some(429),
            LlmError::ApiError { status, .. } => Some(*status),
            LlmError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Errors caused by local setup rather than the remote call
    pub fn is_configuration(&self) -> bool {
        matches!(self, LlmError::MissingApiKey(_) | LlmError::UnknownProvider(_))
    }
}
