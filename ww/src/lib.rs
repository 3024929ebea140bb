//! WhisperWall - guided message composer with an anonymous wall
//!
//! A user picks an intent, describes a situation, and gets four tone
//! variations of the same message from a generative model. The chosen
//! message can be copied, handed off to email or SMS, or published
//! anonymously to a local wall.
//!
//! # Modules
//!
//! - [`wizard`] - the five-step compose state machine
//! - [`service`] - draft, extras and channel-formatting requests
//! - [`llm`] - generative service clients (Gemini, Anthropic)
//! - [`history`] - debounced undo/redo of the compose form
//! - [`wall`] - the anonymous wall and post ownership
//! - [`handoff`] - display ciphers, mailto/sms URLs, clipboard
//! - [`config`] - configuration types and loading
//! - [`cli`] / [`session`] - command line and interactive session

pub mod cli;
pub mod config;
pub mod domain;
pub mod handoff;
pub mod history;
pub mod llm;
pub mod moderation;
pub mod prompts;
pub mod retry;
pub mod service;
pub mod session;
pub mod wall;
pub mod wizard;

// Re-export commonly used types
pub use config::{Config, LlmConfig};
pub use domain::{
    Channel, DraftOutcome, Extras, FormattedMessage, GeneratedMessage, InputField, IntentType, SafetyAlert,
    TargetLanguage, ThemeType, Tone, UserInput, WallFilter, WallPost,
};
pub use history::{Debouncer, EditHistoryManager};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, GeminiClient, LlmClient, LlmError, create_client,
};
pub use moderation::LocalFilter;
pub use prompts::PromptLoader;
pub use retry::RetryPolicy;
pub use service::{DraftService, GenerationError};
pub use wall::{WallRepository, WallView};
pub use wizard::{AppSettings, Step, Tab, WizardController, WizardError};
