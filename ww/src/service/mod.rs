//! Draft generation service
//!
//! Three stateless operations over the generative service: multi-tone
//! drafting with the content policy, relationship extras, and channel
//! formatting. Every remote call goes through the retry policy.

mod error;
pub mod reply;

use std::sync::Arc;

use eyre::Context;
use tracing::{debug, info, warn};

pub use error::GenerationError;

use crate::config::Config;
use crate::domain::{Channel, DraftOutcome, Extras, FormattedMessage, TargetLanguage, UserInput};
use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, ResponseSchema};
use crate::moderation::LocalFilter;
use crate::prompts::{ChannelPromptContext, PromptLoader};
use crate::retry::RetryPolicy;

/// Default response token budget
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Builds prompts, calls the generative service, and validates replies
pub struct DraftService {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    retry: RetryPolicy,
    filter: Option<LocalFilter>,
    max_tokens: u32,
}

impl DraftService {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, retry: RetryPolicy) -> Self {
        debug!(provider = llm.provider(), "DraftService::new: called");
        Self {
            llm,
            prompts,
            retry,
            filter: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Service wired from configuration
    pub fn from_config(llm: Arc<dyn LlmClient>, config: &Config) -> eyre::Result<Self> {
        let filter = LocalFilter::from_config(&config.moderation).context("Invalid moderation extra-terms")?;
        Ok(Self::new(
            llm,
            PromptLoader::new(config.prompts.resolve_dir()),
            RetryPolicy::from(&config.retry),
        )
        .with_filter(filter)
        .with_max_tokens(config.llm.max_tokens))
    }

    /// Local soft-censor stage applied to drafts
    pub fn with_filter(mut self, filter: Option<LocalFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn call(&self, label: &str, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%label, provider = self.llm.provider(), "call: called");
        let attempt = || {
            let request = request.clone();
            async move {
                self.llm.complete(request).await.inspect_err(|e| {
                    debug!(%label, status = ?e.status(), retry_after = ?e.retry_after(), "call: attempt failed");
                })
            }
        };
        self.retry.run(label, attempt).await
    }

    fn request(&self, system: String, prompt: String, schema: ResponseSchema) -> CompletionRequest {
        CompletionRequest::structured(system, prompt, schema, self.max_tokens)
    }

    /// Draft four tone variations of the user's message
    ///
    /// Safety alerts are relayed from the service, never invented here. Fails
    /// when the remote call exhausts its retries or the reply is malformed.
    pub async fn draft_messages(&self, input: &UserInput) -> Result<DraftOutcome, GenerationError> {
        debug!(intent = %input.intent, language = %input.target_language, "draft_messages: called");
        let system = self
            .prompts
            .drafts_system()
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        let prompt = self
            .prompts
            .drafts(input)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;

        let response = self
            .call("draft_messages", self.request(system, prompt, reply::drafts_schema()))
            .await?;
        let payload = response.json_payload().map_err(|e| GenerationError::Parse(e.to_string()))?;
        let mut outcome = reply::parse_drafts(payload, input.intent).map_err(GenerationError::Parse)?;

        if let Some(filter) = &self.filter {
            let masked = filter.apply(&mut outcome.variations);
            if masked > 0 {
                info!(%masked, "draft_messages: local filter masked variations");
            }
        }

        info!(
            variations = outcome.variations.len(),
            blocked = outcome.is_blocked(),
            "draft_messages: done"
        );
        Ok(outcome)
    }

    /// Missions, topics and a relationship score for `context`
    ///
    /// Non-critical: any failure yields [`Extras::fallback`].
    pub async fn fetch_extras(&self, context: &str, language: TargetLanguage) -> Extras {
        debug!(%language, context_len = context.len(), "fetch_extras: called");
        match self.try_fetch_extras(context, language).await {
            Ok(extras) => extras,
            Err(e) => {
                warn!(error = %e, "fetch_extras: falling back to defaults");
                Extras::fallback()
            }
        }
    }

    async fn try_fetch_extras(&self, context: &str, language: TargetLanguage) -> Result<Extras, GenerationError> {
        let prompt = self
            .prompts
            .extras(context, language)
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        let response = self
            .call("fetch_extras", self.request(String::new(), prompt, reply::extras_schema()))
            .await?;
        let payload = response.json_payload().map_err(|e| GenerationError::Parse(e.to_string()))?;
        reply::parse_extras(payload).map_err(GenerationError::Parse)
    }

    /// Rewrite `content` for email or SMS
    ///
    /// Falls back to the unmodified content with no subject on any failure.
    pub async fn format_for_channel(
        &self,
        content: &str,
        channel: Channel,
        language: TargetLanguage,
    ) -> FormattedMessage {
        debug!(%channel, %language, "format_for_channel: called");
        match self.try_format(content, channel, language).await {
            Ok(formatted) => formatted,
            Err(e) => {
                warn!(%channel, error = %e, "format_for_channel: returning content unformatted");
                FormattedMessage::unformatted(content)
            }
        }
    }

    async fn try_format(
        &self,
        content: &str,
        channel: Channel,
        language: TargetLanguage,
    ) -> Result<FormattedMessage, GenerationError> {
        let prompt = self
            .prompts
            .channel(&ChannelPromptContext {
                channel: channel.as_str(),
                is_email: channel == Channel::Email,
                content: content.to_string(),
                target_language: language.as_str(),
            })
            .map_err(|e| GenerationError::Prompt(e.to_string()))?;
        let response = self
            .call("format_for_channel", self.request(String::new(), prompt, reply::channel_schema()))
            .await?;
        let payload = response.json_payload().map_err(|e| GenerationError::Parse(e.to_string()))?;
        reply::parse_formatted(payload, channel).map_err(GenerationError::Parse)
    }
}
