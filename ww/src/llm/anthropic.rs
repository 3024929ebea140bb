//! Anthropic Claude API client implementation
//!
//! Structured replies are obtained by forcing a single tool call whose input
//! schema is the requested response shape.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, StopReason, TokenUsage};
use crate::config::ResolvedLlmConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude API client
pub struct AnthropicClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl AnthropicClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in config.
    pub fn from_config(config: &ResolvedLlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = config.get_api_key()?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens.min(self.max_tokens),
            "system": request.system_prompt,
            "messages": convert_messages(&request.messages),
        });

        if let Some(schema) = &request.response_schema {
            debug!(name = %schema.name, "build_request_body: forcing structured tool");
            body["tools"] = serde_json::json!([schema.to_anthropic_tool()]);
            body["tool_choice"] = serde_json::json!({ "type": "tool", "name": schema.name });
        } else {
            debug!("build_request_body: plain text request");
        }

        body
    }

    /// Parse the Anthropic API response
    fn parse_response(&self, api_response: AnthropicResponse) -> CompletionResponse {
        debug!(?api_response.stop_reason, "parse_response: called");
        let mut content = None;
        let mut structured = None;

        for block in api_response.content {
            match block {
                AnthropicContentBlock::Text { text } => {
                    debug!("parse_response: Text block");
                    content = Some(text);
                }
                AnthropicContentBlock::ToolUse { name, input } => {
                    debug!(%name, "parse_response: ToolUse block");
                    structured = Some(input);
                }
                AnthropicContentBlock::Other => {
                    debug!("parse_response: skipping unknown block");
                }
            }
        }

        CompletionResponse {
            content,
            structured,
            stop_reason: StopReason::from_anthropic(api_response.stop_reason.as_deref().unwrap_or("end_turn")),
            usage: TokenUsage {
                input_tokens: api_response.usage.input_tokens,
                output_tokens: api_response.usage.output_tokens,
            },
        }
    }
}

fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|msg| {
            serde_json::json!({
                "role": msg.role,
                "content": msg.content,
            })
        })
        .collect()
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "complete: called");
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(url)
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if status == 429 {
            debug!("complete: rate limited (429)");
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            debug!(%status, "complete: API error");
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message: text });
        }

        debug!("complete: success");
        let api_response: AnthropicResponse = response.json().await?;
        Ok(self.parse_response(api_response))
    }

    fn provider(&self) -> &'static str {
        "anthropic"
    }
}

// Anthropic API response types

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse { name: String, input: serde_json::Value },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u64,
    output_tokens: u64,
}
