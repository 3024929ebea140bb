//! Google Gemini API client implementation
//!
//! Uses `generateContent` with a JSON response mime type and a response
//! schema, so the reply text is the structured payload.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, Role, StopReason, TokenUsage};
use crate::config::ResolvedLlmConfig;

/// Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
}

impl GeminiClient {
    /// Create a new client from configuration
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

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for the Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        let mut generation_config = serde_json::json!({
            "maxOutputTokens": request.max_tokens.min(self.max_tokens),
        });

        if let Some(schema) = &request.response_schema {
            debug!(name = %schema.name, "build_request_body: structured output");
            generation_config["responseMimeType"] = serde_json::json!("application/json");
            generation_config["responseSchema"] = schema.to_gemini_schema();
        }

        let mut body = serde_json::json!({
            "contents": convert_messages(&request.messages),
            "generationConfig": generation_config,
        });

        if !request.system_prompt.is_empty() {
            body["systemInstruction"] = serde_json::json!({
                "parts": [{ "text": request.system_prompt }]
            });
        }

        body
    }

    /// Parse the Gemini API response
    fn parse_response(&self, api_response: GeminiResponse) -> Result<CompletionResponse, LlmError> {
        debug!(candidate_count = api_response.candidates.len(), "parse_response: called");

        let Some(candidate) = api_response.candidates.into_iter().next() else {
            let reason = api_response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates returned".to_string());
            debug!(%reason, "parse_response: prompt blocked");
            return Err(LlmError::Blocked(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = api_response.usage_metadata.unwrap_or_default();

        Ok(CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            structured: None,
            stop_reason: candidate
                .finish_reason
                .as_deref()
                .map(StopReason::from_gemini)
                .unwrap_or_default(),
            usage: TokenUsage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            serde_json::json!({
                "role": role,
                "parts": [{ "text": msg.content }],
            })
        })
        .collect()
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(%self.model, %request.max_tokens, "complete: called");
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
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
        let api_response: GeminiResponse = response.json().await?;
        self.parse_response(api_response)
    }

    fn provider(&self) -> &'static str {
        "gemini"
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}
