//! LLM request/response types
//!
//! Provider-agnostic shapes; each client maps them onto its own wire format.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LlmError;

/// A completion request - everything needed for one generation call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction
    pub system_prompt: String,

    /// User messages (one rendered prompt in practice)
    pub messages: Vec<Message>,

    /// Max tokens for response
    pub max_tokens: u32,

    /// Shape the reply must conform to, if structured output is wanted
    pub response_schema: Option<ResponseSchema>,
}

impl CompletionRequest {
    /// Single-prompt request asking for a structured reply
    pub fn structured(
        system_prompt: impl Into<String>,
        prompt: impl Into<String>,
        schema: ResponseSchema,
        max_tokens: u32,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages: vec![Message::user(prompt)],
            max_tokens,
            response_schema: Some(schema),
        }
    }
}

/// A message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message with text content
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message with text content
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Required shape of a structured reply, as a JSON Schema object
///
/// Schemas are written with lowercase JSON Schema type names; providers that
/// use a different dialect convert on the way out.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }

    /// Tool definition that forces the reply through the schema (Anthropic)
    pub fn to_anthropic_tool(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.schema,
        })
    }

    /// OpenAPI-subset schema with upper-case type names (Gemini)
    pub fn to_gemini_schema(&self) -> serde_json::Value {
        let mut schema = self.schema.clone();
        upcase_types(&mut schema);
        schema
    }
}

fn upcase_types(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if key == "type"
                    && let serde_json::Value::String(name) = child
                {
                    *name = name.to_uppercase();
                } else {
                    upcase_types(child);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(upcase_types),
        _ => {}
    }
}

/// Response from a completion request
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Structured payload delivered out of band (forced tool input)
    pub structured: Option<serde_json::Value>,

    /// Why the model stopped
    pub stop_reason: StopReason,

    /// Token accounting
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Plain text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            structured: None,
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    /// The structured reply as JSON
    ///
    /// Prefers an out-of-band structured payload, otherwise parses the text
    /// body, tolerating a surrounding markdown code fence.
    pub fn json_payload(&self) -> Result<serde_json::Value, LlmError> {
        debug!(has_structured = self.structured.is_some(), "json_payload: called");
        if let Some(value) = &self.structured {
            return Ok(value.clone());
        }

        let text = self
            .content
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("Empty response body".to_string()))?;

        Ok(serde_json::from_str(strip_code_fence(text))?)
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Why generation stopped
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StopReason {
    #[default]
    EndTurn,
    MaxTokens,
    ToolUse,
    StopSequence,
    Safety,
    Other(String),
}

impl StopReason {
    pub fn from_anthropic(reason: &str) -> Self {
        match reason {
            "end_turn" => Self::EndTurn,
            "max_tokens" => Self::MaxTokens,
            "tool_use" => Self::ToolUse,
            "stop_sequence" => Self::StopSequence,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn from_gemini(reason: &str) -> Self {
        match reason {
            "STOP" => Self::EndTurn,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" => Self::Safety,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ResponseSchema {
        ResponseSchema::new(
            "emit",
            "Emit the reply",
            serde_json::json!({
                "type": "object",
                "properties": {
                    "items": { "type": "array", "items": { "type": "string" } },
                    "type": { "type": "string", "description": "a property literally named type" }
                },
                "required": ["items"]
            }),
        )
    }

    #[test]
    fn test_gemini_schema_upcases_types() {
        let converted = schema().to_gemini_schema();
        assert_eq!(converted["type"], "OBJECT");
        assert_eq!(converted["properties"]["items"]["type"], "ARRAY");
        assert_eq!(converted["properties"]["items"]["items"]["type"], "STRING");
        assert_eq!(converted["properties"]["type"]["type"], "STRING");
        assert_eq!(converted["required"][0], "items");
    }

    #[test]
    fn test_anthropic_tool_shape() {
        let tool = schema().to_anthropic_tool();
        assert_eq!(tool["name"], "emit");
        assert_eq!(tool["input_schema"]["type"], "object");
    }

    #[test]
    fn test_json_payload_prefers_structured() {
        let response = CompletionResponse {
            content: Some("not json".to_string()),
            structured: Some(serde_json::json!({"ok": true})),
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        };
        assert_eq!(response.json_payload().unwrap()["ok"], true);
    }

    #[test]
    fn test_json_payload_from_text_and_fence() {
        let plain = CompletionResponse::text(r#"{"a": 1}"#);
        assert_eq!(plain.json_payload().unwrap()["a"], 1);

        let fenced = CompletionResponse::text("```json\n{\"a\": 2}\n```");
        assert_eq!(fenced.json_payload().unwrap()["a"], 2);

        let bare_fence = CompletionResponse::text("```\n[1, 2]\n```");
        assert_eq!(bare_fence.json_payload().unwrap()[1], 2);
    }

    #[test]
    fn test_json_payload_errors() {
        assert!(CompletionResponse::text("   ").json_payload().is_err());
        assert!(CompletionResponse::text("Sure! Here you go").json_payload().is_err());
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(StopReason::from_anthropic("tool_use"), StopReason::ToolUse);
        assert_eq!(StopReason::from_gemini("STOP"), StopReason::EndTurn);
        assert_eq!(StopReason::from_gemini("SAFETY"), StopReason::Safety);
        assert_eq!(
            StopReason::from_gemini("RECITATION"),
            StopReason::Other("RECITATION".to_string())
        );
    }
}
