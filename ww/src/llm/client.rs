//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// No conversation state is kept between calls; every prompt carries all of
/// the context the model needs. Implementations make exactly one attempt per
/// call; retrying is the caller's concern.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full reply
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Provider name for logs
    fn provider(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::debug;

    /// One scripted reply
    #[derive(Debug, Clone)]
    pub enum MockReply {
        /// Structured payload, as a forced tool call would deliver it
        Json(serde_json::Value),
        /// Raw text body
        Text(String),
        /// Transport/API failure
        Fail(String),
    }

    /// Mock LLM client for unit tests
    pub struct MockLlmClient {
        replies: Mutex<VecDeque<MockReply>>,
        requests: Mutex<Vec<CompletionRequest>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(replies: Vec<MockReply>) -> Self {
            debug!(reply_count = %replies.len(), "MockLlmClient::new: called");
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Client whose every call fails
        pub fn failing() -> Self {
            Self::new(vec![])
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests received so far
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, "MockLlmClient::complete: called");
            self.requests.lock().unwrap().push(request);

            match self.replies.lock().unwrap().pop_front() {
                Some(MockReply::Json(value)) => Ok(CompletionResponse {
                    structured: Some(value),
                    ..CompletionResponse::text("")
                }),
                Some(MockReply::Text(text)) => Ok(CompletionResponse::text(text)),
                Some(MockReply::Fail(message)) => Err(LlmError::ApiError { status: 503, message }),
                None => Err(LlmError::InvalidResponse("No more mock responses".to_string())),
            }
        }

        fn provider(&self) -> &'static str {
            "mock"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::llm::Message;

        fn request() -> CompletionRequest {
            CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![Message::user("hello")],
                max_tokens: 1000,
                response_schema: None,
            }
        }

        #[tokio::test]
        async fn test_mock_client_returns_replies_in_order() {
            let client = MockLlmClient::new(vec![
                MockReply::Text("Response 1".to_string()),
                MockReply::Json(serde_json::json!({"n": 2})),
            ]);

            let resp1 = client.complete(request()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(request()).await.unwrap();
            assert_eq!(resp2.json_payload().unwrap()["n"], 2);

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::failing();
            assert!(client.complete(request()).await.is_err());
            assert_eq!(client.call_count(), 1);
        }
    }
}
