//! Mock chat model for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{ModelError, Result};
use crate::{ChatModel, ChatRequest};

/// A deterministic [`ChatModel`] that records every request it receives.
///
/// Tests use the recorded requests to assert how (and whether) the
/// generation model was called — e.g. that an empty retrieval never
/// reaches the model.
///
/// # Example
///
/// ```rust,ignore
/// let model = MockChatModel::new("réponse fixe");
/// let answer = model.complete(request).await?;
/// assert_eq!(answer, "réponse fixe");
/// assert_eq!(model.call_count(), 1);
/// ```
pub struct MockChatModel {
    reply: String,
    fail_with: Option<String>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatModel {
    /// Create a mock that always returns `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), fail_with: None, requests: Mutex::new(Vec::new()) }
    }

    /// Create a mock that always fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: String::new(),
            fail_with: Some(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Number of `complete` calls received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock lock poisoned").len()
    }

    /// All requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: ChatRequest) -> Result<String> {
        self.requests.lock().expect("mock lock poisoned").push(request);
        match &self.fail_with {
            Some(message) => {
                Err(ModelError::Generation { provider: "mock".into(), message: message.clone() })
            }
            None => Ok(self.reply.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Message;

    fn request(content: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![Message::user(content)],
            max_output_tokens: None,
            temperature: None,
        }
    }

    #[tokio::test]
    async fn records_requests_and_replies() {
        let model = MockChatModel::new("ok");
        assert_eq!(model.call_count(), 0);

        let answer = model.complete(request("question")).await.unwrap();
        assert_eq!(answer, "ok");
        assert_eq!(model.call_count(), 1);
        assert_eq!(model.requests()[0].messages[0].content, "question");
    }

    #[tokio::test]
    async fn failing_mock_returns_generation_error() {
        let model = MockChatModel::failing("boom");
        let err = model.complete(request("q")).await.unwrap_err();
        assert!(matches!(err, ModelError::Generation { .. }));
        assert_eq!(model.call_count(), 1);
    }
}
