//! Mock chat client for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use nbcritic_core::chat::{
    ChatClient, ChatRequest, ChatResponse, Conversation, Message, Role, TokenUsage,
};

/// A mock completion backend for driving the pipeline without real API calls.
///
/// Pops scripted responses in order, then falls back to a fixed response.
pub struct MockChatClient {
    script: Mutex<VecDeque<String>>,
    default_response: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockChatClient {
    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_response: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that returns the given responses in order, then the
    /// fallback.
    pub fn with_script(responses: Vec<String>, fallback: &str) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            default_response: fallback.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of calls made to this client.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// The last request received.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let text = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone());

        // Rough token estimate so usage accounting is exercised
        let prompt_chars: usize = request
            .messages
            .iter()
            .flat_map(|m| m.content.iter())
            .filter_map(|p| p.as_text())
            .map(|t| t.len())
            .sum();

        let history = Conversation::from(request.messages.clone())
            .with(Message::text(Role::Assistant, text.clone()));

        Ok(ChatResponse {
            usage: TokenUsage {
                prompt_tokens: (prompt_chars / 4) as u32,
                completion_tokens: (text.len() / 4) as u32,
            },
            text,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_response() {
        let client = MockChatClient::with_fixed_response("always this");
        let request = ChatRequest {
            model: "mock".into(),
            messages: vec![Message::text(Role::User, "anything")],
        };

        let response = client.complete(&request).await.unwrap();
        assert_eq!(response.text, "always this");
        assert_eq!(response.history.len(), 2);
        assert_eq!(client.call_count(), 1);
        assert_eq!(client.last_request().unwrap().model, "mock");
    }

    #[tokio::test]
    async fn scripted_responses_in_order() {
        let client =
            MockChatClient::with_script(vec!["first".into(), "second".into()], "fallback");
        let request = ChatRequest {
            model: "mock".into(),
            messages: vec![Message::text(Role::User, "hi")],
        };

        assert_eq!(client.complete(&request).await.unwrap().text, "first");
        assert_eq!(client.complete(&request).await.unwrap().text, "second");
        assert_eq!(client.complete(&request).await.unwrap().text, "fallback");
        assert_eq!(client.call_count(), 3);
    }
}
