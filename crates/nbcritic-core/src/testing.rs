//! Shared test double for the completion backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::chat::{ChatClient, ChatRequest, ChatResponse, Conversation, Message, Role, TokenUsage};

/// A scripted `ChatClient`: pops queued responses, then falls back to a
/// fixed response.
pub(crate) struct StubClient {
    script: Mutex<VecDeque<String>>,
    fallback: String,
    call_count: AtomicU32,
    last_request: Mutex<Option<ChatRequest>>,
}

impl StubClient {
    pub fn fixed(response: &str) -> Self {
        StubClient {
            script: Mutex::new(VecDeque::new()),
            fallback: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn scripted(responses: Vec<String>, fallback: &str) -> Self {
        StubClient {
            script: Mutex::new(responses.into()),
            fallback: fallback.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for StubClient {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let text = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        let history = Conversation::from(request.messages.clone())
            .with(Message::text(Role::Assistant, text.clone()));

        Ok(ChatResponse {
            text,
            history,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            },
        })
    }
}
