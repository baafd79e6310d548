//! Chat message types and the completion collaborator trait.
//!
//! The completion backend is a black box behind [`ChatClient`]: it accepts an
//! ordered message sequence and a model identifier and returns generated text
//! plus token counts. Retries, timeouts, and auth live inside the
//! implementations in `nbcritic-providers`, never in the core.

use std::fmt;
use std::ops::AddAssign;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One part of a message: a text segment or an inline image reference.
///
/// Serializes to the wire shape chat-completions APIs expect:
/// `{"type":"text","text":...}` or `{"type":"image_url","image_url":{"url":...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

/// An image reference carried inside a message part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        MessagePart::ImageUrl {
            image_url: ImageRef { url: url.into() },
        }
    }

    /// Build an inline image part from a base64 PNG payload.
    pub fn png_data_url(base64: &str) -> Self {
        Self::image_url(format!("data:image/png;base64,{base64}"))
    }

    /// The text content, if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessagePart::Text { text } => Some(text),
            MessagePart::ImageUrl { .. } => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, MessagePart::ImageUrl { .. })
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<MessagePart>,
}

impl Message {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Message {
            role,
            content: vec![MessagePart::text(text)],
        }
    }

    pub fn parts(role: Role, content: Vec<MessagePart>) -> Self {
        Message { role, content }
    }
}

/// An ordered message history, passed by value.
///
/// Sessions never mutate a shared message list in place; appending produces a
/// new owned value and the updated history comes back out of each completion
/// call via [`ChatResponse::history`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation with a single system turn.
    pub fn with_system(text: impl Into<String>) -> Self {
        Conversation {
            messages: vec![Message::text(Role::System, text)],
        }
    }

    /// Append a turn, returning the extended conversation.
    #[must_use]
    pub fn with(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Conversation { messages }
    }
}

/// Token counts reported by the completion backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(other.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(other.completion_tokens);
    }
}

/// Request to the completion backend.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier (e.g. "google/gemini-2.0-flash-001").
    pub model: String,
    /// Full message history for this call.
    pub messages: Vec<Message>,
}

/// Response from the completion backend.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant's text.
    pub text: String,
    /// The request history with the assistant turn appended.
    pub history: Conversation,
    /// Token counts for this call.
    pub usage: TokenUsage,
}

/// Trait for chat completion backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Human-readable backend name (e.g. "openrouter").
    fn name(&self) -> &str;

    /// Run one completion over the given message history.
    async fn complete(&self, request: &ChatRequest) -> anyhow::Result<ChatResponse>;
}
