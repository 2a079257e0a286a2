//! GigaChat chat-completions request types.

use serde::Serialize;

/// Top-level request to the chat-completions endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub n: u32,
    pub stream: bool,
    pub max_tokens: u32,
    pub repetition_penalty: f64,
    /// Seconds between streamed chunks; meaningless when `stream` is false.
    pub update_interval: u32,
}

/// A role/content pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
