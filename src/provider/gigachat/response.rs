//! GigaChat chat-completions response types.

use crate::provider::Error;
use serde::Deserialize;

/// Response from the chat-completions endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub created: Option<u64>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message content in a response.
#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Token usage information.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice.
    pub fn into_text(self) -> Result<String, Error> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(Error::EmptyCompletion)
    }
}
