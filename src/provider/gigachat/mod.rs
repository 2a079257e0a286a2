//! GigaChat chat-completions API.

mod client;
mod request;
mod response;

#[cfg(test)]
mod tests;

pub use client::{
    ChatClient, ChatParams, DEFAULT_CHAT_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
    DEFAULT_REPETITION_PENALTY,
};
pub use request::{ChatMessage, ChatRequest};
pub use response::{ChatResponse, Choice, ResponseMessage, Usage};
