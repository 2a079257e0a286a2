//! GigaChat chat-completions client.

use super::request::{ChatMessage, ChatRequest};
use super::response::ChatResponse;
use crate::auth::TokenHandle;
use crate::provider::Error;
use crate::provider::http::{AuthConfig, HttpClient};

/// Chat-completions endpoint.
pub const DEFAULT_CHAT_URL: &str = "https://gigachat.devices.sberbank.ru/api/v1/chat/completions";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "GigaChat";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_REPETITION_PENALTY: f64 = 1.0;

/// Sampling parameters applied to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatParams {
    pub model: String,
    pub max_tokens: u32,
    pub repetition_penalty: f64,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            repetition_penalty: DEFAULT_REPETITION_PENALTY,
        }
    }
}

/// Single-prompt chat client reading the bearer token from a shared handle.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: HttpClient,
    url: String,
    params: ChatParams,
    tokens: TokenHandle,
}

impl ChatClient {
    pub fn new(
        http: HttpClient,
        url: impl Into<String>,
        params: ChatParams,
        tokens: TokenHandle,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            params,
            tokens,
        }
    }

    #[must_use]
    pub fn params(&self) -> &ChatParams {
        &self.params
    }

    /// Build the request body for one user prompt.
    pub(crate) fn build_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.params.model.clone(),
            messages: vec![ChatMessage::user(prompt)],
            n: 1,
            stream: false,
            max_tokens: self.params.max_tokens,
            repetition_penalty: self.params.repetition_penalty,
            update_interval: 0,
        }
    }

    /// Send `prompt` as a single user message and return the first reply.
    ///
    /// Fails with [`Error::TokenUnavailable`] before any network I/O when no
    /// token is cached.
    pub async fn send_request(&self, prompt: &str) -> Result<String, Error> {
        let token = self
            .tokens
            .snapshot()
            .await
            .filter(|t| !t.access_token.is_empty())
            .ok_or(Error::TokenUnavailable)?;

        if token.is_expired() {
            tracing::warn!(
                expires_at = ?token.expires_at,
                "Cached access token is past its expiry; sending anyway"
            );
        }

        let api_request = self.build_request(prompt);

        tracing::debug!(
            model = %api_request.model,
            max_tokens = api_request.max_tokens,
            prompt_chars = prompt.chars().count(),
            "GigaChat API request"
        );

        let response: ChatResponse = self
            .http
            .post_json(&self.url, &AuthConfig::Bearer(token.access_token), &api_request)
            .await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "GigaChat API response"
            );
        }

        response.into_text()
    }
}
