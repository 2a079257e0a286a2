//! Driver wiring the token manager and chat client together.

use crate::auth::{OAuthClient, RefreshOutcome, RefreshTask, TokenHandle, TokenManager};
use crate::config::Config;
use crate::error::Result;
use crate::provider::Error as ProviderError;
use crate::provider::gigachat::ChatClient;
use crate::provider::http::HttpClient;
use std::sync::Arc;

/// GigaChat client with a self-refreshing access token.
///
/// Construction fetches a token once, then refreshes it in the background
/// every `refresh_interval_secs`. The refresh loop stops on [`Self::shutdown`]
/// or when the driver is dropped.
#[derive(Debug)]
pub struct GigaChatDriver {
    tokens: Arc<TokenManager>,
    chat: ChatClient,
    refresh: RefreshTask,
}

impl GigaChatDriver {
    /// Build the driver from config and perform the initial token fetch.
    ///
    /// A failed initial fetch is logged, not returned; requests then fail
    /// with `TokenUnavailable` until a later refresh succeeds.
    pub async fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let credential = config.credential()?;
        let http = HttpClient::new(&config.client_options())?;

        let oauth = OAuthClient::new(
            http.clone(),
            config.oauth_url.clone(),
            config.scope.clone(),
            credential,
        );
        let tokens = Arc::new(TokenManager::new(oauth, config.refresh_policy));
        let chat = ChatClient::new(
            http,
            config.chat_url.clone(),
            config.chat_params(),
            tokens.handle(),
        );

        if tokens.refresh().await != RefreshOutcome::Refreshed {
            tracing::warn!("Starting without an access token");
        }
        let refresh = Arc::clone(&tokens).spawn_refresh_loop(config.refresh_interval());

        Ok(Self {
            tokens,
            chat,
            refresh,
        })
    }

    /// Send `prompt` and return the model's reply.
    pub async fn send_request(&self, prompt: &str) -> std::result::Result<String, ProviderError> {
        self.chat.send_request(prompt).await
    }

    /// Force an out-of-band token refresh.
    pub async fn refresh_token(&self) -> RefreshOutcome {
        self.tokens.refresh().await
    }

    /// Shared handle to the cached token.
    #[must_use]
    pub fn token_handle(&self) -> TokenHandle {
        self.tokens.handle()
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_running()
    }

    /// Stop the background refresh loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.refresh.stop().await;
    }
}
