//! Access-token management for the GigaChat API.
//!
//! A [`TokenManager`] exchanges the static credential for a bearer token,
//! publishes it through a [`TokenHandle`], and can keep it fresh from a
//! background task started with [`TokenManager::spawn_refresh_loop`].

mod oauth;
mod token;

pub use oauth::{
    Credential, DEFAULT_OAUTH_URL, OAuthClient, SCOPE_B2B, SCOPE_CORP, SCOPE_PERSONAL,
};
pub use token::{IssuedToken, TokenHandle};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Default refresh cadence. Tokens live about 30 minutes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// What to do with the cached token when a refresh fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Keep serving the previous token until a refresh succeeds.
    #[default]
    RetainLast,
    /// Drop the cached token so requests fail with `TokenUnavailable`.
    FailFast,
}

/// Result of a single refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new token was stored.
    Refreshed,
    /// The fetch failed and the previous token (if any) was kept.
    Retained,
    /// The fetch failed and the cached token was cleared.
    Cleared,
}

/// Owns the OAuth client and the shared token slot.
#[derive(Debug)]
pub struct TokenManager {
    oauth: OAuthClient,
    handle: TokenHandle,
    policy: RefreshPolicy,
}

impl TokenManager {
    pub fn new(oauth: OAuthClient, policy: RefreshPolicy) -> Self {
        Self::with_handle(oauth, policy, TokenHandle::new())
    }

    /// Manager writing into an existing handle.
    pub fn with_handle(oauth: OAuthClient, policy: RefreshPolicy, handle: TokenHandle) -> Self {
        Self {
            oauth,
            handle,
            policy,
        }
    }

    /// Reader handle for the request path.
    #[must_use]
    pub fn handle(&self) -> TokenHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Fetch a fresh token and publish it.
    ///
    /// Failures are logged, never returned; the policy decides whether the
    /// previous token survives.
    pub async fn refresh(&self) -> RefreshOutcome {
        let request_id = uuid::Uuid::new_v4().to_string();

        match self.oauth.fetch_token(&request_id).await {
            Ok(token) => {
                tracing::info!(
                    request_id = %request_id,
                    expires_at = ?token.expires_at,
                    "Access token refreshed"
                );
                self.handle.store(token).await;
                RefreshOutcome::Refreshed
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %request_id,
                    policy = ?self.policy,
                    "Failed to refresh access token: {e}"
                );
                match self.policy {
                    RefreshPolicy::RetainLast => RefreshOutcome::Retained,
                    RefreshPolicy::FailFast => {
                        self.handle.clear().await;
                        RefreshOutcome::Cleared
                    }
                }
            }
        }
    }

    /// Refresh every `period` until the returned task is stopped or dropped.
    ///
    /// The first refresh happens one full period after the call; callers
    /// that need a token immediately should await [`Self::refresh`] first.
    #[must_use]
    pub fn spawn_refresh_loop(self: Arc<Self>, period: Duration) -> RefreshTask {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    () = child.cancelled() => break,
                    _ = ticker.tick() => {
                        self.refresh().await;
                    }
                }
            }
            tracing::debug!("Token refresh loop stopped");
        });

        tracing::debug!(period_secs = period.as_secs(), "Token refresh loop started");

        RefreshTask {
            cancel,
            join: Some(join),
        }
    }
}

/// Handle to the background refresh loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct RefreshTask {
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
}

impl RefreshTask {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.join.as_ref().is_some_and(|j| !j.is_finished())
    }

    /// Cancel the loop and wait for it to exit.
    ///
    /// A refresh already in flight runs to completion first.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take()
            && let Err(e) = join.await
        {
            tracing::warn!("Token refresh loop ended abnormally: {e}");
        }
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
