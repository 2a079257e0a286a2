//! Shared access-token slot.

use std::sync::Arc;
use tokio::sync::RwLock;

/// Bearer token as issued by the OAuth endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Access token for API calls.
    pub access_token: String,
    /// Token expiration timestamp (milliseconds since epoch), if reported.
    pub expires_at: Option<u64>,
}

impl IssuedToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    /// Check if the access token is past its reported expiry.
    ///
    /// Tokens without an expiry are never considered expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let Some(expires_at) = self.expires_at else {
            return false;
        };

        #[allow(clippy::cast_possible_truncation)] // ms since epoch won't overflow u64
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        now >= expires_at
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Single-writer/multi-reader handle to the current access token.
///
/// The refresh path writes; request paths read a clone. Cloning the handle
/// shares the same slot.
#[derive(Debug, Clone, Default)]
pub struct TokenHandle {
    inner: Arc<RwLock<Option<IssuedToken>>>,
}

impl TokenHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle pre-populated with a token.
    #[must_use]
    pub fn with_token(token: IssuedToken) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(token))),
        }
    }

    /// Current bearer token, or `None` if nothing usable is cached.
    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .filter(|t| !t.access_token.is_empty())
            .map(|t| t.access_token.clone())
    }

    pub async fn snapshot(&self) -> Option<IssuedToken> {
        self.inner.read().await.clone()
    }

    /// Overwrite the cached token (last write wins).
    pub async fn store(&self, token: IssuedToken) {
        *self.inner.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}
