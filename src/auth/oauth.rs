//! GigaChat OAuth client-credentials exchange.
//!
//! The authorization key issued in the developer console is the Base64 of
//! `client_id:client_secret`. It is sent as a Basic credential together with a
//! per-request `RqUID` and the API scope; the response carries a bearer token
//! valid for roughly 30 minutes.

use super::token::IssuedToken;
use crate::provider::Error;
use crate::provider::http::{AuthConfig, HttpClient};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// OAuth token endpoint.
pub const DEFAULT_OAUTH_URL: &str = "https://ngw.devices.sberbank.ru:9443/api/v2/oauth";

/// Scope for personal (individual) API access.
pub const SCOPE_PERSONAL: &str = "GIGACHAT_API_PERS";
/// Scope for business access, prepaid packages.
pub const SCOPE_B2B: &str = "GIGACHAT_API_B2B";
/// Scope for business access, pay-as-you-go.
pub const SCOPE_CORP: &str = "GIGACHAT_API_CORP";

/// Static client credential (Base64 authorization key).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap an already encoded authorization key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Encode a client id and secret into an authorization key.
    #[must_use]
    pub fn from_client_secret(client_id: &str, client_secret: &str) -> Self {
        Self(STANDARD.encode(format!("{client_id}:{client_secret}")))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Credential").field(&"[REDACTED]").finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Milliseconds since epoch.
    #[serde(default)]
    expires_at: Option<u64>,
}

/// Client for the OAuth token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: HttpClient,
    url: String,
    scope: String,
    credential: Credential,
}

impl OAuthClient {
    pub fn new(
        http: HttpClient,
        url: impl Into<String>,
        scope: impl Into<String>,
        credential: Credential,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            scope: scope.into(),
            credential,
        }
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Exchange the credential for a bearer token.
    ///
    /// `request_id` is sent as `RqUID` and must be unique per call.
    pub async fn fetch_token(&self, request_id: &str) -> Result<IssuedToken, Error> {
        let mut extra = HeaderMap::new();
        let rquid = HeaderValue::from_str(request_id)
            .map_err(|_| Error::Build("RqUID contains invalid header characters".into()))?;
        extra.insert(HeaderName::from_static("rquid"), rquid);

        tracing::debug!(request_id = %request_id, scope = %self.scope, "Requesting access token");

        let response: TokenResponse = self
            .http
            .post_form(
                &self.url,
                &AuthConfig::Basic(self.credential.expose().to_string()),
                extra,
                &[("scope", self.scope.as_str())],
            )
            .await?;

        if response.access_token.trim().is_empty() {
            return Err(Error::Parse("empty access_token in token response".into()));
        }

        Ok(IssuedToken {
            access_token: response.access_token,
            expires_at: response.expires_at,
        })
    }
}
