//! HTTP client wrapper for GigaChat API requests.

use crate::provider::error::Error;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Authentication configuration.
#[derive(Clone)]
pub enum AuthConfig {
    /// Bearer token authentication (Authorization: Bearer {token}).
    Bearer(String),
    /// Pre-encoded Basic credential (Authorization: Basic {key}).
    Basic(String),
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic(_) => f.debug_tuple("Basic").field(&"[REDACTED]").finish(),
        }
    }
}

impl AuthConfig {
    fn header_value(&self) -> Result<HeaderValue, Error> {
        let (scheme, secret) = match self {
            Self::Bearer(token) => ("Bearer", token),
            Self::Basic(key) => ("Basic", key),
        };
        let mut value = HeaderValue::from_str(&format!("{scheme} {secret}")).map_err(|_| {
            Error::Build(format!("{scheme} credential contains invalid header characters"))
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Transport settings shared by the OAuth and chat endpoints.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Skip TLS certificate verification. The GigaChat endpoints are signed by
    /// a national CA that is absent from most trust stores.
    pub accept_invalid_certs: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            accept_invalid_certs: false,
        }
    }
}

/// HTTP client for GigaChat API requests.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new(options: &ClientOptions) -> Result<Self, Error> {
        if options.accept_invalid_certs {
            tracing::warn!("TLS certificate verification is disabled");
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .danger_accept_invalid_certs(options.accept_invalid_certs)
            .build()
            .map_err(|e| Error::Build(e.to_string()))?;

        Ok(Self { client })
    }

    /// Build headers including authentication.
    fn build_headers(auth: &AuthConfig, content_type: &'static str) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, auth.header_value()?);
        Ok(headers)
    }

    /// Make a POST request with JSON body and deserialize the response.
    pub async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        url: &str,
        auth: &AuthConfig,
        body: &T,
    ) -> Result<R, Error> {
        let headers = Self::build_headers(auth, "application/json")?;

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(body)
            .send()
            .await?;

        read_json(response).await
    }

    /// Make a form-encoded POST request and deserialize the response.
    ///
    /// `extra` headers are applied after the standard ones.
    pub async fn post_form<R: DeserializeOwned>(
        &self,
        url: &str,
        auth: &AuthConfig,
        extra: HeaderMap,
        form: &[(&str, &str)],
    ) -> Result<R, Error> {
        let mut headers = Self::build_headers(auth, "application/x-www-form-urlencoded")?;
        headers.extend(extra);

        let response = self
            .client
            .post(url)
            .headers(headers)
            .form(form)
            .send()
            .await?;

        read_json(response).await
    }
}

/// Anything other than 200 is an API error carrying the raw body.
async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, Error> {
    let status = response.status();
    let text = response.text().await?;

    if status != StatusCode::OK {
        return Err(Error::Api {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|e| Error::Parse(format!("{e}\nBody: {text}")))
}
