use crate::auth::{
    Credential, DEFAULT_OAUTH_URL, DEFAULT_REFRESH_INTERVAL, RefreshPolicy, SCOPE_B2B, SCOPE_CORP,
    SCOPE_PERSONAL,
};
use crate::error::{Error, Result};
use crate::provider::gigachat::{
    ChatParams, DEFAULT_CHAT_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_REPETITION_PENALTY,
};
use crate::provider::http::{ClientOptions, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the authorization key.
pub const CREDENTIAL_ENV: &str = "GIGACHAT_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base64 authorization key. Takes precedence over `client_id`/`client_secret`.
    pub credential: Option<Credential>,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<Credential>,

    pub scope: String,
    pub oauth_url: String,
    pub chat_url: String,

    pub model: String,
    pub max_tokens: u32,
    pub repetition_penalty: f64,

    pub refresh_interval_secs: u64,
    pub refresh_policy: RefreshPolicy,

    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Skip TLS certificate verification on both endpoints.
    pub insecure_skip_verify: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential: None,
            client_id: None,
            client_secret: None,
            scope: SCOPE_PERSONAL.to_string(),
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            chat_url: DEFAULT_CHAT_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            repetition_penalty: DEFAULT_REPETITION_PENALTY,
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
            refresh_policy: RefreshPolicy::default(),
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT.as_secs(),
            insecure_skip_verify: false,
        }
    }
}

impl Config {
    /// Default config file location (`<config dir>/gigachat/config.toml`).
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("gigachat").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".gigachat/config.toml"))
    }

    /// Load from the default path, then apply environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from `path` (defaults if the file is missing), then apply
    /// environment overrides.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(CREDENTIAL_ENV) {
            self.credential = Some(Credential::new(key));
        }
        if let Some(scope) = get("GIGACHAT_SCOPE") {
            self.scope = scope;
        }
        if let Some(model) = get("GIGACHAT_MODEL") {
            self.model = model;
        }
        if let Some(url) = get("GIGACHAT_OAUTH_URL") {
            self.oauth_url = url;
        }
        if let Some(url) = get("GIGACHAT_CHAT_URL") {
            self.chat_url = url;
        }
        if let Some(flag) = get("GIGACHAT_INSECURE") {
            self.insecure_skip_verify = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    /// Resolve the credential: explicit key first, then client id + secret.
    pub fn credential(&self) -> std::result::Result<Credential, crate::provider::Error> {
        if let Some(credential) = self.credential.as_ref().filter(|c| !c.is_empty()) {
            return Ok(credential.clone());
        }
        match (self.client_id.as_deref(), self.client_secret.as_ref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Ok(Credential::from_client_secret(id, secret.expose()))
            }
            _ => Err(crate::provider::Error::MissingCredential {
                env_var: CREDENTIAL_ENV,
            }),
        }
    }

    /// Reject values that would make the driver unusable.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(Error::Config("refresh_interval_secs must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }
        if self.connect_timeout_secs == 0 {
            return Err(Error::Config("connect_timeout_secs must be positive".into()));
        }
        if self.max_tokens == 0 {
            return Err(Error::Config("max_tokens must be positive".into()));
        }
        if !self.repetition_penalty.is_finite() || self.repetition_penalty <= 0.0 {
            return Err(Error::Config("repetition_penalty must be a positive number".into()));
        }
        for (name, url) in [("oauth_url", &self.oauth_url), ("chat_url", &self.chat_url)] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(Error::Config(format!("{name} must be an http(s) URL: {url}")));
            }
        }
        if ![SCOPE_PERSONAL, SCOPE_B2B, SCOPE_CORP].contains(&self.scope.as_str()) {
            tracing::warn!(scope = %self.scope, "Unrecognized OAuth scope");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            accept_invalid_certs: self.insecure_skip_verify,
        }
    }

    pub fn chat_params(&self) -> ChatParams {
        ChatParams {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            repetition_penalty: self.repetition_penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scope, "GIGACHAT_API_PERS");
        assert_eq!(config.model, "GigaChat");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.refresh_interval(), Duration::from_secs(900));
        assert_eq!(config.refresh_policy, RefreshPolicy::RetainLast);
        assert!(!config.insecure_skip_verify);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            credential = "a2V5"
            model = "GigaChat-Pro"
            refresh_policy = "fail_fast"
            insecure_skip_verify = true
            "#,
        )
        .unwrap();

        assert_eq!(config.credential().unwrap(), Credential::new("a2V5"));
        assert_eq!(config.model, "GigaChat-Pro");
        assert_eq!(config.refresh_policy, RefreshPolicy::FailFast);
        assert!(config.client_options().accept_invalid_certs);
        // Unset fields keep their defaults.
        assert_eq!(config.chat_url, DEFAULT_CHAT_URL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_tokens = 64\nrequest_timeout_secs = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.max_tokens, 64);
        assert_eq!(config.client_options().timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_tokens = \"lots\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("GIGACHAT_TOKEN", "from-env"),
            ("GIGACHAT_SCOPE", "GIGACHAT_API_CORP"),
            ("GIGACHAT_MODEL", "GigaChat-Max"),
            ("GIGACHAT_INSECURE", "true"),
        ]));

        assert_eq!(config.credential().unwrap(), Credential::new("from-env"));
        assert_eq!(config.scope, "GIGACHAT_API_CORP");
        assert_eq!(config.model, "GigaChat-Max");
        assert!(config.insecure_skip_verify);
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("GIGACHAT_TOKEN", ""), ("GIGACHAT_MODEL", "  ")]));
        assert!(config.credential.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_credential_from_client_secret() {
        let config = Config {
            client_id: Some("id".into()),
            client_secret: Some(Credential::new("secret")),
            ..Config::default()
        };
        assert_eq!(
            config.credential().unwrap(),
            Credential::from_client_secret("id", "secret")
        );
    }

    #[test]
    fn test_missing_credential() {
        let err = Config::default().credential().unwrap_err();
        assert!(err.to_string().contains(CREDENTIAL_ENV));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            refresh_interval_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_connect_timeout() {
        let config = Config {
            connect_timeout_secs: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("connect_timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = Config {
            chat_url: "ftp://example.com".into(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chat_url"));
    }

    #[test]
    fn test_serialized_config_omits_secret() {
        let config = Config {
            client_id: Some("id".into()),
            client_secret: Some(Credential::new("hunter2")),
            ..Config::default()
        };
        let text = toml::to_string(&config).unwrap();
        assert!(!text.contains("hunter2"));
    }
}
