//! Provider error types.

use thiserror::Error;

/// Format an API error for display, extracting message from JSON if present.
///
/// Handles common patterns:
/// - `"API error: HTTP 401: {"status":401,"message":"Unauthorized"}"` → extracts message
/// - `"API error: HTTP 400: {"error": {"message": "..."}}"` → extracts message
/// - Plain text errors → returns as-is
#[must_use]
pub fn format_api_error(error: &str) -> String {
    if let Some(json_start) = error.find('{') {
        let json_str = &error[json_start..];

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(json_str)
            && let Some(msg) = extract_error_message(&json)
        {
            let prefix = &error[..json_start].trim();
            if prefix.is_empty() {
                return msg;
            }
            return format!("{prefix} {msg}");
        }
    }

    error.to_string()
}

/// Extract user-friendly message from JSON error response.
fn extract_error_message(json: &serde_json::Value) -> Option<String> {
    // GigaChat: {"status": 401, "message": "Unauthorized"}
    // OAuth gateway: {"code": 6, "message": "credentials doesn't match db data"}
    // Generic: {"error": {"message": "..."}} or {"error": "..."}
    if let Some(error_obj) = json.get("error") {
        if let Some(msg) = error_obj.get("message").and_then(|v| v.as_str()) {
            return Some(msg.to_string());
        }
        if let Some(msg) = error_obj.as_str() {
            return Some(msg.to_string());
        }
    }

    let msg = json.get("message").and_then(|v| v.as_str())?;
    match json.get("code").and_then(serde_json::Value::as_i64) {
        Some(code) => Some(format!("{msg} (code: {code})")),
        None => Some(msg.to_string()),
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing credential. Set {env_var} or `credential` in the config file")]
    MissingCredential { env_var: &'static str },

    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response contained no completion choices")]
    EmptyCompletion,

    #[error("No access token available")]
    TokenUnavailable,
}

impl Error {
    /// Whether the remote side rejected the credential or bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}
