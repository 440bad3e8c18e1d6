//! Provider-agnostic helpers: config resolution and error types.

use std::fmt;

use anyhow::{Context, Result};
use serde_json::Value;

/// Standard User-Agent header for gemexec API requests.
pub const USER_AGENT: &str = concat!("gemexec/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Config resolution helpers
// ============================================================================

/// Resolves an API key with precedence: config > env vars (in order).
///
/// Blank values are skipped; other values are returned unchanged. Returns
/// `None` when nothing is set; a missing key is reported to the user, not
/// raised as an error.
pub fn resolve_api_key(config_api_key: Option<&str>, env_vars: &[&str]) -> Option<String> {
    resolve_api_key_with(config_api_key, env_vars, |name| std::env::var(name).ok())
}

fn resolve_api_key_with(
    config_api_key: Option<&str>,
    env_vars: &[&str],
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<String> {
    // Blank values count as unset; anything else is sent as written.
    let non_blank = |value: &str| (!value.trim().is_empty()).then(|| value.to_string());

    config_api_key.and_then(non_blank).or_else(|| {
        env_vars
            .iter()
            .find_map(|name| lookup(name).as_deref().and_then(non_blank))
    })
}

/// Resolves a base URL with precedence: env > config > default.
///
/// # Arguments
/// * `config_base_url` - Value from config file (if present)
/// * `env_var` - Environment variable name (e.g., "`GEMINI_BASE_URL`")
/// * `default_url` - Default URL if neither env nor config is set
/// * `provider_name` - Human-readable provider name for error messages
///
/// # Errors
/// Returns an error if the chosen URL does not parse.
pub fn resolve_base_url(
    config_base_url: Option<&str>,
    env_var: &str,
    default_url: &str,
    provider_name: &str,
) -> Result<String> {
    if let Ok(env_url) = std::env::var(env_var) {
        let trimmed = env_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, provider_name)?;
            return Ok(trimmed.to_string());
        }
    }

    if let Some(config_url) = config_base_url {
        let trimmed = config_url.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed, provider_name)?;
            return Ok(trimmed.to_string());
        }
    }

    Ok(default_url.to_string())
}

fn validate_url(url: &str, provider_name: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid {provider_name} base URL: {url}"))?;
    Ok(())
}

// ============================================================================
// Errors
// ============================================================================

/// Provider error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Non-2xx HTTP response or transport failure
    HttpStatus,
    /// Connection timeout or request timeout
    Timeout,
    /// Failed to parse the response body
    Parse,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::HttpStatus => write!(f, "http_status"),
            ProviderErrorKind::Timeout => write!(f, "timeout"),
            ProviderErrorKind::Parse => write!(f, "parse"),
        }
    }
}

/// Structured error from the provider with kind and details.
#[derive(Debug, Clone)]
pub struct ProviderError {
    /// Error category
    pub kind: ProviderErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Optional additional details (e.g., raw error body)
    pub details: Option<String>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    /// Creates an HTTP status error, lifting `error.message` out of a JSON
    /// body when there is one.
    pub fn http_status(status: u16, body: &str) -> Self {
        if let Ok(json) = serde_json::from_str::<Value>(body)
            && let Some(msg) = json
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
        {
            return Self {
                kind: ProviderErrorKind::HttpStatus,
                message: format!("HTTP {status}: {msg}"),
                details: Some(body.to_string()),
            };
        }

        Self {
            kind: ProviderErrorKind::HttpStatus,
            message: format!("HTTP {status}"),
            details: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Parse, message)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Classifies a reqwest error into a `ProviderError`.
pub fn classify_reqwest_error(e: &reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::timeout(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ProviderError::timeout(format!("Connection failed: {e}"))
    } else if e.is_request() {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Request error: {e}"))
    } else if e.is_decode() || e.is_body() {
        ProviderError::parse(format!("Failed to read response body: {e}"))
    } else {
        ProviderError::new(ProviderErrorKind::HttpStatus, format!("Network error: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn api_key_prefers_config() {
        let key = resolve_api_key_with(
            Some("from-config"),
            &["API_KEY"],
            lookup(&[("API_KEY", "from-env")]),
        );
        assert_eq!(key.as_deref(), Some("from-config"));
    }

    #[test]
    fn api_key_is_passed_through_untrimmed() {
        let key = resolve_api_key_with(Some(" key "), &["API_KEY"], lookup(&[]));
        assert_eq!(key.as_deref(), Some(" key "));

        let key = resolve_api_key_with(None, &["API_KEY"], lookup(&[("API_KEY", "k\t")]));
        assert_eq!(key.as_deref(), Some("k\t"));
    }

    #[test]
    fn api_key_falls_back_through_env_vars_in_order() {
        let vars = lookup(&[("API_KEY", "   "), ("GEMINI_API_KEY", "gemini")]);
        let key = resolve_api_key_with(Some(""), &["API_KEY", "GEMINI_API_KEY"], vars);
        assert_eq!(key.as_deref(), Some("gemini"));
    }

    #[test]
    fn api_key_absent_when_nothing_set() {
        let key = resolve_api_key_with(None, &["API_KEY"], lookup(&[]));
        assert_eq!(key, None);
    }

    #[test]
    fn http_status_extracts_json_message() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = ProviderError::http_status(429, body);
        assert_eq!(err.kind, ProviderErrorKind::HttpStatus);
        assert_eq!(err.message, "HTTP 429: quota exceeded");
        assert_eq!(err.details.as_deref(), Some(body));
    }

    #[test]
    fn http_status_keeps_plain_body_as_details() {
        let err = ProviderError::http_status(502, "bad gateway");
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(err.details.as_deref(), Some("bad gateway"));

        let empty = ProviderError::http_status(500, "");
        assert_eq!(empty.details, None);
    }

    #[test]
    fn validate_url_rejects_garbage() {
        assert!(validate_url("not a url", "Gemini").is_err());
        assert!(validate_url("http://127.0.0.1:8080", "Gemini").is_ok());
    }
}
