//! Gemini API key client for the non-streaming `generateContent` endpoint.

use anyhow::Result;
use gemexec_types::{Capability, GenerationRequest, GenerationResponse};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::debug;

use crate::providers::{GenerativeModel, ProviderError, USER_AGENT, classify_reqwest_error};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

/// Gemini client. One instance per run; there is no pooling across runs.
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Sends one `generateContent` request and parses the full response.
    ///
    /// # Errors
    /// Returns a [`ProviderError`] for transport failures, non-2xx statuses
    /// and bodies that are not a valid response.
    pub async fn generate_content(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let url = generate_url(&self.config.base_url, request.model());
        let body = build_generate_request(request);
        debug!(model = request.model(), %url, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .headers(build_headers(&self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;
        debug!(status = status.as_u16(), bytes = text.len(), "received generateContent response");

        if !status.is_success() {
            return Err(ProviderError::http_status(status.as_u16(), &text).into());
        }

        let parsed: GenerationResponse = serde_json::from_str(&text).map_err(|e| {
            ProviderError::parse(format!("Failed to parse Gemini response JSON: {e}"))
        })?;
        Ok(parsed)
    }
}

impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.generate_content(request).await
    }
}

/// Builds the `generateContent` body: one user turn plus a tool entry per
/// enabled capability. No generation config is sent.
pub fn build_generate_request(request: &GenerationRequest) -> Value {
    let mut body = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt() }]
        }]
    });

    let tools: Vec<Value> = request
        .capabilities()
        .iter()
        .map(|capability| match capability {
            Capability::CodeExecution => json!({ "codeExecution": {} }),
        })
        .collect();
    if !tools.is_empty() {
        body["tools"] = Value::Array(tools);
    }

    body
}

fn generate_url(base_url: &str, model: &str) -> String {
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

fn build_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-goog-api-key",
        HeaderValue::from_str(api_key).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    headers.insert("accept", HeaderValue::from_static("application/json"));
    headers.insert("content-type", HeaderValue::from_static("application/json"));
    headers.insert("user-agent", HeaderValue::from_static(USER_AGENT));
    headers
}
