//! Text-generation providers.
//!
//! A provider is a single synchronous request/response call. The engine
//! never sees vendor wire formats; it hands over a [`GenerationRequest`] and
//! gets back generated text or an error.

use crate::config::{Config, ProviderKind, ResolvedProvider};
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Per-attempt timeout when a provider does not declare its own.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One call to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Persona, tone and language instruction
    pub system: String,
    /// Kind-specific instruction with caller context
    pub user: String,
    /// Output length budget
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// Text-generation interface.
pub trait TextProvider: Send + Sync {
    /// Stable identifier used for statistics and ordering.
    fn name(&self) -> &str;

    /// Upper bound for one attempt. Answers that arrive later count as failures.
    fn timeout(&self) -> Duration {
        Duration::from_secs(DEFAULT_TIMEOUT_SECS)
    }

    /// Generate text. Errors cover network failures, non-success status,
    /// timeouts and responses without a text field.
    fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Create HTTP providers for every configured credential, in fixed priority order.
pub fn configured_providers(config: &Config) -> Result<Vec<Arc<dyn TextProvider>>> {
    let resolved = config.resolve_providers(|name| std::env::var(name).ok());
    let mut providers: Vec<Arc<dyn TextProvider>> = Vec::with_capacity(resolved.len());
    for entry in resolved {
        tracing::info!(
            provider = entry.kind.as_str(),
            model = %entry.model,
            timeout_secs = entry.timeout_secs,
            "Configured text provider"
        );
        providers.push(Arc::new(HttpTextProvider::new(entry)?));
    }
    Ok(providers)
}

/// HTTP-backed provider covering the supported vendor formats.
pub struct HttpTextProvider {
    kind: ProviderKind,
    model: String,
    endpoint: String,
    api_key: String,
    timeout: Duration,
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
}

impl HttpTextProvider {
    pub fn new(config: ResolvedProvider) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("failed to build tokio runtime: {e}")))?;
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            kind: config.kind,
            model: config.model,
            endpoint: config.endpoint,
            api_key: config.api_key,
            timeout,
            runtime,
            http,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| Error::Config(format!("invalid {} api key header: {e}", self.kind)))?,
        );
        Ok(headers)
    }

    fn unavailable(&self, message: String) -> Error {
        Error::ProviderUnavailable {
            provider: self.kind.as_str().to_string(),
            message,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::ProviderTimeout {
                provider: self.kind.as_str().to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            self.unavailable(format!("request failed: {e}"))
        }
    }
}

impl TextProvider for HttpTextProvider {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let url = request_url(self.kind, &self.endpoint);
        let body = request_body(self.kind, &self.model, request);
        let headers = self.headers()?;

        self.runtime.block_on(async {
            let resp = self
                .http
                .post(url)
                .headers(headers)
                .json(&body)
                .send()
                .await
                .map_err(|e| self.map_send_error(e))?;
            let status = resp.status();
            let text = resp
                .text()
                .await
                .map_err(|e| self.map_send_error(e))?;
            if !status.is_success() {
                return Err(self.unavailable(format!(
                    "returned {}: {}",
                    status.as_u16(),
                    text
                )));
            }
            let json: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| Error::MalformedOutput(format!("{} body is not JSON: {e}", self.kind)))?;
            extract_text(self.kind, &json)
        })
    }
}

/// Endpoint URL for a provider.
pub fn request_url(kind: ProviderKind, endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    match kind {
        ProviderKind::Groq | ProviderKind::DeepSeek | ProviderKind::OpenAI => {
            format!("{base}/chat/completions")
        }
        ProviderKind::HuggingFace => base.to_string(),
        ProviderKind::Cohere => format!("{base}/generate"),
    }
}

/// JSON request body for a provider.
pub fn request_body(
    kind: ProviderKind,
    model: &str,
    request: &GenerationRequest,
) -> serde_json::Value {
    match kind {
        ProviderKind::Groq | ProviderKind::DeepSeek | ProviderKind::OpenAI => json!({
            "model": model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        }),
        ProviderKind::HuggingFace => json!({
            "inputs": format!("{}\n\n{}", request.system, request.user),
            "parameters": {
                "max_new_tokens": request.max_tokens,
                "temperature": request.temperature,
                "return_full_text": false,
            },
        }),
        ProviderKind::Cohere => json!({
            "model": model,
            "prompt": format!("{}\n\n{}", request.system, request.user),
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        }),
    }
}

/// Pull the generated text out of a provider response.
pub fn extract_text(kind: ProviderKind, json: &serde_json::Value) -> Result<String> {
    let text = match kind {
        ProviderKind::Groq | ProviderKind::DeepSeek | ProviderKind::OpenAI => json
            .get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str()),
        ProviderKind::HuggingFace => json
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|v| v.get("generated_text"))
            .and_then(|v| v.as_str()),
        ProviderKind::Cohere => json
            .get("generations")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|v| v.get("text"))
            .and_then(|v| v.as_str()),
    };

    text.map(ToString::to_string).ok_or_else(|| {
        Error::MalformedOutput(format!("{} response missing generated text", kind))
    })
}
