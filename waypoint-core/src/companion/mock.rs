//! Scripted provider for deterministic tests without network access.

use super::provider::{GenerationRequest, TextProvider, DEFAULT_TIMEOUT_SECS};
use crate::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Pre-programmed answer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this text.
    Text(String),
    /// Fail as an unreachable provider.
    Unavailable(String),
    /// Fail as a provider that hit its timeout.
    Timeout,
    /// Sleep, then produce the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn text(text: &str) -> Self {
        Self::Text(text.to_string())
    }

    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Provider that replays responses in order and repeats the last one.
pub struct ScriptedProvider {
    name: String,
    timeout: Duration,
    responses: Vec<MockResponse>,
    call_count: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl ScriptedProvider {
    pub fn new(name: &str, responses: Vec<MockResponse>) -> Self {
        Self {
            name: name.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            responses,
            call_count: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Always answers `text`.
    pub fn text(name: &str, text: &str) -> Self {
        Self::new(name, vec![MockResponse::text(text)])
    }

    /// Always unavailable.
    pub fn failing(name: &str) -> Self {
        Self::new(name, vec![MockResponse::Unavailable("connection refused".to_string())])
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }

    fn play(&self, response: &MockResponse) -> Result<String> {
        match response {
            MockResponse::Text(text) => Ok(text.clone()),
            MockResponse::Unavailable(message) => Err(Error::ProviderUnavailable {
                provider: self.name.clone(),
                message: message.clone(),
            }),
            MockResponse::Timeout => Err(Error::ProviderTimeout {
                provider: self.name.clone(),
                timeout_secs: self.timeout.as_secs(),
            }),
            MockResponse::Delay(delay, inner) => {
                std::thread::sleep(*delay);
                self.play(inner)
            }
        }
    }
}

impl TextProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let index = self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        let response = self
            .responses
            .get(index)
            .or_else(|| self.responses.last())
            .ok_or_else(|| Error::ProviderUnavailable {
                provider: self.name.clone(),
                message: "no scripted responses".to_string(),
            })?;
        self.play(response)
    }
}
