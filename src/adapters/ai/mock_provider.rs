//! Mock Question Provider for testing.
//!
//! Provides a configurable mock implementation of the QuestionProvider port,
//! allowing tests to run without calling the real generative-text API.
//!
//! # Features
//!
//! - Pre-configured raw text responses
//! - Simulated delays for concurrency testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//! - Toggleable configuration state
//!
//! # Example
//!
//! ```ignore
//! let provider = MockQuestionProvider::new()
//!     .with_response(r#"[{"id":"mfg_1","question":"Where?","type":"text","required":true}]"#)
//!     .with_delay(Duration::from_millis(100));
//!
//! let text = provider.generate_text("prompt").await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ProviderError, ProviderInfo, QuestionProvider};

/// Text returned once the scripted queue is exhausted.
pub const EXHAUSTED_RESPONSE: &str = "[]";

/// Mock question provider for testing.
///
/// Clones share the response queue, call log and configuration flag, so a
/// test can keep a handle after moving the provider into a service.
#[derive(Debug, Clone)]
pub struct MockQuestionProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Prompts received, in call order.
    calls: Arc<Mutex<Vec<String>>>,
    configured: Arc<AtomicBool>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return raw text.
    Text(String),
    /// Return an error.
    Error(ProviderError),
}

impl Default for MockQuestionProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockQuestionProvider {
    /// Creates a configured mock provider with an empty queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            configured: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Creates a mock that reports no credential.
    pub fn unconfigured() -> Self {
        let provider = Self::new();
        provider.set_configured(false);
        provider
    }

    /// Adds a raw text response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Text(content.into()));
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: ProviderError) -> Self {
        self.push(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Queues a response on a shared handle.
    pub fn push(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    /// Flips the configuration flag seen by `is_configured`.
    pub fn set_configured(&self, configured: bool) {
        self.configured.store(configured, Ordering::SeqCst);
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded prompts.
    pub fn get_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Text(EXHAUSTED_RESPONSE.to_string()))
    }
}

#[async_trait]
impl QuestionProvider for MockQuestionProvider {
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        lock(&self.calls).push(prompt.to_string());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Text(content) => Ok(content),
            MockResponse::Error(err) => Err(err),
        }
    }

    fn is_configured(&self) -> bool {
        self.configured.load(Ordering::SeqCst)
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
