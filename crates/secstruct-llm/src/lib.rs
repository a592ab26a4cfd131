//! secstruct Model Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `secstruct-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing, with scripted response
//!   sequences so retry loops can be exercised without a network
//! - `GeminiProvider`: Google Generative Language API integration
//!
//! # Examples
//!
//! ```
//! use secstruct_llm::MockProvider;
//! use secstruct_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("{\"processing_status\": \"completed\"}");
//! let result = provider.generate("any prompt").unwrap();
//! assert!(result.contains("completed"));
//! ```

#![warn(missing_docs)]

pub mod gemini;

use secstruct_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiProvider;

/// Errors that can occur during model operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the model
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Quota or rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("Model error: {0}")]
    Other(String),
}

/// Mock model provider for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Beyond a fixed default and per-prompt responses, a scripted FIFO queue
/// lets tests drive multi-attempt flows (e.g. malformed JSON on the first
/// call, a valid payload on the second) the way the retry loop sees them.
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    scripted: Arc<Mutex<VecDeque<Result<String, String>>>>,
    always_fail: bool,
    call_count: Arc<Mutex<usize>>,
}

impl MockProvider {
    /// Create a provider that returns a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            always_fail: false,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Create a provider whose every call fails with a communication error
    pub fn always_failing() -> Self {
        Self {
            always_fail: true,
            ..Self::new("")
        }
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(prompt.into(), response.into());
    }

    /// Queue a response to be returned by the next unscripted call.
    ///
    /// Scripted responses take priority over per-prompt and default
    /// responses and are consumed in FIFO order.
    pub fn push_response(&self, response: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
    }

    /// Queue an error to be returned by the next call
    pub fn push_error(&self, message: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Err(message.into()));
    }

    /// Number of times `generate` was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap() = 0;
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        *self.call_count.lock().unwrap() += 1;

        if self.always_fail {
            return Err(LlmError::Communication("mock transport failure".to_string()));
        }

        if let Some(scripted) = self.scripted.lock().unwrap().pop_front() {
            return scripted.map_err(LlmError::Communication);
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(prompt) {
            return Ok(response.clone());
        }

        Ok(self.default_response.clone())
    }
}
