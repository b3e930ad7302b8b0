//! Scripted generation service for deterministic tests
//!
//! Replies are consumed from a queue in order; once the queue is empty every
//! further call gets the fallback reply. Every call is recorded together
//! with the (tokio) instant it was made, so tests running on a paused clock
//! can assert exact backoff delays.

use crate::LlmError;
use async_trait::async_trait;
use catalogue_domain::traits::GenerationService;
use catalogue_domain::{GenerationRequest, GenerationResponse, TokenUsage};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Default model name reported by the mock
pub const MOCK_MODEL: &str = "mock-model";

/// One scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Return this structured value
    Structured(Value),
    /// Return a response carrying no structured value
    Empty,
    /// Fail with this error
    Fail(LlmError),
}

/// A call observed by the mock
#[derive(Debug, Clone)]
pub struct MockCall {
    /// The request as received
    pub request: GenerationRequest,
    /// When the call was made
    pub at: Instant,
}

/// Mock provider for deterministic testing
///
/// Clones share the script and the call log.
///
/// # Examples
///
/// ```
/// use catalogue_llm::{LlmError, MockProvider};
/// use serde_json::json;
///
/// // Two rate limits, then a record
/// let provider = MockProvider::returning(json!({"model_name": "gpt-4"}))
///     .fail_times(2, LlmError::RateLimited("slow down".into()));
/// assert_eq!(provider.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<MockReply>>>,
    fallback: MockReply,
    usage: TokenUsage,
    model: String,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockProvider {
    /// Create a mock that answers every call with `fallback`
    pub fn new(fallback: MockReply) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            usage: TokenUsage {
                input_tokens: 500,
                output_tokens: 150,
                ..Default::default()
            },
            model: MOCK_MODEL.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always return the given structured value
    pub fn returning(value: Value) -> Self {
        Self::new(MockReply::Structured(value))
    }

    /// Always return a response without a structured value
    pub fn empty() -> Self {
        Self::new(MockReply::Empty)
    }

    /// Always fail with the given error
    pub fn failing(error: LlmError) -> Self {
        Self::new(MockReply::Fail(error))
    }

    /// Queue `times` failures ahead of whatever is already scripted
    pub fn fail_times(self, times: usize, error: LlmError) -> Self {
        {
            let mut script = lock(&self.script);
            for _ in 0..times {
                script.push_front(MockReply::Fail(error.clone()));
            }
        }
        self
    }

    /// Append a reply to the script
    pub fn push_reply(&self, reply: MockReply) {
        lock(&self.script).push_back(reply);
    }

    /// Report this usage on every successful call
    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// Report this model name on every successful call
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Snapshot of every call made so far
    pub fn calls(&self) -> Vec<MockCall> {
        lock(&self.calls).clone()
    }

    /// Elapsed time between consecutive calls
    pub fn gaps(&self) -> Vec<Duration> {
        let calls = lock(&self.calls);
        calls
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl GenerationService for MockProvider {
    type Error = LlmError;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, Self::Error> {
        lock(&self.calls).push(MockCall {
            request: request.clone(),
            at: Instant::now(),
        });

        let reply = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match reply {
            MockReply::Structured(value) => Ok(GenerationResponse {
                structured: Some(value),
                usage: self.usage,
                model: self.model.clone(),
            }),
            MockReply::Empty => Ok(GenerationResponse {
                structured: None,
                usage: self.usage,
                model: self.model.clone(),
            }),
            MockReply::Fail(error) => Err(error),
        }
    }
}
