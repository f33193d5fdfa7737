//! Retry with exponential back-off and jitter for text-generation calls.

use std::future::Future;
use std::time::Duration;

use topicdigest_core::AppConfig;

use crate::error::LlmError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Timeouts, connect failures, 429, 5xx and empty completions are transient.
/// Other statuses and malformed bodies are returned immediately.
pub(crate) fn is_retriable(err: &LlmError) -> bool {
    match err {
        LlmError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        LlmError::UnexpectedStatus { status, .. } => *status >= 500,
        LlmError::RateLimited | LlmError::EmptyResponse => true,
        LlmError::Deserialize { .. } => false,
    }
}

/// How often and how patiently a call is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl From<&AppConfig> for RetryPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_retries: config.llm_max_retries,
            backoff_base_ms: config.llm_backoff_base_ms,
            ..Self::default()
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based), before jitter.
    #[must_use]
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let computed = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
        computed.min(self.max_delay_ms)
    }

    /// Runs `operation`, retrying transient errors up to `max_retries` times.
    ///
    /// With `backoff_base_ms = 1_000` the sleeps are 1 s, 2 s, 4 s … each
    /// scaled by a random factor in `[0.75, 1.25)` and capped at
    /// `max_delay_ms`.
    ///
    /// # Errors
    ///
    /// Returns the last error once retries are exhausted, or the first
    /// non-transient error.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let mut attempt = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !is_retriable(&err) || attempt >= self.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let capped = self.base_delay_ms(attempt);
                    #[allow(
                        clippy::cast_possible_truncation,
                        clippy::cast_sign_loss,
                        clippy::cast_precision_loss
                    )]
                    let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms,
                        error = %err,
                        "text generation transient error; retrying after back-off"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}
