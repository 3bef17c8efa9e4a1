//! Bounded exponential backoff around any [`Transport`]

use super::transport::{ApiRequest, ApiResponse, Method, Transport};
use crate::error::HttpError;
use std::time::Duration;
use tracing::{debug, warn};

/// Statuses that indicate transience rather than a bad request
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per retry
    pub backoff_factor: Duration,
    /// Upper bound on any single delay
    pub max_backoff: Duration,
    /// Statuses that trigger a retry
    pub retry_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            backoff_factor: Duration::from_secs(2),
            max_backoff: Duration::from_secs(120),
            retry_statuses: RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits between attempts
    #[inline]
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_factor: Duration::ZERO,
            ..Self::default()
        }
    }

    /// With attempt budget (at least one)
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// With backoff factor
    #[inline]
    #[must_use]
    pub fn with_backoff_factor(mut self, factor: Duration) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Whether a status should be retried
    #[inline]
    #[must_use]
    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Whether a failed send may be repeated
    ///
    /// A request that was sent but interrupted may already have been applied,
    /// so it is only repeated when the method is idempotent.
    #[inline]
    #[must_use]
    pub fn is_retryable_error(&self, error: &HttpError, method: Method) -> bool {
        error.is_transient() || (error.is_interrupted() && method.is_idempotent())
    }

    /// Delay before retry number `retry` (1-based)
    ///
    /// `backoff_factor * 2^(retry - 1)`, capped at `max_backoff`. A server
    /// supplied `Retry-After` replaces the computed value but is still capped.
    #[must_use]
    pub fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        let computed = 2u32
            .checked_pow(retry.saturating_sub(1))
            .and_then(|multiplier| self.backoff_factor.checked_mul(multiplier))
            .unwrap_or(self.max_backoff);

        retry_after.unwrap_or(computed).min(self.max_backoff)
    }
}

/// HTTP client that applies a [`RetryPolicy`] to every request
pub struct RetryingClient {
    transport: Box<dyn Transport>,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryingClient {
    /// Wrap a transport
    #[must_use]
    pub fn new(transport: impl Transport + 'static, policy: RetryPolicy) -> Self {
        Self {
            transport: Box::new(transport),
            policy,
        }
    }

    /// Policy in effect
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Execute a request, retrying transient failures
    ///
    /// Terminal responses are returned whatever their status; the caller
    /// inspects it. When the budget runs out on a retryable status the last
    /// response is returned as-is.
    ///
    /// # Errors
    /// - `HttpError::RetriesExhausted` if every attempt failed in transport
    /// - `HttpError::Interrupted` immediately for POST and PATCH
    /// - other non-transient errors immediately
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        let mut attempt: u32 = 1;

        loop {
            let outcome = self.transport.send(request.clone()).await;
            let exhausted = attempt >= self.policy.max_attempts;
            let repeatable = matches!(
                &outcome,
                Err(error) if self.policy.is_retryable_error(error, request.method)
            );

            let delay = match outcome {
                Ok(response) if !exhausted && self.policy.is_retryable_status(response.status) => {
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        status = response.status,
                        attempt,
                        "retryable status"
                    );
                    self.policy.delay_for(attempt, response.retry_after)
                }
                Ok(response) => {
                    if exhausted && self.policy.is_retryable_status(response.status) {
                        warn!(
                            method = %request.method,
                            url = %request.url,
                            status = response.status,
                            attempts = attempt,
                            "retries exhausted"
                        );
                    }
                    return Ok(response);
                }
                Err(error) if repeatable && !exhausted => {
                    debug!(
                        method = %request.method,
                        url = %request.url,
                        attempt,
                        error = %error,
                        "transport failure"
                    );
                    self.policy.delay_for(attempt, None)
                }
                Err(error) if repeatable => {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        attempts = attempt,
                        error = %error,
                        "retries exhausted"
                    );
                    return Err(HttpError::RetriesExhausted {
                        attempts: attempt,
                        last: error.to_string(),
                    });
                }
                Err(error) => return Err(error),
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }
}
