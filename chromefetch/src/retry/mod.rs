//! Bounded retry with exponential backoff.
//!
//! [`run_with_retry`] wraps any fallible async operation. The operation is
//! attempted once, then up to `max_retries` more times, sleeping an
//! exponentially growing delay between attempts. The wait is an async
//! suspension point; nothing blocks and nothing spins. When the budget is
//! exhausted the last error is returned unchanged, so callers can match on
//! the operation's own error type.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default exponential backoff base.
pub const DEFAULT_BACKOFF_BASE: f64 = 2.0;

/// Default initial backoff delay (100ms).
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 100;

/// How transient failures are retried.
///
/// The delay before retry attempt `k` (1-indexed) is
/// `initial_delay * backoff_base^k`, so with the defaults the waits are
/// 200ms, 400ms, 800ms, 1.6s, 3.2s.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    /// Zero means exactly one attempt.
    pub max_retries: u32,
    /// Multiplier base for exponential backoff. Must be >= 1.
    pub backoff_base: f64,
    /// Delay unit scaled by the backoff factor.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries: the operation runs exactly once.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff base.
    pub fn with_backoff_base(mut self, base: f64) -> Self {
        self.backoff_base = base.max(1.0);
        self
    }

    /// Set the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Delay to wait before retry attempt `attempt` (1-indexed).
    ///
    /// Sub-millisecond precision is kept so delays stay strictly
    /// increasing even for bases barely above 1.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.initial_delay
            .mul_f64(self.backoff_base.powi(attempt as i32))
    }
}

/// Run `op` until it succeeds or the retry budget is exhausted.
///
/// On terminal failure the last error is propagated unchanged.
pub async fn run_with_retry<T, E, F, Fut>(op: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    run_with_retry_when(op, policy, |_| true).await
}

/// Like [`run_with_retry`], but only errors for which `should_retry`
/// returns `true` consume retry budget; any other error is terminal on the
/// spot. Used to keep non-transient failures (e.g. the installer binary
/// missing entirely) from burning through a backoff schedule.
pub async fn run_with_retry_when<T, E, F, Fut, P>(
    mut op: F,
    policy: &RetryPolicy,
    mut should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: FnMut(&E) -> bool,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= policy.max_retries || !should_retry(&error) {
                    return Err(error);
                }
                let retry = attempt + 1;
                let delay = policy.delay_for_attempt(retry);
                warn!(
                    retry,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "attempt failed, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt = retry;
            }
        }
    }
}
