//! Retrying executor shared by every network call of the pipeline.
//!
//! Each attempt runs under its own child [`CancellationToken`]; the token is
//! cancelled as soon as the attempt fails, before any backoff sleep, so a
//! failed request is never left running next to its retry.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// `step × n` after the n-th failed attempt.
    Linear { step: Duration },
    /// `initial × factor^(n-1)`, capped at `max`.
    Exponential {
        initial: Duration,
        factor: f64,
        max: Duration,
    },
}

impl Backoff {
    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match *self {
            Self::Linear { step } => step.saturating_mul(attempt.max(1)),
            Self::Exponential {
                initial,
                factor,
                max,
            } => {
                let exp = attempt.saturating_sub(1).min(63) as i32;
                let secs = initial.as_secs_f64() * factor.powi(exp);
                if secs.is_nan() {
                    return Duration::ZERO;
                }
                Duration::from_secs_f64(secs.clamp(0.0, max.as_secs_f64()))
            }
        }
    }
}

/// Retry budget and pacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    /// Three attempts, waiting 1 s then 2 s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Linear {
                step: Duration::from_millis(1000),
            },
        }
    }
}

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RetryError<E> {
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// The error was not retryable; no further attempts were made.
    #[error("{0}")]
    Rejected(E),

    #[error("cancelled")]
    Cancelled,
}

impl<E> RetryError<E> {
    /// The last error returned by the operation, if any.
    pub fn last_error(&self) -> Option<&E> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Rejected(e) => Some(e),
            Self::Cancelled => None,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `op` until it succeeds, returns a non-retryable error, exhausts the
    /// attempt budget, or `cancel` fires.
    ///
    /// `op` receives the attempt number (1-based) and the attempt's token.
    pub async fn run<T, E, F, Fut, P>(
        &self,
        cancel: &CancellationToken,
        should_retry: P,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(u32, CancellationToken) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            let token = cancel.child_token();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    token.cancel();
                    return Err(RetryError::Cancelled);
                }
                r = op(attempt, token.clone()) => r,
            };

            let err = match result {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            token.cancel();

            if !should_retry(&err) {
                return Err(RetryError::Rejected(err));
            }
            if attempt >= max_attempts {
                return Err(RetryError::Exhausted {
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = self.backoff.delay_for_attempt(attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying after failure");

            tokio::select! {
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
