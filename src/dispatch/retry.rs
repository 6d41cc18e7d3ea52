//! Retry and backoff decisions for a single delivery target.
//!
//! The policy is a pure function of the error class and the number of
//! attempts already made. It never sleeps; the batch sender performs the
//! waits it asks for.

use std::time::Duration;

use crate::config::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DispatchConfig};
use crate::error::DeliveryError;

/// Classification of a failed delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The remote side asked for a pause of the given length.
    RateLimited {
        /// Server-requested delay.
        retry_after: Duration,
    },
    /// Retryable with backoff.
    Transient,
    /// Not retryable.
    Permanent,
    /// Cancellation was observed.
    Cancelled,
}

impl From<&DeliveryError> for ErrorClass {
    fn from(error: &DeliveryError) -> Self {
        match error {
            DeliveryError::RateLimited { retry_after } => ErrorClass::RateLimited {
                retry_after: *retry_after,
            },
            DeliveryError::Transient { .. } => ErrorClass::Transient,
            DeliveryError::Permanent { .. } => ErrorClass::Permanent,
            DeliveryError::Cancelled => ErrorClass::Cancelled,
        }
    }
}

/// Which kind of wait a retry requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitKind {
    /// Exponential backoff after a transient failure.
    Backoff,
    /// Server-specified pause after a rate limit.
    RateLimit,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait, then attempt again.
    RetryAfter {
        /// How long to wait.
        delay: Duration,
        /// Why the wait is needed.
        kind: WaitKind,
    },
    /// Give up: retryable failures exhausted the attempt budget.
    FailTransient {
        /// True if the last failure was a rate limit.
        rate_limited: bool,
    },
    /// Give up: the failure is not retryable.
    FailPermanent,
    /// Give up: cancellation was observed.
    Cancelled,
}

/// Bounded retry with exponential backoff.
///
/// Attempt `n` failing transiently waits `base_delay * 2^(n-1)` before attempt
/// `n + 1`. Rate-limited attempts wait the server's delay instead, but count
/// toward the same attempt budget.
///
/// # Example
///
/// ```
/// use payroll_engine::dispatch::{ErrorClass, RetryDecision, RetryPolicy, WaitKind};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(
///     policy.decide(ErrorClass::Transient, 2),
///     RetryDecision::RetryAfter { delay: Duration::from_millis(400), kind: WaitKind::Backoff }
/// );
/// assert_eq!(
///     policy.decide(ErrorClass::Transient, 3),
///     RetryDecision::FailTransient { rate_limited: false }
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A budget of zero attempts is raised to one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Total attempts allowed per target.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The wait before the second attempt.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Backoff after the given (1-based) failed attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Decides what follows a failed attempt.
    ///
    /// `attempt` is the number of attempts made so far, including the one
    /// that just failed.
    pub fn decide(&self, class: ErrorClass, attempt: u32) -> RetryDecision {
        let budget_left = attempt < self.max_attempts;
        match class {
            ErrorClass::Cancelled => RetryDecision::Cancelled,
            ErrorClass::Permanent => RetryDecision::FailPermanent,
            ErrorClass::Transient if budget_left => RetryDecision::RetryAfter {
                delay: self.backoff_delay(attempt),
                kind: WaitKind::Backoff,
            },
            ErrorClass::Transient => RetryDecision::FailTransient {
                rate_limited: false,
            },
            ErrorClass::RateLimited { retry_after } if budget_left => RetryDecision::RetryAfter {
                delay: retry_after,
                kind: WaitKind::RateLimit,
            },
            ErrorClass::RateLimited { .. } => RetryDecision::FailTransient { rate_limited: true },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        )
    }
}

impl From<&DispatchConfig> for RetryPolicy {
    fn from(config: &DispatchConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_backoff_doubles_from_base() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), millis(200));
        assert_eq!(policy.backoff_delay(2), millis(400));
        assert_eq!(policy.backoff_delay(3), millis(800));
    }

    #[test]
    fn test_backoff_saturates_on_huge_attempt() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(u64::MAX / 2));
        assert_eq!(policy.backoff_delay(100), Duration::MAX);
    }

    #[test]
    fn test_transient_retries_until_budget() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(ErrorClass::Transient, 1),
            RetryDecision::RetryAfter {
                delay: millis(200),
                kind: WaitKind::Backoff
            }
        );
        assert_eq!(
            policy.decide(ErrorClass::Transient, 2),
            RetryDecision::RetryAfter {
                delay: millis(400),
                kind: WaitKind::Backoff
            }
        );
        assert_eq!(
            policy.decide(ErrorClass::Transient, 3),
            RetryDecision::FailTransient {
                rate_limited: false
            }
        );
    }

    #[test]
    fn test_permanent_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.decide(ErrorClass::Permanent, 1),
            RetryDecision::FailPermanent
        );
    }

    #[test]
    fn test_cancelled_wins_at_any_attempt() {
        let policy = RetryPolicy::default();
        for attempt in 1..=5 {
            assert_eq!(
                policy.decide(ErrorClass::Cancelled, attempt),
                RetryDecision::Cancelled
            );
        }
    }

    #[test]
    fn test_rate_limit_waits_server_delay() {
        let policy = RetryPolicy::default();
        let class = ErrorClass::RateLimited {
            retry_after: millis(1500),
        };
        assert_eq!(
            policy.decide(class, 1),
            RetryDecision::RetryAfter {
                delay: millis(1500),
                kind: WaitKind::RateLimit
            }
        );
    }

    #[test]
    fn test_rate_limit_exhaustion_folds_into_transient() {
        let policy = RetryPolicy::default();
        let class = ErrorClass::RateLimited {
            retry_after: millis(50),
        };
        assert_eq!(
            policy.decide(class, 3),
            RetryDecision::FailTransient { rate_limited: true }
        );
    }

    #[test]
    fn test_zero_budget_is_raised_to_one() {
        let policy = RetryPolicy::new(0, millis(10));
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(
            policy.decide(ErrorClass::Transient, 1),
            RetryDecision::FailTransient {
                rate_limited: false
            }
        );
    }

    #[test]
    fn test_policy_from_config() {
        let config = DispatchConfig {
            max_attempts: 5,
            base_delay_ms: 50,
            ..DispatchConfig::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.base_delay(), millis(50));
    }

    #[test]
    fn test_error_class_from_delivery_error() {
        assert_eq!(
            ErrorClass::from(&DeliveryError::Transient {
                message: "503".to_string()
            }),
            ErrorClass::Transient
        );
        assert_eq!(
            ErrorClass::from(&DeliveryError::Cancelled),
            ErrorClass::Cancelled
        );
        assert_eq!(
            ErrorClass::from(&DeliveryError::RateLimited {
                retry_after: millis(10)
            }),
            ErrorClass::RateLimited {
                retry_after: millis(10)
            }
        );
    }
}
