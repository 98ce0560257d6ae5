//! Bounded retry with exponential backoff for catalog fetches.
//!
//! The policy is injected into the baseline builder rather than hard-coded
//! at the call site, so tests can shrink the delays and exercise exhaustion
//! without waiting on real backoff sleeps.

use std::thread;
use std::time::Duration;

use log::debug;

/// Retry schedule: up to `max_attempts` tries, sleeping
/// `base_delay * 2^(attempt-1)` between consecutive tries.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// 10 attempts starting at 0.5 s, doubling each time.
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Failure report after the policy ran out of attempts (or hit a
/// non-retryable error).
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

impl RetryPolicy {
    /// Backoff to sleep after the given 1-based attempt.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }

    /// Run `op` under this policy.
    ///
    /// Arguments
    /// -----------------
    /// * `is_retryable`: predicate deciding whether a given error is worth
    ///   another attempt.
    /// * `op`: the fallible operation.
    ///
    /// Return
    /// ----------
    /// * The first success, or [`RetryExhausted`] carrying the attempt
    ///   count and the last error. Non-retryable errors abort immediately
    ///   with `attempts == 1`.
    pub fn run<T, E>(
        &self,
        is_retryable: impl Fn(&E) -> bool,
        mut op: impl FnMut() -> Result<T, E>,
    ) -> Result<T, RetryExhausted<E>> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op() {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && is_retryable(&error) => {
                    let delay = self.backoff(attempt);
                    debug!("attempt {attempt} failed, backing off {delay:?}");
                    thread::sleep(delay);
                }
                Err(error) => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last: error,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod retry_test {
    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0u32;
        let result = fast_policy(5).run(
            |_: &&str| true,
            || {
                calls += 1;
                if calls < 3 {
                    Err("transient")
                } else {
                    Ok(calls)
                }
            },
        );
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_retryable_failures_exhaust_the_budget() {
        let mut calls = 0u32;
        let result: Result<(), _> = fast_policy(4).run(
            |_: &&str| true,
            || {
                calls += 1;
                Err("transient")
            },
        );
        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 4);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_non_retryable_error_aborts_on_first_attempt() {
        let mut calls = 0u32;
        let result: Result<(), _> = fast_policy(10).run(
            |_: &&str| false,
            || {
                calls += 1;
                Err("fatal")
            },
        );
        let exhausted = result.unwrap_err();
        assert_eq!(exhausted.attempts, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(500),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_millis(1000));
        assert_eq!(policy.backoff(4), Duration::from_millis(4000));
    }
}
