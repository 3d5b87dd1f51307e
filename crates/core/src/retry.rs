#[cfg(any(test, feature = "test-support"))]
use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(10);

/// Fixed-delay retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_BACKOFF,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Blocking wait, abstracted so batch logic can be driven without real time.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Records requested waits instead of sleeping.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: RefCell<Vec<Duration>>,
}

#[cfg(any(test, feature = "test-support"))]
impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.borrow().clone()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.waits.borrow_mut().push(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retried<T> {
    pub value: T,
    pub attempts: u32,
}

/// Calls `op` until it yields a value `is_retriable` rejects, or until the
/// attempt budget is spent, waiting `policy.delay` between attempts.
///
/// The last value is returned either way; callers decide what an exhausted
/// retriable value means. There is no wait after the final attempt.
pub fn retry_with_backoff<T, F, P, S>(
    policy: &RetryPolicy,
    sleeper: &S,
    is_retriable: P,
    mut op: F,
) -> Retried<T>
where
    F: FnMut(u32) -> T,
    P: Fn(&T) -> bool,
    S: Sleeper + ?Sized,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let value = op(attempt);
        if !is_retriable(&value) || attempt >= max_attempts {
            return Retried {
                value,
                attempts: attempt,
            };
        }
        debug!(attempt, max_attempts, delay = ?policy.delay, "retriable failure, backing off");
        sleeper.sleep(policy.delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_secs(10))
    }

    #[test]
    fn first_success_returns_without_waiting() {
        let sleeper = RecordingSleeper::new();
        let out = retry_with_backoff(&policy(5), &sleeper, |v: &bool| !*v, |_| true);
        assert_eq!(out, Retried { value: true, attempts: 1 });
        assert!(sleeper.waits().is_empty());
    }

    #[test]
    fn retries_until_success() {
        let sleeper = RecordingSleeper::new();
        let out = retry_with_backoff(&policy(5), &sleeper, |v: &u32| *v < 3, |attempt| attempt);
        assert_eq!(out.value, 3);
        assert_eq!(out.attempts, 3);
        assert_eq!(sleeper.waits(), vec![Duration::from_secs(10); 2]);
    }

    #[test]
    fn exhausts_budget_and_returns_last_value() {
        let sleeper = RecordingSleeper::new();
        let mut calls = 0;
        let out = retry_with_backoff(
            &policy(4),
            &sleeper,
            |_: &&str| true,
            |_| {
                calls += 1;
                "busy"
            },
        );
        assert_eq!(calls, 4);
        assert_eq!(out.attempts, 4);
        assert_eq!(sleeper.waits().len(), 3);
    }

    #[test]
    fn zero_budget_still_attempts_once() {
        let sleeper = RecordingSleeper::new();
        let out = retry_with_backoff(&policy(0), &sleeper, |_: &()| true, |_| ());
        assert_eq!(out.attempts, 1);
        assert!(sleeper.waits().is_empty());
    }
}
