//! Bounded connection retry
//!
//! Both the broker session and the database handle are established through
//! [`connect_with_retry`]: up to `max_attempts` tries, every try after the
//! first preceded by the same fixed delay. There is no exponential backoff and
//! no jitter.
//!
//! The dial closure owns everything it acquires during an attempt. When it
//! returns an error, whatever it had opened so far is dropped before the next
//! attempt starts, so a failed attempt never leaks a half-built handle.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::RosterError;

/// Default number of connection attempts
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay before every attempt after the first, in seconds
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
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

    /// Load the policy from the environment
    ///
    /// Environment variables:
    /// - `ROSTER_CONNECT_ATTEMPTS`: total attempts (default 5)
    /// - `ROSTER_CONNECT_DELAY_SECS`: delay between attempts (default 5)
    pub fn from_env() -> Result<Self, RosterError> {
        let max_attempts = match std::env::var("ROSTER_CONNECT_ATTEMPTS") {
            Ok(value) => value.parse().map_err(|_| {
                RosterError::config(format!("ROSTER_CONNECT_ATTEMPTS is not a number: {}", value))
            })?,
            Err(_) => DEFAULT_MAX_ATTEMPTS,
        };

        let delay_secs = match std::env::var("ROSTER_CONNECT_DELAY_SECS") {
            Ok(value) => value.parse().map_err(|_| {
                RosterError::config(format!("ROSTER_CONNECT_DELAY_SECS is not a number: {}", value))
            })?,
            Err(_) => DEFAULT_RETRY_DELAY_SECS,
        };

        let policy = Self::new(max_attempts, Duration::from_secs(delay_secs));
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), RosterError> {
        if self.max_attempts == 0 {
            return Err(RosterError::config("connection attempts must be greater than 0"));
        }
        Ok(())
    }
}

/// Terminal failure: every attempt failed
#[derive(Error, Debug)]
#[error("failed to connect to {resource} after {attempts} attempts: {source}")]
pub struct RetryError<E> {
    pub resource: String,
    pub attempts: u32,
    #[source]
    pub source: E,
}

/// Run `dial` until it succeeds or the attempt budget is spent.
///
/// `dial` receives the 1-based attempt number. The error of the final attempt
/// is returned inside [`RetryError`].
pub async fn connect_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    resource: &str,
    mut dial: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        if attempt > 1 {
            tokio::time::sleep(policy.delay).await;
        }

        match dial(attempt).await {
            Ok(handle) => {
                info!(resource, attempt, "Connection established");
                return Ok(handle);
            },
            Err(e) if attempt < max_attempts => {
                warn!(
                    resource,
                    attempt,
                    max_attempts,
                    delay_secs = policy.delay.as_secs(),
                    error = %e,
                    "Connection attempt failed, retrying"
                );
                attempt += 1;
            },
            Err(e) => {
                error!(resource, attempts = attempt, error = %e, "Giving up on connection");
                return Err(RetryError {
                    resource: resource.to_string(),
                    attempts: attempt,
                    source: e,
                });
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    /// Counts live instances so tests can check that failed attempts release what they opened
    struct Tracked(Arc<AtomicU32>);

    impl Tracked {
        fn open(live: &Arc<AtomicU32>) -> Self {
            live.fetch_add(1, Ordering::SeqCst);
            Self(live.clone())
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_has_no_delay() {
        let start = Instant::now();
        let result: Result<u32, RetryError<String>> =
            connect_with_retry(&RetryPolicy::default(), "broker", |attempt| async move {
                Ok(attempt)
            })
            .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_fifth_attempt_after_four_delays() {
        let start = Instant::now();
        let result = connect_with_retry(&RetryPolicy::default(), "broker", |attempt| async move {
            if attempt < 5 {
                Err(format!("connection refused ({})", attempt))
            } else {
                Ok("channel")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "channel");
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        let result: Result<(), _> = connect_with_retry(&RetryPolicy::default(), "database", |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>("unreachable")
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 5);
        assert_eq!(err.resource, "database");
        assert_eq!(err.source, "unreachable");
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_attempts_release_partial_handles() {
        let live = Arc::new(AtomicU32::new(0));

        let result: Result<Tracked, _> = connect_with_retry(&RetryPolicy::default(), "broker", |_| {
            let live = live.clone();
            async move {
                // Connection opens, channel fails
                let _connection = Tracked::open(&live);
                Err::<Tracked, _>("channel open failed")
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_dials_once() {
        let policy = RetryPolicy::new(0, Duration::from_secs(5));
        let result: Result<(), _> =
            connect_with_retry(&policy, "broker", |_| async { Err::<(), _>("down") }).await;
        assert_eq!(result.unwrap_err().attempts, 1);
    }

    #[test]
    fn test_retry_error_converts_to_roster_error() {
        let err = RetryError {
            resource: "broker".to_string(),
            attempts: 5,
            source: "refused",
        };
        let converted: RosterError = err.into();
        assert_eq!(
            converted.to_string(),
            "Failed to connect to broker after 5 attempts: refused"
        );
    }

    #[test]
    #[serial]
    fn test_policy_from_env() {
        std::env::set_var("ROSTER_CONNECT_ATTEMPTS", "3");
        std::env::set_var("ROSTER_CONNECT_DELAY_SECS", "1");

        let policy = RetryPolicy::from_env().unwrap();
        assert_eq!(policy, RetryPolicy::new(3, Duration::from_secs(1)));

        std::env::set_var("ROSTER_CONNECT_ATTEMPTS", "0");
        assert!(RetryPolicy::from_env().is_err());

        std::env::set_var("ROSTER_CONNECT_ATTEMPTS", "many");
        assert!(RetryPolicy::from_env().is_err());

        std::env::remove_var("ROSTER_CONNECT_ATTEMPTS");
        std::env::remove_var("ROSTER_CONNECT_DELAY_SECS");

        assert_eq!(RetryPolicy::from_env().unwrap(), RetryPolicy::default());
    }
}
