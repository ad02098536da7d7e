//! Bounded-wait synchronization.
//!
//! Every interaction that depends on application state uses a single
//! bounded polling loop: the condition either becomes true within
//! budget or the operation fails with a [`BancadaError::Timeout`] that
//! names the awaited condition and the elapsed budget. There is no
//! retry beyond that one bounded wait; transient UI flakiness is the
//! known, accepted risk.

use crate::result::{BancadaError, BancadaResult};
use std::future::Future;
use std::time::{Duration, Instant};

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Short timeout for cell-level convergence checks (500ms)
pub const SHORT_WAIT_TIMEOUT_MS: u64 = 500;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// The short cell-convergence budget
    #[must_use]
    pub const fn short() -> Self {
        Self {
            timeout_ms: SHORT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Poll an async predicate until it returns true or the budget is
/// exhausted.
///
/// The `condition` description appears in the timeout error verbatim,
/// so callers phrase it as the expected outcome ("cell (0, Age) text to
/// contain '17'").
pub async fn poll_until<F, Fut>(
    condition: &str,
    options: WaitOptions,
    mut predicate: F,
) -> BancadaResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BancadaResult<bool>>,
{
    let start = Instant::now();
    loop {
        if predicate().await? {
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                waited_for: condition.to_string(),
            });
        }
        if start.elapsed() >= options.timeout() {
            return Err(BancadaError::timeout(condition, options.timeout_ms));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Poll an async predicate, tolerating transient errors (e.g. stale
/// reads while the application re-renders) until the budget runs out.
pub async fn poll_until_ok<F, Fut>(
    condition: &str,
    options: WaitOptions,
    mut predicate: F,
) -> BancadaResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = BancadaResult<bool>>,
{
    let start = Instant::now();
    loop {
        if let Ok(true) = predicate().await {
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                waited_for: condition.to_string(),
            });
        }
        if start.elapsed() >= options.timeout() {
            return Err(BancadaError::timeout(condition, options.timeout_ms));
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_builder() {
            let opts = WaitOptions::new().with_timeout(5000).with_poll_interval(10);
            assert_eq!(opts.timeout(), Duration::from_millis(5000));
            assert_eq!(opts.poll_interval(), Duration::from_millis(10));
        }

        #[test]
        fn test_short_budget() {
            assert_eq!(WaitOptions::short().timeout_ms, SHORT_WAIT_TIMEOUT_MS);
        }
    }

    mod poll_tests {
        use super::*;

        #[tokio::test]
        async fn test_poll_until_immediate_success() {
            let result = poll_until("always true", WaitOptions::default(), || async {
                Ok(true)
            })
            .await
            .unwrap();
            assert_eq!(result.waited_for, "always true");
        }

        #[tokio::test]
        async fn test_poll_until_converges() {
            let count = AtomicUsize::new(0);
            let count = &count;
            let result = poll_until(
                "third poll",
                WaitOptions::new().with_timeout(2000).with_poll_interval(1),
                move || async move { Ok(count.fetch_add(1, Ordering::SeqCst) >= 2) },
            )
            .await;
            assert!(result.is_ok());
        }

        #[tokio::test]
        async fn test_poll_until_timeout_names_condition() {
            let err = poll_until(
                "grid spinner to disappear",
                WaitOptions::new().with_timeout(20).with_poll_interval(5),
                || async { Ok(false) },
            )
            .await
            .unwrap_err();
            let msg = err.to_string();
            assert!(msg.contains("grid spinner to disappear"));
            assert!(msg.contains("20ms"));
        }

        #[tokio::test]
        async fn test_poll_until_propagates_error() {
            let err = poll_until(
                "never",
                WaitOptions::default(),
                || async {
                    Err::<bool, _>(crate::result::BancadaError::Driver {
                        message: "boom".to_string(),
                    })
                },
            )
            .await
            .unwrap_err();
            assert!(matches!(err, BancadaError::Driver { .. }));
        }

        #[tokio::test]
        async fn test_poll_until_ok_swallows_transient_errors() {
            let count = AtomicUsize::new(0);
            let count = &count;
            let result = poll_until_ok(
                "second poll after stale",
                WaitOptions::new().with_timeout(2000).with_poll_interval(1),
                move || async move {
                    if count.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(crate::result::BancadaError::Stale {
                            handle: "el-1".to_string(),
                        })
                    } else {
                        Ok(true)
                    }
                },
            )
            .await;
            assert!(result.is_ok());
        }
    }
}
