//! Result and error types for Bancada.
//!
//! Every failure is fail-fast and non-recoverable at the point of
//! occurrence; there are no retries beyond the single bounded wait that
//! produced a [`BancadaError::Timeout`].

use thiserror::Error;

/// Result type for Bancada operations
pub type BancadaResult<T> = Result<T, BancadaError>;

/// Errors that can occur in Bancada
#[derive(Debug, Error)]
pub enum BancadaError {
    /// A locator matched zero elements when exactly one was required
    #[error("No element found for selector '{selector}'")]
    NotFound {
        /// The rendered selector expression
        selector: String,
    },

    /// A strict locator matched more than one element
    #[error("Selector '{selector}' matched {count} elements, expected exactly one")]
    AmbiguousMatch {
        /// The rendered selector expression
        selector: String,
        /// Number of elements matched
        count: usize,
    },

    /// A polled condition never became true within budget
    #[error("Timed out after {elapsed_ms}ms waiting for: {condition}")]
    Timeout {
        /// Description of the awaited condition
        condition: String,
        /// Elapsed budget in milliseconds
        elapsed_ms: u64,
    },

    /// Caller attempted an operation invalid for the current UI state
    #[error("Precondition violated: {message}")]
    Precondition {
        /// What the operation required
        message: String,
    },

    /// Expected value mismatch, reported with both sides
    #[error("Assertion failed: expected '{expected}', got '{actual}'")]
    Assertion {
        /// Expected value
        expected: String,
        /// Actual value
        actual: String,
    },

    /// A previously resolved element handle is detached from the UI tree
    #[error("Element '{handle}' is stale")]
    Stale {
        /// The detached handle id
        handle: String,
    },

    /// Navigation failed
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Remote command API error
    #[error("Remote command '{command}' failed with status {status}: {message}")]
    Http {
        /// Command name
        command: String,
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },

    /// Mail capture service error
    #[error("Mail capture error: {message}")]
    Smtp {
        /// Error message
        message: String,
    },

    /// Session configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Driver-level failure not covered by a more specific variant
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BancadaError {
    /// Shorthand for a timeout error
    #[must_use]
    pub fn timeout(condition: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Timeout {
            condition: condition.into(),
            elapsed_ms,
        }
    }

    /// Shorthand for a precondition violation
    #[must_use]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Shorthand for an expected/actual mismatch
    #[must_use]
    pub fn assertion(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::Assertion {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_condition_and_budget() {
        let err = BancadaError::timeout("grid spinner to disappear", 30_000);
        let msg = err.to_string();
        assert!(msg.contains("grid spinner to disappear"));
        assert!(msg.contains("30000ms"));
    }

    #[test]
    fn test_assertion_message_carries_both_sides() {
        let err = BancadaError::assertion("17", "18");
        let msg = err.to_string();
        assert!(msg.contains("'17'"));
        assert!(msg.contains("'18'"));
    }

    #[test]
    fn test_not_found_names_selector() {
        let err = BancadaError::NotFound {
            selector: "div.editable-grid".to_string(),
        };
        assert!(err.to_string().contains("div.editable-grid"));
    }

    #[test]
    fn test_precondition_message() {
        let err = BancadaError::precondition("field 'Label' is read-only");
        assert!(err.to_string().contains("read-only"));
    }
}
