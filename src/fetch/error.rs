//! Terminal error types for fetch operations.

use std::time::Duration;

use super::classify::FetchFault;

/// The terminal failure of a fetch, after all retry decisions are made.
///
/// Every failed fetch resolves to exactly one of these; nothing is silently
/// swallowed.
///
/// # Examples
///
/// ```rust
/// use steadfast::{BackoffPolicy, FetchError, FetchFault, Fetcher};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let fetcher = Fetcher::new(
///     BackoffPolicy::stepped(Duration::from_millis(1)).with_max_retries(2),
/// );
///
/// let result = fetcher
///     .fetch_with(|| async { Err::<(), _>(FetchFault::status(503, "overloaded")) })
///     .await;
///
/// match result {
///     Err(FetchError::RetryExhausted { attempts, last, .. }) => {
///         assert_eq!(attempts, 3); // 1 initial + 2 retries
///         assert_eq!(last.status_code(), Some(503));
///     }
///     other => panic!("expected exhaustion, got {:?}", other),
/// }
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// All attempts were used; the last classified fault is retained.
    RetryExhausted {
        /// The fault from the final attempt.
        last: FetchFault,
        /// Total number of attempts made (initial + retries).
        attempts: u32,
        /// Total time spent, including backoff waits.
        total_duration: Duration,
    },
    /// Classification said don't retry; failed after a single attempt.
    NonRetryable {
        /// The classified fault.
        fault: FetchFault,
    },
    /// The remote call succeeded transport-wise but the payload failed to
    /// parse into the expected shape. Never retried.
    MalformedResponse {
        /// What was wrong with the payload.
        message: String,
    },
    /// The caller's cancel signal fired before the fetch resolved.
    Cancelled,
}

impl FetchError {
    /// Map a fault the executor will not retry into its terminal error.
    pub(crate) fn terminal(fault: FetchFault) -> Self {
        match fault {
            FetchFault::Malformed { message } => Self::MalformedResponse { message },
            other => Self::NonRetryable { fault: other },
        }
    }

    /// The underlying fault, when one exists.
    pub fn last_fault(&self) -> Option<&FetchFault> {
        match self {
            Self::RetryExhausted { last, .. } => Some(last),
            Self::NonRetryable { fault } => Some(fault),
            Self::MalformedResponse { .. } | Self::Cancelled => None,
        }
    }

    /// Returns true if every allowed attempt was used.
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted { .. })
    }

    /// Returns true if the fetch failed fast on a non-retryable fault.
    pub fn is_non_retryable(&self) -> bool {
        matches!(self, Self::NonRetryable { .. })
    }

    /// Returns true if the payload failed to parse.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }

    /// Returns true if the fetch was cancelled mid-flight.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RetryExhausted {
                last,
                attempts,
                total_duration,
            } => write!(
                f,
                "retry limit reached after {} attempts ({:?}): {}",
                attempts, total_duration, last
            ),
            Self::NonRetryable { fault } => write!(f, "non-retryable fault: {}", fault),
            Self::MalformedResponse { message } => write!(f, "malformed response: {}", message),
            Self::Cancelled => write!(f, "fetch cancelled"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RetryExhausted { last, .. } => Some(last),
            Self::NonRetryable { fault } => Some(fault),
            Self::MalformedResponse { .. } | Self::Cancelled => None,
        }
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_retry_exhausted_display() {
        let err = FetchError::RetryExhausted {
            last: FetchFault::status(503, "overloaded"),
            attempts: 3,
            total_duration: Duration::from_millis(500),
        };
        let display = format!("{}", err);
        assert!(display.contains("retry limit reached"));
        assert!(display.contains("3 attempts"));
        assert!(display.contains("503"));
    }

    #[test]
    fn test_terminal_maps_malformed() {
        let err = FetchError::terminal(FetchFault::malformed("not tabular"));
        assert!(err.is_malformed());
        assert_eq!(
            err,
            FetchError::MalformedResponse {
                message: "not tabular".to_string()
            }
        );
    }

    #[test]
    fn test_terminal_maps_status_to_non_retryable() {
        let err = FetchError::terminal(FetchFault::status(400, "bad range"));
        assert!(err.is_non_retryable());
        assert_eq!(err.last_fault().and_then(FetchFault::status_code), Some(400));
    }

    #[test]
    fn test_last_fault_absent_for_cancelled() {
        assert!(FetchError::Cancelled.last_fault().is_none());
        assert!(FetchError::Cancelled.is_cancelled());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = FetchError::NonRetryable {
            fault: FetchFault::status(403, "forbidden"),
        };
        let source = err.source().expect("should carry a source");
        assert!(format!("{}", source).contains("403"));
    }
}
