//! Fault classification: which failures are worth retrying.

use std::fmt;

/// A single failed fetch attempt.
///
/// This is the native error representation the executor classifies; transports
/// map whatever their underlying library exposes (status codes, socket errors,
/// decode errors) into one of these variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFault {
    /// The remote answered with a non-success status code.
    Status {
        /// HTTP-like status code.
        code: u16,
        /// Human-readable message from the remote, if any.
        message: String,
    },
    /// The call never produced a response: connection refused, DNS failure,
    /// socket timeout.
    Transport {
        /// Human-readable description of the transport failure.
        message: String,
    },
    /// The call succeeded transport-wise but the payload did not have the
    /// expected shape.
    Malformed {
        /// What was wrong with the payload.
        message: String,
    },
}

/// Whether a fault is worth another attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Transient condition; a later attempt may succeed.
    Retryable,
    /// Permanent condition; retrying cannot help.
    NonRetryable,
}

/// Status codes signaling a transient remote condition: request timeout,
/// rate limiting, and the server-side 5xx class.
fn retryable_status(code: u16) -> bool {
    matches!(code, 408 | 429) || (500..=599).contains(&code)
}

impl FetchFault {
    /// A status-code fault.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// A transport-level fault (no response at all).
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// A malformed-payload fault.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Classify this fault.
    ///
    /// Transport faults are retryable: the remote may simply be unreachable
    /// for a moment. Malformed payloads are not: the response arrived, and
    /// asking again yields the same shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::{ErrorClass, FetchFault};
    ///
    /// assert_eq!(FetchFault::status(429, "slow down").class(), ErrorClass::Retryable);
    /// assert_eq!(FetchFault::status(503, "overloaded").class(), ErrorClass::Retryable);
    /// assert_eq!(FetchFault::status(400, "bad range").class(), ErrorClass::NonRetryable);
    /// assert_eq!(FetchFault::transport("connection refused").class(), ErrorClass::Retryable);
    /// assert_eq!(FetchFault::malformed("not tabular").class(), ErrorClass::NonRetryable);
    /// ```
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Status { code, .. } if retryable_status(*code) => ErrorClass::Retryable,
            Self::Status { .. } => ErrorClass::NonRetryable,
            Self::Transport { .. } => ErrorClass::Retryable,
            Self::Malformed { .. } => ErrorClass::NonRetryable,
        }
    }

    /// Returns true if this fault is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Retryable
    }

    /// The status code, if this fault carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        match self {
            Self::Status { message, .. }
            | Self::Transport { message }
            | Self::Malformed { message } => message,
        }
    }
}

impl fmt::Display for FetchFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { code, message } => write!(f, "status {}: {}", code, message),
            Self::Transport { message } => write!(f, "transport failure: {}", message),
            Self::Malformed { message } => write!(f, "malformed payload: {}", message),
        }
    }
}

impl std::error::Error for FetchFault {}

#[cfg(test)]
mod classify_tests {
    use super::*;

    #[test]
    fn test_timeout_and_rate_limit_are_retryable() {
        assert_eq!(FetchFault::status(408, "timeout").class(), ErrorClass::Retryable);
        assert_eq!(FetchFault::status(429, "rate limited").class(), ErrorClass::Retryable);
    }

    #[test]
    fn test_entire_5xx_class_is_retryable() {
        for code in [500, 502, 503, 504, 599] {
            assert_eq!(
                FetchFault::status(code, "server side").class(),
                ErrorClass::Retryable,
                "status {} should be retryable",
                code
            );
        }
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        for code in [400, 401, 403, 404, 422] {
            assert_eq!(
                FetchFault::status(code, "client side").class(),
                ErrorClass::NonRetryable,
                "status {} should not be retryable",
                code
            );
        }
    }

    #[test]
    fn test_transport_faults_are_retryable() {
        assert!(FetchFault::transport("connection refused").is_retryable());
        assert!(FetchFault::transport("dns lookup failed").is_retryable());
    }

    #[test]
    fn test_malformed_payloads_are_never_retried() {
        assert!(!FetchFault::malformed("row 3 is not an array").is_retryable());
    }

    #[test]
    fn test_status_code_accessor() {
        assert_eq!(FetchFault::status(429, "x").status_code(), Some(429));
        assert_eq!(FetchFault::transport("x").status_code(), None);
        assert_eq!(FetchFault::malformed("x").status_code(), None);
    }

    #[test]
    fn test_display() {
        let fault = FetchFault::status(429, "rate limited");
        assert_eq!(format!("{}", fault), "status 429: rate limited");

        let fault = FetchFault::transport("connection refused");
        assert!(format!("{}", fault).contains("transport failure"));

        let fault = FetchFault::malformed("not tabular");
        assert!(format!("{}", fault).contains("malformed payload"));
    }
}
