//! # Steadfast
//!
//! > *"Fall seven times, stand up eight"*
//!
//! A Rust library for resilient remote fetching.
//!
//! ## Philosophy
//!
//! **Steadfast** separates retry *policy* from retry *execution*:
//!
//! - **Policy**: [`BackoffPolicy`] is pure data—no side effects, easily testable
//! - **Execution**: [`Fetcher`] is the imperative shell that performs attempts,
//!   classifies faults, and backs off with a non-blocking sleep
//!
//! Failures are classified before any retry decision: transient conditions
//! (timeouts, rate limits, server-side errors, transport failures) are retried
//! with a bounded, jittered backoff; everything else fails fast.
//!
//! ## Quick Example
//!
//! ```rust
//! use steadfast::{BackoffPolicy, FetchFault, Fetcher};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let fetcher = Fetcher::new(
//!     BackoffPolicy::stepped(Duration::from_millis(1))
//!         .with_jitter_band(Duration::from_millis(1), Duration::from_millis(2))
//!         .with_max_retries(3),
//! );
//!
//! let mut calls = 0u32;
//! let payload = fetcher
//!     .fetch_with(|| {
//!         calls += 1;
//!         let attempt = calls;
//!         async move {
//!             if attempt < 2 {
//!                 Err(FetchFault::status(429, "rate limited"))
//!             } else {
//!                 Ok("cell value")
//!             }
//!         }
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(payload, "cell value");
//! assert_eq!(calls, 2);
//! # });
//! ```
//!
//! For remote calls behind a stable seam, implement [`Transport`] and use
//! [`Fetcher::fetch`] instead of a closure.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod fetch;
pub mod table;

// Re-exports
pub use fetch::{
    BackoffPolicy, BackoffStrategy, ErrorClass, FetchError, FetchFault, Fetcher, JitterBand,
    RetryEvent, Transport,
};
pub use table::Table;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fetch::{
        BackoffPolicy, ErrorClass, FetchError, FetchFault, Fetcher, RetryEvent, Transport,
    };
    pub use crate::table::Table;
}
