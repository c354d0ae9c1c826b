//! Resilient remote fetching with classified failures and bounded backoff.
//!
//! This module is the core of steadfast, split along a simple line:
//!
//! - **Pure Core**: [`BackoffPolicy`] and fault classification are just
//!   data—no side effects, easily testable
//! - **Imperative Shell**: [`Fetcher`] performs the attempts, sleeps between
//!   them, and maps the last fault into a terminal [`FetchError`]
//!
//! # Quick Start
//!
//! ```rust
//! use steadfast::{BackoffPolicy, FetchFault, Fetcher};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let fetcher = Fetcher::new(
//!     BackoffPolicy::stepped(Duration::from_millis(1)).with_max_retries(2),
//! );
//!
//! let payload = fetcher
//!     .fetch_with(|| async { Ok::<_, FetchFault>(42) })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(payload, 42);
//! # });
//! ```
//!
//! # Classification
//!
//! Every failed attempt produces a [`FetchFault`], which classifies itself:
//!
//! - Status 408, 429, or any 5xx → retryable (transient remote condition)
//! - Any other status → non-retryable, fails after a single attempt
//! - Transport failure (connection refused, DNS) → retryable
//! - Malformed payload → non-retryable; retrying cannot fix a bad payload
//!
//! # Backoff
//!
//! Delays grow with the attempt count and carry a bounded additive jitter so
//! concurrent callers backing off against the same endpoint desynchronize:
//!
//! `delay = deterministic(attempt) + random(min_jitter ..= max_jitter)`
//!
//! The wait is `tokio::time::sleep`—it suspends only the calling task, so any
//! number of fetches can be in flight and backing off independently. Dropping
//! the fetch future (or racing it via [`Fetcher::fetch_until`]) abandons the
//! fetch mid-backoff.
//!
//! # Error Types
//!
//! - [`FetchError::RetryExhausted`]: all attempts used; retains the last fault
//! - [`FetchError::NonRetryable`]: classification said don't retry
//! - [`FetchError::MalformedResponse`]: transport succeeded, payload didn't parse
//! - [`FetchError::Cancelled`]: the caller's cancel signal fired first

mod classify;
mod error;
mod fetcher;
mod policy;

pub use classify::{ErrorClass, FetchFault};
pub use error::FetchError;
pub use fetcher::{Fetcher, RetryEvent, Transport};
pub use policy::{BackoffPolicy, BackoffStrategy, JitterBand};
