//! The retry executor: attempt, classify, back off, try again.

use std::future::Future;
use std::time::{Duration, Instant};

use futures::future::Either;
use futures::pin_mut;

use super::classify::{ErrorClass, FetchFault};
use super::error::FetchError;
use super::policy::BackoffPolicy;

/// The seam between retry policy and remote I/O.
///
/// A transport owns the shape of its request descriptor and its parsed
/// payload; the fetcher owns nothing but policy. Decode failures after a
/// successful response are reported as [`FetchFault::Malformed`] so the
/// executor knows not to retry them.
///
/// # Examples
///
/// ```rust
/// use steadfast::{BackoffPolicy, FetchFault, Fetcher, Transport};
/// use std::time::Duration;
///
/// /// "resource id + named range", owned by the calling integration.
/// struct RangeRequest {
///     resource_id: String,
///     range: String,
/// }
///
/// struct Echo;
///
/// impl Transport for Echo {
///     type Request = RangeRequest;
///     type Payload = String;
///
///     async fn call(&self, request: &RangeRequest) -> Result<String, FetchFault> {
///         Ok(format!("{}!{}", request.resource_id, request.range))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let fetcher = Fetcher::new(
///     BackoffPolicy::stepped(Duration::from_millis(1)).with_max_retries(2),
/// );
/// let request = RangeRequest {
///     resource_id: "budget".to_string(),
///     range: "A1:B2".to_string(),
/// };
///
/// let payload = fetcher.fetch(&Echo, &request).await.unwrap();
/// assert_eq!(payload, "budget!A1:B2");
/// # });
/// ```
pub trait Transport {
    /// Caller-owned description of the remote operation.
    type Request;
    /// Parsed payload produced by a successful call.
    type Payload;

    /// Perform the remote call once.
    #[allow(async_fn_in_trait)]
    async fn call(&self, request: &Self::Request) -> Result<Self::Payload, FetchFault>;
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The classified fault from the failed attempt.
    pub fault: &'a FetchFault,
    /// Delay before the next attempt; `None` when retries are exhausted.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt.
    pub elapsed: Duration,
}

/// Performs remote reads with classified failures and bounded, jittered
/// retries.
///
/// Stateless between calls: each fetch owns its own attempt counter, and
/// concurrent fetches back off independently. The wait between attempts is
/// `tokio::time::sleep`, which suspends only the calling task.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    policy: BackoffPolicy,
}

impl Fetcher {
    /// Create a fetcher with the given backoff policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    /// The policy this fetcher retries with.
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Fetch through a [`Transport`].
    ///
    /// Each attempt calls `transport.call(request)` afresh. Success returns
    /// immediately; retryable faults back off per the policy; non-retryable
    /// faults fail after a single attempt regardless of the retry bound.
    pub async fn fetch<T: Transport>(
        &self,
        transport: &T,
        request: &T::Request,
    ) -> Result<T::Payload, FetchError> {
        self.fetch_with(|| transport.call(request)).await
    }

    /// Fetch using a factory closure.
    ///
    /// Each retry invokes the closure again, recreating the operation from
    /// scratch. This is the right shape for I/O: fresh connections, new
    /// request IDs, not a "cloned" in-flight call.
    pub async fn fetch_with<P, F, Fut>(&self, operation: F) -> Result<P, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<P, FetchFault>>,
    {
        self.run(operation, |_| {}).await
    }

    /// Fetch with an observability hook.
    ///
    /// The `on_retry` callback is invoked for every retryable fault, before
    /// the backoff wait (or before returning exhaustion). It is synchronous
    /// and should not block; use it for logging or metrics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::{BackoffPolicy, FetchFault, Fetcher, RetryEvent};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let fetcher = Fetcher::new(
    ///     BackoffPolicy::stepped(Duration::from_millis(1)).with_max_retries(1),
    /// );
    ///
    /// let result = fetcher
    ///     .fetch_with_hooks(
    ///         || async { Err::<(), _>(FetchFault::status(429, "rate limited")) },
    ///         |event: &RetryEvent<'_>| {
    ///             eprintln!("attempt {} failed, next delay {:?}", event.attempt, event.next_delay);
    ///         },
    ///     )
    ///     .await;
    ///
    /// assert!(result.unwrap_err().is_retry_exhausted());
    /// # });
    /// ```
    pub async fn fetch_with_hooks<P, F, Fut, H>(
        &self,
        operation: F,
        on_retry: H,
    ) -> Result<P, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<P, FetchFault>>,
        H: Fn(&RetryEvent<'_>),
    {
        self.run(operation, on_retry).await
    }

    /// Fetch with a cancellation signal.
    ///
    /// Races the fetch against `cancel`; if the signal resolves first, the
    /// fetch is abandoned (mid-backoff included) and
    /// [`FetchError::Cancelled`] is returned. Dropping the future returned by
    /// any fetch method has the same effect without the structured error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::{BackoffPolicy, FetchFault, Fetcher};
    /// use std::time::Duration;
    ///
    /// # tokio_test::block_on(async {
    /// let fetcher = Fetcher::new(
    ///     BackoffPolicy::stepped(Duration::from_secs(60)).with_max_retries(5),
    /// );
    ///
    /// let result = fetcher
    ///     .fetch_until(
    ///         || async { Err::<(), _>(FetchFault::status(503, "overloaded")) },
    ///         tokio::time::sleep(Duration::from_millis(5)),
    ///     )
    ///     .await;
    ///
    /// assert!(result.unwrap_err().is_cancelled());
    /// # });
    /// ```
    pub async fn fetch_until<P, F, Fut, C>(&self, operation: F, cancel: C) -> Result<P, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<P, FetchFault>>,
        C: Future<Output = ()>,
    {
        let fetch = self.fetch_with(operation);
        pin_mut!(fetch);
        pin_mut!(cancel);
        match futures::future::select(fetch, cancel).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(FetchError::Cancelled),
        }
    }

    async fn run<P, F, Fut, H>(&self, mut operation: F, on_retry: H) -> Result<P, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<P, FetchFault>>,
        H: Fn(&RetryEvent<'_>),
    {
        let start = Instant::now();
        let mut attempt = 0u32;

        loop {
            match operation().await {
                Ok(payload) => return Ok(payload),
                Err(fault) => {
                    if fault.class() == ErrorClass::NonRetryable {
                        return Err(FetchError::terminal(fault));
                    }

                    let delay = self.policy.delay_with_jitter(attempt);

                    let event = RetryEvent {
                        attempt: attempt + 1,
                        fault: &fault,
                        next_delay: delay,
                        elapsed: start.elapsed(),
                    };
                    on_retry(&event);

                    match delay {
                        Some(d) => {
                            tracing::debug!(
                                attempt = attempt + 1,
                                delay_ms = d.as_millis() as u64,
                                fault = %fault,
                                "transient fault, backing off before retry"
                            );
                            tokio::time::sleep(d).await;
                            attempt += 1;
                        }
                        None => {
                            return Err(FetchError::RetryExhausted {
                                last: fault,
                                attempts: attempt + 1,
                                total_duration: start.elapsed(),
                            });
                        }
                    }
                }
            }
        }
    }
}
