//! Backoff policy types and configuration.

use std::time::Duration;

/// A backoff policy describing how failed fetches are retried.
///
/// Policies are pure data - they describe backoff behavior but don't execute
/// it. This makes them easy to test, clone, and inspect.
///
/// A policy always carries an explicit retry bound. `max_retries` counts
/// retries, not attempts: `max_retries = 0` means a single attempt and no
/// retries, `max_retries = N` means up to `N + 1` attempts total.
///
/// # Examples
///
/// ```rust
/// use steadfast::BackoffPolicy;
/// use std::time::Duration;
///
/// // Linearly stepped backoff with a bounded jitter band
/// let policy = BackoffPolicy::stepped(Duration::from_secs(1))
///     .with_jitter_band(Duration::from_secs(1), Duration::from_secs(2))
///     .with_max_retries(5);
///
/// assert_eq!(policy.max_retries(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    strategy: BackoffStrategy,
    max_retries: u32,
    max_delay: Option<Duration>,
    jitter: Option<JitterBand>,
}

/// The deterministic component of retry delays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Fixed delay between attempts.
    Constant(Duration),
    /// Delay grows by a fixed step per retry: step * attempt.
    ///
    /// The first retry's deterministic component is zero; with a jitter band
    /// the first wait is jitter only.
    Stepped {
        /// Step added per retry already made.
        step: Duration,
    },
    /// Delay doubles: base * 2^attempt.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
}

/// Bounded additive randomness applied on top of the deterministic delay.
///
/// Unlike proportional jitter, the band is absolute: every delay gains a
/// uniformly random `min ..= max` on top of its deterministic component, so
/// delays for attempt `i` always fall in
/// `[deterministic(i) + min, deterministic(i) + max]`.
///
/// # Examples
///
/// ```rust
/// use steadfast::JitterBand;
/// use std::time::Duration;
///
/// let band = JitterBand::new(Duration::from_millis(100), Duration::from_millis(200));
/// let sample = band.sample();
/// assert!(sample >= Duration::from_millis(100));
/// assert!(sample <= Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JitterBand {
    min: Duration,
    max: Duration,
}

impl JitterBand {
    /// Create a jitter band. If `max < min` the band collapses to `min`.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Lower bound of the band.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Upper bound of the band.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draw a uniformly random duration from the band.
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let millis = rng.gen_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

impl BackoffPolicy {
    /// Create a policy with constant delay between retries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy::constant(Duration::from_millis(500))
    ///     .with_max_retries(3);
    ///
    /// // Every retry waits 500ms
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(500)));
    /// assert_eq!(policy.delay_for_attempt(3), None); // max_retries exceeded
    /// ```
    pub fn constant(delay: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Constant(delay),
            max_retries: 0,
            max_delay: None,
            jitter: None,
        }
    }

    /// Create a policy whose delay grows by a fixed step per retry.
    ///
    /// Delay = step * attempt (0-indexed), so the first retry's deterministic
    /// component is zero and the wait comes entirely from the jitter band.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy::stepped(Duration::from_secs(1))
    ///     .with_max_retries(3);
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::ZERO));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_secs(1)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_secs(2)));
    /// assert_eq!(policy.delay_for_attempt(3), None);
    /// ```
    pub fn stepped(step: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Stepped { step },
            max_retries: 0,
            max_delay: None,
            jitter: None,
        }
    }

    /// Create a policy with exponentially increasing delay.
    ///
    /// Delay = base * 2^attempt
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy::exponential(Duration::from_millis(100))
    ///     .with_max_retries(5);
    ///
    /// assert_eq!(policy.delay_for_attempt(0), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(400)));
    /// ```
    pub fn exponential(base: Duration) -> Self {
        Self {
            strategy: BackoffStrategy::Exponential { base },
            max_retries: 0,
            max_delay: None,
            jitter: None,
        }
    }

    /// Set the maximum number of retry attempts.
    ///
    /// This does not include the initial attempt. For example,
    /// `with_max_retries(3)` means up to 4 total attempts (1 initial + 3
    /// retries). The default is 0: a single attempt, no retries.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Cap the deterministic delay component.
    ///
    /// The cap applies before jitter, so jittered delays stay inside
    /// `[cap + min_jitter, cap + max_jitter]` once the strategy saturates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy::stepped(Duration::from_secs(1))
    ///     .with_max_retries(10)
    ///     .with_max_delay(Duration::from_secs(3));
    ///
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_secs(2)));
    /// assert_eq!(policy.delay_for_attempt(5), Some(Duration::from_secs(3))); // capped
    /// ```
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add a bounded additive jitter band to every delay.
    ///
    /// Jitter desynchronizes concurrent callers retrying against the same
    /// remote endpoint.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use steadfast::BackoffPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = BackoffPolicy::stepped(Duration::from_secs(1))
    ///     .with_jitter_band(Duration::from_secs(1), Duration::from_secs(2))
    ///     .with_max_retries(5);
    ///
    /// // Delay before retry 2 falls in [3s, 4s]
    /// let delay = policy.delay_with_jitter(2).unwrap();
    /// assert!(delay >= Duration::from_secs(3));
    /// assert!(delay <= Duration::from_secs(4));
    /// ```
    pub fn with_jitter_band(mut self, min: Duration, max: Duration) -> Self {
        self.jitter = Some(JitterBand::new(min, max));
        self
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Get the deterministic delay cap, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter band, if any.
    pub fn jitter(&self) -> Option<&JitterBand> {
        self.jitter.as_ref()
    }

    /// Get the backoff strategy.
    pub fn strategy(&self) -> &BackoffStrategy {
        &self.strategy
    }

    /// Calculate the deterministic delay before retry N (0-indexed).
    ///
    /// Returns `None` once `attempt >= max_retries`, i.e. when no more
    /// retries should be made.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }

        let base = match &self.strategy {
            BackoffStrategy::Constant(d) => *d,
            BackoffStrategy::Stepped { step } => step.saturating_mul(attempt),
            BackoffStrategy::Exponential { base } => {
                base.saturating_mul(2u32.saturating_pow(attempt))
            }
        };

        let capped = match self.max_delay {
            Some(max) => base.min(max),
            None => base,
        };

        Some(capped)
    }

    /// Calculate the delay before retry N with jitter applied.
    ///
    /// This is what the executor actually sleeps for.
    pub fn delay_with_jitter(&self, attempt: u32) -> Option<Duration> {
        let base = self.delay_for_attempt(attempt)?;
        Some(match &self.jitter {
            Some(band) => base.saturating_add(band.sample()),
            None => base,
        })
    }
}

impl Default for BackoffPolicy {
    /// Defaults tuned for a rate-limited spreadsheet-style API: 1s step,
    /// 1-2s jitter band, up to 60 retries.
    fn default() -> Self {
        BackoffPolicy::stepped(Duration::from_secs(1))
            .with_jitter_band(Duration::from_secs(1), Duration::from_secs(2))
            .with_max_retries(60)
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constant_delay() {
        let policy = BackoffPolicy::constant(Duration::from_millis(100)).with_max_retries(3);

        assert_eq!(
            policy.delay_for_attempt(0),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            policy.delay_for_attempt(2),
            Some(Duration::from_millis(100))
        );
        assert_eq!(policy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_stepped_delay() {
        let policy = BackoffPolicy::stepped(Duration::from_millis(100)).with_max_retries(5);

        assert_eq!(policy.delay_for_attempt(0), Some(Duration::ZERO));
        assert_eq!(
            policy.delay_for_attempt(1),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            policy.delay_for_attempt(2),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            policy.delay_for_attempt(4),
            Some(Duration::from_millis(400))
        );
        assert_eq!(policy.delay_for_attempt(5), None);
    }

    #[test]
    fn test_exponential_delay() {
        let policy = BackoffPolicy::exponential(Duration::from_millis(100)).with_max_retries(5);

        assert_eq!(
            policy.delay_for_attempt(0),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            policy.delay_for_attempt(1),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            policy.delay_for_attempt(3),
            Some(Duration::from_millis(800))
        );
    }

    #[test]
    fn test_max_delay_caps_deterministic_component() {
        let policy = BackoffPolicy::stepped(Duration::from_millis(100))
            .with_max_retries(10)
            .with_max_delay(Duration::from_millis(250));

        assert_eq!(
            policy.delay_for_attempt(2),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            policy.delay_for_attempt(3),
            Some(Duration::from_millis(250))
        ); // capped
        assert_eq!(
            policy.delay_for_attempt(9),
            Some(Duration::from_millis(250))
        ); // capped
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let policy = BackoffPolicy::stepped(Duration::from_millis(100));

        assert_eq!(policy.max_retries(), 0);
        assert_eq!(policy.delay_for_attempt(0), None);
    }

    #[test]
    fn test_jitter_band_collapses_when_inverted() {
        let band = JitterBand::new(Duration::from_millis(200), Duration::from_millis(100));
        assert_eq!(band.min(), Duration::from_millis(200));
        assert_eq!(band.max(), Duration::from_millis(200));
        assert_eq!(band.sample(), Duration::from_millis(200));
    }

    #[test]
    fn test_no_jitter_returns_deterministic_delay() {
        let policy = BackoffPolicy::stepped(Duration::from_millis(100)).with_max_retries(5);

        assert_eq!(
            policy.delay_with_jitter(3),
            Some(Duration::from_millis(300))
        );
    }

    #[test]
    fn test_policy_is_clone() {
        let policy = BackoffPolicy::stepped(Duration::from_millis(100)).with_max_retries(3);
        let cloned = policy.clone();
        assert_eq!(policy, cloned);
    }

    #[test]
    fn test_default_policy_bounds() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_retries(), 60);
        let band = policy.jitter().unwrap();
        assert_eq!(band.min(), Duration::from_secs(1));
        assert_eq!(band.max(), Duration::from_secs(2));
    }

    #[test]
    fn test_policy_getters() {
        let policy = BackoffPolicy::stepped(Duration::from_millis(100))
            .with_max_retries(3)
            .with_max_delay(Duration::from_secs(5))
            .with_jitter_band(Duration::from_millis(10), Duration::from_millis(20));

        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.max_delay(), Some(Duration::from_secs(5)));
        assert!(policy.jitter().is_some());
        assert!(matches!(policy.strategy(), BackoffStrategy::Stepped { .. }));
    }

    proptest! {
        #[test]
        fn jittered_delay_stays_in_band(
            attempt in 0u32..50,
            step_ms in 0u64..500,
            min_ms in 0u64..200,
            spread_ms in 0u64..200,
        ) {
            let min = Duration::from_millis(min_ms);
            let max = Duration::from_millis(min_ms + spread_ms);
            let policy = BackoffPolicy::stepped(Duration::from_millis(step_ms))
                .with_max_retries(50)
                .with_jitter_band(min, max);

            let base = Duration::from_millis(step_ms * u64::from(attempt));
            let delay = policy.delay_with_jitter(attempt).unwrap();
            prop_assert!(delay >= base + min);
            prop_assert!(delay <= base + max);
        }

        #[test]
        fn deterministic_component_is_monotone(
            step_ms in 0u64..500,
            attempt in 0u32..49,
        ) {
            let policy = BackoffPolicy::stepped(Duration::from_millis(step_ms))
                .with_max_retries(50);

            let a = policy.delay_for_attempt(attempt).unwrap();
            let b = policy.delay_for_attempt(attempt + 1).unwrap();
            prop_assert!(b >= a);
        }

        #[test]
        fn retries_are_always_bounded(attempt in 0u32..200, max_retries in 0u32..100) {
            let policy = BackoffPolicy::stepped(Duration::from_millis(1))
                .with_max_retries(max_retries);

            prop_assert_eq!(
                policy.delay_for_attempt(attempt).is_some(),
                attempt < max_retries
            );
        }
    }
}
