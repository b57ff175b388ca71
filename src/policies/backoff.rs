//! # Backoff policy for validation retries.
//!
//! [`RetryBackoff`] controls how the delay before re-evaluating a failed
//! switch grows with consecutive failures. It is parameterized by:
//! - [`RetryBackoff::first`] the delay before the first retry;
//! - [`RetryBackoff::max`] the cap the doubled delays saturate at.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use simvisor::RetryBackoff;
//!
//! let backoff = RetryBackoff {
//!     first: Duration::from_secs(1),
//!     max: Duration::from_secs(3600),
//! };
//!
//! // Delay doubles with each consecutive failure.
//! assert_eq!(backoff.delay(0), Duration::from_secs(1));
//! assert_eq!(backoff.delay(1), Duration::from_secs(2));
//! assert_eq!(backoff.delay(2), Duration::from_secs(4));
//!
//! // Large attempt counts saturate at `max` instead of overflowing.
//! assert_eq!(backoff.delay(12), Duration::from_secs(3600));
//! assert_eq!(backoff.delay(63), Duration::from_secs(3600));
//! ```

use std::time::Duration;

/// Exponential (doubling) retry backoff with a saturation cap.
#[derive(Clone, Copy, Debug)]
pub struct RetryBackoff {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay; the shift saturates here rather than overflowing.
    pub max: Duration,
}

impl Default for RetryBackoff {
    /// Returns a policy with `first = 10s` and `max = 1h`.
    fn default() -> Self {
        Self {
            first: Duration::from_secs(10),
            max: Duration::from_secs(3600),
        }
    }
}

impl RetryBackoff {
    /// Delay before retry number `attempt` (0-based): `first << attempt`,
    /// capped at [`RetryBackoff::max`].
    ///
    /// The shift saturates once it would push bits out of the millisecond
    /// representation, so any attempt count is safe to pass.
    pub fn delay(&self, attempt: u32) -> Duration {
        let first_ms = u64::try_from(self.first.as_millis()).unwrap_or(u64::MAX);
        let shifted = if attempt >= first_ms.leading_zeros() {
            u64::MAX
        } else {
            first_ms << attempt
        };
        Duration::from_millis(shifted).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_first_delay_stays_zero() {
        let backoff = RetryBackoff {
            first: Duration::ZERO,
            max: Duration::from_secs(3600),
        };
        assert_eq!(backoff.delay(0), Duration::ZERO);
        assert_eq!(backoff.delay(40), Duration::ZERO);
    }

    #[test]
    fn saturates_at_max_for_huge_attempts() {
        let backoff = RetryBackoff {
            first: Duration::from_millis(250),
            max: Duration::from_secs(3600),
        };
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(3600));
    }

    #[test]
    fn doubles_until_the_cap() {
        let backoff = RetryBackoff {
            first: Duration::from_millis(1000),
            max: Duration::from_millis(3500),
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(1000));
        assert_eq!(backoff.delay(1), Duration::from_millis(2000));
        assert_eq!(backoff.delay(2), Duration::from_millis(3500));
    }
}
