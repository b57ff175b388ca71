//! # Engine configuration.
//!
//! [`Config`] is read once at construction and immutable thereafter; there is
//! no hot-reload. Two fields double as feature switches:
//!
//! - [`Config::stability_dwell`] — `None` disables the whole engine: no
//!   evaluation ever emits an outbound request.
//! - [`Config::score_tolerance`] — `< 0` disables RAT/signal-score based
//!   switching; service-based (in/out of service) switching still runs.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use simvisor::Config;
//!
//! let mut cfg = Config::default();
//! cfg.stability_dwell = Some(Duration::from_secs(10));
//! cfg.score_tolerance = 100;
//! cfg.max_validation_retries = 7;
//!
//! assert!(cfg.require_ping);
//! ```

use std::time::Duration;

/// Immutable engine settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// How long an apparently good condition must persist before the engine
    /// requests a switch. `None` disables the auto switch feature entirely.
    pub stability_dwell: Option<Duration>,

    /// Minimum score advantage a non-default slot needs before it is
    /// preferred on score alone. Negative disables score-based switching;
    /// the raw value still feeds the evaluation prefilter.
    pub score_tolerance: i32,

    /// Whether a switch decision must pass the switcher's ping validation
    /// before being actuated.
    pub require_ping: bool,

    /// Maximum consecutive validation failures before the engine gives up on
    /// the current switch opportunity.
    pub max_validation_retries: u32,

    /// Use the usable-state aware evaluation path, which may switch onto a
    /// roaming slot when data roaming is enabled there. Off means the legacy
    /// home-service-only path.
    pub allow_roaming_switch: bool,

    /// Feature flag for score-based switching, ANDed with a non-negative
    /// [`Config::score_tolerance`].
    pub score_based_switch: bool,

    /// Saturation cap for the exponential validation-retry delay.
    pub max_retry_backoff: Duration,

    /// Capacity of the ingress event channel.
    ///
    /// When full, [`EngineHandle`](crate::EngineHandle) methods return
    /// [`SwitchError::QueueFull`](crate::SwitchError::QueueFull).
    pub queue_capacity: usize,
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `stability_dwell = 10s`
    /// - `score_tolerance = -1` (score-based switching off)
    /// - `require_ping = true`
    /// - `max_validation_retries = 7`
    /// - `allow_roaming_switch = false` (legacy path)
    /// - `score_based_switch = true`
    /// - `max_retry_backoff = 1h`
    /// - `queue_capacity = 256`
    fn default() -> Self {
        Self {
            stability_dwell: Some(Duration::from_secs(10)),
            score_tolerance: -1,
            require_ping: true,
            max_validation_retries: 7,
            allow_roaming_switch: false,
            score_based_switch: true,
            max_retry_backoff: Duration::from_secs(3600),
            queue_capacity: 256,
        }
    }
}
