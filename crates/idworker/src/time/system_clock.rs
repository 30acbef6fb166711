use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    generator::{Error, Result},
    time::{DEFAULT_EPOCH, TimeSource},
};

/// A wall-clock time source that reports milliseconds since a fixed epoch.
///
/// Unlike a monotonic timer this clock follows every adjustment made to the
/// system time, including backward NTP steps. That is intentional: the
/// generators compare each reading with the last issued timestamp and refuse
/// to mint IDs while the clock is behind, instead of silently reusing a stale
/// timestamp.
///
/// The epoch is checked against the wall clock when the clock is built. A
/// reading that later falls before the epoch saturates to zero, which a
/// generator that has already issued an ID reports as
/// [`Error::ClockMovedBackwards`](crate::Error::ClockMovedBackwards).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SystemClock {
    epoch: Duration,
}

impl Default for SystemClock {
    /// Constructs a clock aligned to [`DEFAULT_EPOCH`].
    fn default() -> Self {
        Self {
            epoch: DEFAULT_EPOCH,
        }
    }
}

impl SystemClock {
    /// Constructs a clock using `epoch` (a duration since 1970-01-01 UTC) as
    /// its zero point.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpochInFuture`] if `epoch` is later than the current
    /// system time. Every reading would otherwise be zero.
    ///
    /// # Example
    ///
    /// ```
    /// use idworker::{SystemClock, TimeSource, TWITTER_EPOCH};
    ///
    /// let clock = SystemClock::with_epoch(TWITTER_EPOCH)?;
    /// assert!(clock.current_millis() > 0);
    /// # Ok::<(), idworker::Error>(())
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let now = unix_now();
        if epoch > now {
            return Err(Error::EpochInFuture {
                epoch_ms: epoch.as_millis() as u64,
                now_ms: now.as_millis() as u64,
            });
        }
        Ok(Self { epoch })
    }

    pub const fn epoch(&self) -> Duration {
        self.epoch
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        unix_now().saturating_sub(self.epoch).as_millis() as u64
    }
}

fn unix_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}
