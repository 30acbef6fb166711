use core::time::Duration;

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
///
/// This is the epoch every marketplace worker has been minting IDs against,
/// so changing it for an existing deployment would break ordering with
/// already-issued IDs.
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// The epoch used when none is configured.
pub const DEFAULT_EPOCH: Duration = TWITTER_EPOCH;

/// A trait for time sources that return a millisecond timestamp relative to
/// some epoch.
///
/// This abstraction lets a generator run against the real wall clock, or
/// against a mocked clock in tests.
///
/// # Example
///
/// ```
/// use idworker::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::rc::Rc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
