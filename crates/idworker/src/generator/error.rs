/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `idworker` can produce.
///
/// Construction errors (`*OutOfRange`, `EpochInFuture`, `InvalidSellerCode`,
/// `InvalidShortIdWidth`) are never retryable: fix the configuration.
/// `ClockMovedBackwards` is only worth retrying once the clock has caught up
/// with the last issued timestamp; the generators never retry it themselves.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("datacenter id {value} is out of range (max {max})")]
    DatacenterIdOutOfRange { value: u64, max: u64 },

    #[error("worker id {value} is out of range (max {max})")]
    WorkerIdOutOfRange { value: u64, max: u64 },

    #[error("sequence {value} is out of range (max {max})")]
    SequenceOutOfRange { value: u64, max: u64 },

    /// The time source reported a timestamp earlier than the last one this
    /// generator issued an ID for.
    #[error("clock moved backwards: now {now} < last issued timestamp {last}; refusing to generate id")]
    ClockMovedBackwards { last: u64, now: u64 },

    /// The sequence for `timestamp` is exhausted and the clock did not advance
    /// within the configured [`SpinPolicy`](crate::SpinPolicy) bound.
    #[error("sequence exhausted at timestamp {timestamp} and the clock did not advance")]
    SequenceExhausted { timestamp: u64 },

    /// The clock is past what the 41-bit timestamp field can hold.
    #[error("timestamp {timestamp} exceeds the maximum encodable timestamp {max}")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// A clock was configured with an epoch later than the current time.
    #[error("epoch {epoch_ms} ms is later than the current time {now_ms} ms")]
    EpochInFuture { epoch_ms: u64, now_ms: u64 },

    /// Another thread panicked while holding the generator lock.
    ///
    /// `parking_lot` mutexes do not poison, so this variant only exists
    /// without the `parking-lot` feature.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,

    #[error("invalid seller code {code:?}: expected 1 to 8 ASCII letters")]
    InvalidSellerCode { code: String },

    #[error("invalid order number {input:?}")]
    InvalidOrderNumber { input: String },

    #[error("short id width {digits} is out of range (1..=19)")]
    InvalidShortIdWidth { digits: u32 },

    #[error("no unused short id after {attempts} attempts")]
    ShortIdCollision { attempts: u32 },
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Collapse every poisoned lock into `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
