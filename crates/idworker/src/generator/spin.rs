use crate::{
    generator::{Error, Result},
    time::TimeSource,
};

/// How long a blocking `next_id` call may spin when the current millisecond's
/// sequence is exhausted.
///
/// The wait normally lasts until the next millisecond boundary, but a frozen
/// or misbehaving clock would keep the caller (and, for
/// [`LockIdWorker`](crate::LockIdWorker), every other caller queued on the
/// lock) spinning forever. [`SpinPolicy::Bounded`] caps the number of clock
/// re-reads and surfaces [`Error::SequenceExhausted`] instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpinPolicy {
    /// Spin until the clock advances, however long that takes.
    #[default]
    Unbounded,
    /// Give up after this many clock re-reads.
    Bounded(u64),
}

impl SpinPolicy {
    /// Re-reads `time` until it reports a value strictly greater than
    /// `timestamp` and returns that value.
    ///
    /// Readings at or below `timestamp`, including ones that went backwards
    /// while spinning, keep the loop waiting.
    pub(crate) fn wait_past(self, timestamp: u64, time: &impl TimeSource) -> Result<u64> {
        #[cfg(feature = "tracing")]
        tracing::debug!(timestamp, policy = ?self, "sequence exhausted, spinning for next millisecond");

        let mut spins: u64 = 0;
        loop {
            let now = time.current_millis();
            if now > timestamp {
                return Ok(now);
            }
            if let Self::Bounded(limit) = self {
                if spins >= limit {
                    return Err(Self::cold_exhausted(timestamp, spins));
                }
            }
            spins += 1;
            core::hint::spin_loop();
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_exhausted(timestamp: u64, _spins: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(timestamp, spins = _spins, "clock did not advance within spin bound");
        Error::SequenceExhausted { timestamp }
    }
}
