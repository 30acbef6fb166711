use std::sync::Arc;

use crate::{
    SnowflakeId,
    generator::{IdGenStatus, Result},
};

/// A minimal interface for minting Snowflake IDs.
///
/// Callers must treat the returned IDs as opaque, unique, time-ordered
/// integers: consecutive IDs are not guaranteed to be adjacent or dense.
pub trait IdGenerator {
    /// Generates the next ID, spinning through an exhausted millisecond if
    /// necessary.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackwards`] if the clock reads earlier than the
    ///   last issued timestamp.
    /// - [`Error::SequenceExhausted`] if a bounded spin gave up.
    /// - [`Error::TimestampOverflow`] if the clock is past the 41-bit range.
    /// - [`Error::LockPoisoned`] for a poisoned std mutex.
    ///
    /// [`Error::ClockMovedBackwards`]: crate::Error::ClockMovedBackwards
    /// [`Error::SequenceExhausted`]: crate::Error::SequenceExhausted
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error
    fn next_id(&self) -> Result<SnowflakeId>;

    /// Attempts to generate the next ID without waiting.
    ///
    /// Returns [`IdGenStatus::Pending`] instead of spinning when the current
    /// millisecond is exhausted. Errors are the same as [`Self::next_id`]
    /// minus `SequenceExhausted`.
    ///
    /// # Errors
    ///
    /// See [`Self::next_id`].
    fn try_next_id(&self) -> Result<IdGenStatus>;

    /// The datacenter ID encoded into every ID from this generator.
    fn datacenter_id(&self) -> u64;

    /// The worker ID encoded into every ID from this generator.
    fn worker_id(&self) -> u64;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &G {
    fn next_id(&self) -> Result<SnowflakeId> {
        (**self).next_id()
    }

    fn try_next_id(&self) -> Result<IdGenStatus> {
        (**self).try_next_id()
    }

    fn datacenter_id(&self) -> u64 {
        (**self).datacenter_id()
    }

    fn worker_id(&self) -> u64 {
        (**self).worker_id()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Arc<G> {
    fn next_id(&self) -> Result<SnowflakeId> {
        (**self).next_id()
    }

    fn try_next_id(&self) -> Result<IdGenStatus> {
        (**self).try_next_id()
    }

    fn datacenter_id(&self) -> u64 {
        (**self).datacenter_id()
    }

    fn worker_id(&self) -> u64 {
        (**self).worker_id()
    }
}
