use core::cell::Cell;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    SnowflakeId,
    generator::{IdGenStatus, IdGenerator, Result, SpinPolicy, state::WorkerNode},
    time::TimeSource,
};

/// A non-concurrent ID worker suitable for single-threaded use.
///
/// This worker is lightweight and fast, but **not thread-safe**: it keeps its
/// state in a [`Cell`], so it is neither `Sync` nor shareable across threads.
///
/// ## Recommended When
/// - You need a short-lived worker for a single request (e.g. one order
///   number)
/// - The worker never leaves the thread that created it
///
/// ## See Also
/// - [`LockIdWorker`]
///
/// [`LockIdWorker`]: crate::LockIdWorker
pub struct BasicIdWorker<T>
where
    T: TimeSource,
{
    node: WorkerNode,
    state: Cell<Option<SnowflakeId>>,
    spin_policy: SpinPolicy,
    time: T,
}

impl<T> BasicIdWorker<T>
where
    T: TimeSource,
{
    /// Creates a new worker for the given `(datacenter_id, worker_id)` pair.
    ///
    /// The worker has issued nothing yet, so its first ID always carries
    /// sequence zero.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatacenterIdOutOfRange`] or
    /// [`Error::WorkerIdOutOfRange`] if either value exceeds 31.
    ///
    /// # Example
    /// ```
    /// use idworker::{BasicIdWorker, IdGenerator, SystemClock, TWITTER_EPOCH};
    ///
    /// let worker = BasicIdWorker::new(1, 2, SystemClock::with_epoch(TWITTER_EPOCH)?)?;
    /// let id = worker.next_id()?;
    /// assert_eq!(id.datacenter_id(), 1);
    /// assert_eq!(id.worker_id(), 2);
    /// # Ok::<(), idworker::Error>(())
    /// ```
    ///
    /// [`Error::DatacenterIdOutOfRange`]: crate::Error::DatacenterIdOutOfRange
    /// [`Error::WorkerIdOutOfRange`]: crate::Error::WorkerIdOutOfRange
    pub fn new(datacenter_id: u64, worker_id: u64, time: T) -> Result<Self> {
        Ok(Self {
            node: WorkerNode::new(datacenter_id, worker_id)?,
            state: Cell::new(None),
            spin_policy: SpinPolicy::default(),
            time,
        })
    }

    /// Creates a worker that behaves as if it had last issued `sequence` at
    /// `timestamp`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`], plus [`Error::SequenceOutOfRange`] if `sequence`
    /// exceeds 4095 and [`Error::TimestampOverflow`] if `timestamp` does not
    /// fit in 41 bits.
    ///
    /// [`Error::SequenceOutOfRange`]: crate::Error::SequenceOutOfRange
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    pub fn from_components(
        timestamp: u64,
        datacenter_id: u64,
        worker_id: u64,
        sequence: u64,
        time: T,
    ) -> Result<Self> {
        let node = WorkerNode::new(datacenter_id, worker_id)?;
        let last = node.seed(timestamp, sequence)?;
        Ok(Self {
            node,
            state: Cell::new(Some(last)),
            spin_policy: SpinPolicy::default(),
            time,
        })
    }

    /// Replaces the spin policy used by [`Self::next_id`].
    #[must_use]
    pub fn with_spin_policy(mut self, spin_policy: SpinPolicy) -> Self {
        self.spin_policy = spin_policy;
        self
    }

    pub const fn spin_policy(&self) -> SpinPolicy {
        self.spin_policy
    }

    pub const fn datacenter_id(&self) -> u64 {
        self.node.datacenter_id()
    }

    pub const fn worker_id(&self) -> u64 {
        self.node.worker_id()
    }

    /// Generates the next ID, spinning through an exhausted millisecond.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let id = self
            .node
            .next(self.state.get(), &self.time, self.spin_policy)?;
        self.state.set(Some(id));
        Ok(id)
    }

    /// Attempts to generate the next ID without waiting.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::try_next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<IdGenStatus> {
        let status = self
            .node
            .poll(self.state.get(), self.time.current_millis())?;
        if let IdGenStatus::Ready { id } = status {
            self.state.set(Some(id));
        }
        Ok(status)
    }
}

impl<T> IdGenerator for BasicIdWorker<T>
where
    T: TimeSource,
{
    fn next_id(&self) -> Result<SnowflakeId> {
        self.next_id()
    }

    fn try_next_id(&self) -> Result<IdGenStatus> {
        self.try_next_id()
    }

    fn datacenter_id(&self) -> u64 {
        self.datacenter_id()
    }

    fn worker_id(&self) -> u64 {
        self.worker_id()
    }
}
