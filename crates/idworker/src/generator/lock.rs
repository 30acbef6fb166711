#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    SnowflakeId,
    generator::{
        IdGenStatus, IdGenerator, Mutex, MutexGuard, Result, SpinPolicy, state::WorkerNode,
    },
    time::TimeSource,
};

/// A lock-based ID worker suitable for multi-threaded environments.
///
/// The last issued ID lives behind a single [`Mutex`]. Every call holds the
/// lock from the clock read to the state update, including any spin through
/// an exhausted millisecond, so concurrent callers never interleave and the
/// IDs handed out are strictly increasing in lock-acquisition order.
///
/// Share one instance between threads with an [`Arc`](std::sync::Arc).
///
/// ## Recommended When
/// - Many threads mint IDs for the same `(datacenter, worker)` pair
/// - The worker lives as long as the process
///
/// ## See Also
/// - [`BasicIdWorker`]
///
/// [`BasicIdWorker`]: crate::BasicIdWorker
pub struct LockIdWorker<T>
where
    T: TimeSource,
{
    node: WorkerNode,
    state: Mutex<Option<SnowflakeId>>,
    spin_policy: SpinPolicy,
    time: T,
}

impl<T> LockIdWorker<T>
where
    T: TimeSource,
{
    /// Creates a new worker for the given `(datacenter_id, worker_id)` pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DatacenterIdOutOfRange`] or
    /// [`Error::WorkerIdOutOfRange`] if either value exceeds 31.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use idworker::{IdGenerator, LockIdWorker, SystemClock};
    ///
    /// let worker = Arc::new(LockIdWorker::new(1, 1, SystemClock::default())?);
    ///
    /// let handles: Vec<_> = (0..4)
    ///     .map(|_| {
    ///         let worker = Arc::clone(&worker);
    ///         std::thread::spawn(move || worker.next_id())
    ///     })
    ///     .collect();
    ///
    /// for handle in handles {
    ///     assert_eq!(handle.join().unwrap()?.worker_id(), 1);
    /// }
    /// # Ok::<(), idworker::Error>(())
    /// ```
    ///
    /// [`Error::DatacenterIdOutOfRange`]: crate::Error::DatacenterIdOutOfRange
    /// [`Error::WorkerIdOutOfRange`]: crate::Error::WorkerIdOutOfRange
    pub fn new(datacenter_id: u64, worker_id: u64, time: T) -> Result<Self> {
        Ok(Self {
            node: WorkerNode::new(datacenter_id, worker_id)?,
            state: Mutex::new(None),
            spin_policy: SpinPolicy::default(),
            time,
        })
    }

    /// Creates a worker that behaves as if it had last issued `sequence` at
    /// `timestamp`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`], plus [`Error::SequenceOutOfRange`] and
    /// [`Error::TimestampOverflow`] for out-of-range seeds.
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
            state: Mutex::new(Some(last)),
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

    /// Generates the next ID, spinning through an exhausted millisecond while
    /// holding the lock.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> Result<SnowflakeId> {
        let mut last = self.lock()?;
        let id = self.node.next(*last, &self.time, self.spin_policy)?;
        *last = Some(id);
        Ok(id)
    }

    /// Attempts to generate the next ID without waiting.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::try_next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<IdGenStatus> {
        let mut last = self.lock()?;
        let status = self.node.poll(*last, self.time.current_millis())?;
        if let IdGenStatus::Ready { id } = status {
            *last = Some(id);
        }
        Ok(status)
    }

    // The clock must be read under the lock: a reading taken before
    // acquiring it can be older than an ID another thread just issued, which
    // would look like a clock regression.
    #[allow(clippy::unnecessary_wraps)]
    fn lock(&self) -> Result<MutexGuard<'_, Option<SnowflakeId>>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }
}

impl<T> IdGenerator for LockIdWorker<T>
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
