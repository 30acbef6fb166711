use crate::SnowflakeId;

/// The outcome of a non-blocking generation attempt.
///
/// - [`IdGenStatus::Ready`] carries a newly issued ID.
/// - [`IdGenStatus::Pending`] means all 4096 sequence numbers of the current
///   millisecond are spent; retry once `yield_for` milliseconds have passed.
///
/// # Example
///
/// ```
/// use idworker::{BasicIdWorker, IdGenStatus, SnowflakeId, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let worker = BasicIdWorker::from_components(1, 0, 0, SnowflakeId::max_sequence(), FixedTime)?;
/// match worker.try_next_id()? {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for {yield_for} ms"),
/// }
/// # Ok::<(), idworker::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current millisecond.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}
