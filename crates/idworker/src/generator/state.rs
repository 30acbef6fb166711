use core::cmp::Ordering;

use crate::{
    SnowflakeId,
    generator::{Error, IdGenStatus, Result, SpinPolicy},
    time::TimeSource,
};

/// The validated, immutable half of a worker: its `(datacenter, worker)`
/// pair. The mutable half is the last issued ID, which each generator stores
/// in its own cell or mutex and passes in here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WorkerNode {
    datacenter_id: u64,
    worker_id: u64,
}

impl WorkerNode {
    pub(crate) fn new(datacenter_id: u64, worker_id: u64) -> Result<Self> {
        if datacenter_id > SnowflakeId::max_datacenter_id() {
            return Err(Error::DatacenterIdOutOfRange {
                value: datacenter_id,
                max: SnowflakeId::max_datacenter_id(),
            });
        }
        if worker_id > SnowflakeId::max_worker_id() {
            return Err(Error::WorkerIdOutOfRange {
                value: worker_id,
                max: SnowflakeId::max_worker_id(),
            });
        }
        Ok(Self {
            datacenter_id,
            worker_id,
        })
    }

    pub(crate) const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    pub(crate) const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Builds the state a generator resumes from, as if it had last issued
    /// `sequence` at `timestamp`.
    pub(crate) fn seed(&self, timestamp: u64, sequence: u64) -> Result<SnowflakeId> {
        if sequence > SnowflakeId::max_sequence() {
            return Err(Error::SequenceOutOfRange {
                value: sequence,
                max: SnowflakeId::max_sequence(),
            });
        }
        Self::check_timestamp(timestamp)?;
        Ok(SnowflakeId::from_components(
            timestamp,
            self.datacenter_id,
            self.worker_id,
            sequence,
        ))
    }

    /// One non-blocking generation step at time `now`.
    pub(crate) fn poll(&self, last: Option<SnowflakeId>, now: u64) -> Result<IdGenStatus> {
        let Some(last) = last else {
            return Ok(IdGenStatus::Ready {
                id: self.fresh(now)?,
            });
        };

        let last_ts = last.timestamp();
        match now.cmp(&last_ts) {
            Ordering::Equal => {
                if last.has_sequence_room() {
                    Ok(IdGenStatus::Ready {
                        id: last.increment_sequence(),
                    })
                } else {
                    Ok(IdGenStatus::Pending { yield_for: 1 })
                }
            }
            Ordering::Greater => Ok(IdGenStatus::Ready {
                id: Self::rollover(last, now)?,
            }),
            Ordering::Less => Err(Self::cold_clock_behind(last_ts, now)),
        }
    }

    /// One blocking generation step: reads the clock and, if the current
    /// millisecond is exhausted, spins per `spin` until it is not.
    pub(crate) fn next<T: TimeSource>(
        &self,
        last: Option<SnowflakeId>,
        time: &T,
        spin: SpinPolicy,
    ) -> Result<SnowflakeId> {
        match self.poll(last, time.current_millis())? {
            IdGenStatus::Ready { id } => Ok(id),
            IdGenStatus::Pending { .. } => match last {
                Some(last) => {
                    let now = spin.wait_past(last.timestamp(), time)?;
                    Self::rollover(last, now)
                }
                // Pending is only returned once `last` exists.
                None => self.fresh(time.current_millis()),
            },
        }
    }

    fn fresh(&self, now: u64) -> Result<SnowflakeId> {
        Self::check_timestamp(now)?;
        Ok(SnowflakeId::from_components(
            now,
            self.datacenter_id,
            self.worker_id,
            0,
        ))
    }

    fn rollover(last: SnowflakeId, now: u64) -> Result<SnowflakeId> {
        Self::check_timestamp(now)?;
        Ok(last.rollover_to_timestamp(now))
    }

    fn check_timestamp(timestamp: u64) -> Result<()> {
        if timestamp > SnowflakeId::max_timestamp() {
            return Err(Error::TimestampOverflow {
                timestamp,
                max: SnowflakeId::max_timestamp(),
            });
        }
        Ok(())
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last: u64, now: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            last,
            now,
            behind_ms = last - now,
            "clock moved backwards, refusing to generate id"
        );
        Error::ClockMovedBackwards { last, now }
    }
}
