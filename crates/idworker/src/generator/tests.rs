use crate::{
    BasicIdWorker, Error, IdGenStatus, IdGenerator, LockIdWorker, SnowflakeId, SpinPolicy,
    SystemClock, TWITTER_EPOCH, TimeSource,
};
use core::time::Duration;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::scope;
use std::time::{SystemTime, UNIX_EPOCH};

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

/// Simulated wall clock: absolute UNIX milliseconds offset by an epoch.
struct WallMockTime {
    unix_millis: u64,
    epoch: Duration,
}

impl TimeSource for WallMockTime {
    fn current_millis(&self) -> u64 {
        self.unix_millis - self.epoch.as_millis() as u64
    }
}

/// A clock the test can move in either direction between calls.
#[derive(Clone)]
struct SettableTime {
    millis: Arc<AtomicU64>,
}

impl SettableTime {
    fn new(millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(millis)),
        }
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for SettableTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// Settable UNIX milliseconds, saturating to zero before the epoch the way
/// `SystemClock` does.
#[derive(Clone)]
struct SettableWallTime {
    unix_millis: Arc<AtomicU64>,
    epoch: Duration,
}

impl SettableWallTime {
    fn new(unix_millis: u64, epoch: Duration) -> Self {
        Self {
            unix_millis: Arc::new(AtomicU64::new(unix_millis)),
            epoch,
        }
    }

    fn set(&self, unix_millis: u64) {
        self.unix_millis.store(unix_millis, Ordering::SeqCst);
    }
}

impl TimeSource for SettableWallTime {
    fn current_millis(&self) -> u64 {
        self.unix_millis
            .load(Ordering::SeqCst)
            .saturating_sub(self.epoch.as_millis() as u64)
    }
}

/// Replays `values` one read at a time, then sticks on the last value.
struct ScriptedTime {
    values: Vec<u64>,
    index: AtomicUsize,
}

impl ScriptedTime {
    fn new(values: Vec<u64>) -> Self {
        Self {
            values,
            index: AtomicUsize::new(0),
        }
    }

    fn reads(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

impl TimeSource for ScriptedTime {
    fn current_millis(&self) -> u64 {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.values[i.min(self.values.len() - 1)]
    }
}

trait IdGenStatusExt {
    fn unwrap_ready(self) -> SnowflakeId;
    fn unwrap_pending(self) -> u64;
}

impl IdGenStatusExt for IdGenStatus {
    fn unwrap_ready(self) -> SnowflakeId {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for } => {
                panic!("unexpected pending (yield for: {yield_for})")
            }
        }
    }

    fn unwrap_pending(self) -> u64 {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id})"),
            Self::Pending { yield_for } => yield_for,
        }
    }
}

fn run_reference_scenario<G: IdGenerator>(generator: &G) {
    let first = generator.next_id().unwrap();
    assert_eq!(first.to_raw(), (1000 << 22) | (1 << 17) | (1 << 12));

    let second = generator.next_id().unwrap();
    assert_eq!(second.to_raw(), (1000 << 22) | (1 << 17) | (1 << 12) | 1);
}

fn run_id_sequence_increments_within_same_tick<G: IdGenerator>(generator: &G) {
    let id1 = generator.next_id().unwrap();
    let id2 = generator.next_id().unwrap();
    let id3 = generator.try_next_id().unwrap().unwrap_ready();

    assert_eq!(id1.timestamp(), 42);
    assert_eq!(id2.timestamp(), 42);
    assert_eq!(id3.timestamp(), 42);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

fn run_generator_returns_pending_when_sequence_exhausted<G: IdGenerator>(generator: &G) {
    let yield_for = generator.try_next_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);
    // Pending leaves the state alone.
    assert_eq!(generator.try_next_id().unwrap().unwrap_pending(), 1);
}

fn run_generator_waits_out_exhausted_tick<G: IdGenerator>(generator: &G, time: &ScriptedTime) {
    for i in 0..=SnowflakeId::max_sequence() {
        let id = generator.next_id().unwrap();
        assert_eq!(id.sequence(), i);
        assert_eq!(id.timestamp(), 42);
    }
    assert_eq!(time.reads(), 4096);

    // The 4097th call keeps re-reading the clock until it moves past 42.
    let id = generator.next_id().unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(time.reads(), 4096 + 4);
}

fn run_generator_rejects_clock_regression<G: IdGenerator>(generator: &G, time: &SettableTime) {
    let first = generator.next_id().unwrap();
    assert_eq!(first.timestamp(), 100);

    time.set(99);
    assert_eq!(
        generator.next_id().unwrap_err(),
        Error::ClockMovedBackwards { last: 100, now: 99 }
    );
    assert_eq!(
        generator.try_next_id().unwrap_err(),
        Error::ClockMovedBackwards { last: 100, now: 99 }
    );

    // Once the clock catches up, generation resumes where it left off.
    time.set(100);
    let resumed = generator.next_id().unwrap();
    assert_eq!(resumed.timestamp(), 100);
    assert_eq!(resumed.sequence(), 1);
    assert!(resumed > first);
}

fn run_generator_rejects_clock_before_epoch<G: IdGenerator>(
    generator: &G,
    time: &SettableWallTime,
) {
    let epoch = TWITTER_EPOCH.as_millis() as u64;

    // The last tick is full, so a saturated reading must fail instead of
    // waiting for a zero clock to pass the last timestamp.
    time.set(epoch - 60_000);
    assert_eq!(
        generator.next_id().unwrap_err(),
        Error::ClockMovedBackwards { last: 5_000, now: 0 }
    );
    assert_eq!(
        generator.try_next_id().unwrap_err(),
        Error::ClockMovedBackwards { last: 5_000, now: 0 }
    );

    time.set(epoch + 5_001);
    let resumed = generator.next_id().unwrap();
    assert_eq!(resumed.timestamp(), 5_001);
    assert_eq!(resumed.sequence(), 0);
}

fn run_generator_gives_up_with_bounded_spin<G: IdGenerator>(generator: &G) {
    assert_eq!(
        generator.next_id().unwrap_err(),
        Error::SequenceExhausted { timestamp: 7 }
    );
}

fn run_generator_monotonic<G: IdGenerator>(generator: &G) {
    const TOTAL_IDS: usize = 4096 * 64;

    let mut last: Option<SnowflakeId> = None;
    let mut sequence = 0;

    for _ in 0..TOTAL_IDS {
        let id = generator.next_id().unwrap();
        if let Some(last) = last {
            assert!(id > last, "{id:?} not after {last:?}");
            if id.timestamp() > last.timestamp() {
                sequence = 0;
            }
        }
        assert_eq!(id.datacenter_id(), generator.datacenter_id());
        assert_eq!(id.worker_id(), generator.worker_id());
        assert_eq!(id.sequence(), sequence);

        sequence += 1;
        last = Some(id);
    }
}

#[test]
fn basic_worker_reference_scenario() {
    let time = WallMockTime {
        unix_millis: 1_288_834_974_657 + 1000,
        epoch: TWITTER_EPOCH,
    };
    let generator = BasicIdWorker::new(1, 1, time).unwrap();
    run_reference_scenario(&generator);
}

#[test]
fn lock_worker_reference_scenario() {
    let time = WallMockTime {
        unix_millis: 1_288_834_974_657 + 1000,
        epoch: TWITTER_EPOCH,
    };
    let generator = LockIdWorker::new(1, 1, time).unwrap();
    run_reference_scenario(&generator);
}

#[test]
fn basic_worker_sequence_test() {
    let generator = BasicIdWorker::new(0, 0, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn lock_worker_sequence_test() {
    let generator = LockIdWorker::new(0, 0, MockTime { millis: 42 }).unwrap();
    run_id_sequence_increments_within_same_tick(&generator);
}

#[test]
fn basic_worker_pending_test() {
    let generator = BasicIdWorker::from_components(
        0,
        0,
        0,
        SnowflakeId::max_sequence(),
        MockTime { millis: 0 },
    )
    .unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn lock_worker_pending_test() {
    let generator = LockIdWorker::from_components(
        0,
        0,
        0,
        SnowflakeId::max_sequence(),
        MockTime { millis: 0 },
    )
    .unwrap();
    run_generator_returns_pending_when_sequence_exhausted(&generator);
}

#[test]
fn basic_worker_waits_out_exhausted_tick() {
    let mut values = vec![42; 4096 + 3];
    values.push(43);
    let time = Arc::new(ScriptedTime::new(values));
    let generator = BasicIdWorker::new(1, 1, Arc::clone(&time)).unwrap();
    run_generator_waits_out_exhausted_tick(&generator, &time);
}

#[test]
fn lock_worker_waits_out_exhausted_tick() {
    let mut values = vec![42; 4096 + 3];
    values.push(43);
    let time = Arc::new(ScriptedTime::new(values));
    let generator = LockIdWorker::new(1, 1, Arc::clone(&time)).unwrap();
    run_generator_waits_out_exhausted_tick(&generator, &time);
}

#[test]
fn basic_worker_rejects_clock_regression() {
    let time = SettableTime::new(100);
    let generator = BasicIdWorker::new(3, 4, time.clone()).unwrap();
    run_generator_rejects_clock_regression(&generator, &time);
}

#[test]
fn lock_worker_rejects_clock_regression() {
    let time = SettableTime::new(100);
    let generator = LockIdWorker::new(3, 4, time.clone()).unwrap();
    run_generator_rejects_clock_regression(&generator, &time);
}

#[test]
fn basic_worker_rejects_clock_before_epoch() {
    let time = SettableWallTime::new(TWITTER_EPOCH.as_millis() as u64 + 5_000, TWITTER_EPOCH);
    let generator =
        BasicIdWorker::from_components(5_000, 3, 4, SnowflakeId::max_sequence(), time.clone())
            .unwrap();
    run_generator_rejects_clock_before_epoch(&generator, &time);
}

#[test]
fn lock_worker_rejects_clock_before_epoch() {
    let time = SettableWallTime::new(TWITTER_EPOCH.as_millis() as u64 + 5_000, TWITTER_EPOCH);
    let generator =
        LockIdWorker::from_components(5_000, 3, 4, SnowflakeId::max_sequence(), time.clone())
            .unwrap();
    run_generator_rejects_clock_before_epoch(&generator, &time);
}

#[test]
fn system_clock_refuses_future_epoch_before_any_id() {
    let unix_now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    let future = unix_now + Duration::from_secs(3600);
    assert!(matches!(
        SystemClock::with_epoch(future),
        Err(Error::EpochInFuture { .. })
    ));
}

#[test]
fn new_tick_rolls_over_the_last_id() {
    let time = SettableTime::new(5);
    let generator = LockIdWorker::from_components(5, 2, 3, 9, time.clone()).unwrap();
    time.set(6);
    let id = generator.next_id().unwrap();
    assert_eq!(
        id,
        SnowflakeId::from_components(5, 2, 3, 9).rollover_to_timestamp(6)
    );
    assert_eq!(id, SnowflakeId::from_components(6, 2, 3, 0));
}

#[test]
fn basic_worker_bounded_spin_test() {
    let generator =
        BasicIdWorker::from_components(7, 1, 1, SnowflakeId::max_sequence(), MockTime { millis: 7 })
            .unwrap()
            .with_spin_policy(SpinPolicy::Bounded(100));
    assert_eq!(generator.spin_policy(), SpinPolicy::Bounded(100));
    run_generator_gives_up_with_bounded_spin(&generator);
}

#[test]
fn lock_worker_bounded_spin_test() {
    let generator =
        LockIdWorker::from_components(7, 1, 1, SnowflakeId::max_sequence(), MockTime { millis: 7 })
            .unwrap()
            .with_spin_policy(SpinPolicy::Bounded(100));
    run_generator_gives_up_with_bounded_spin(&generator);
    // The lock is released after the failure.
    run_generator_gives_up_with_bounded_spin(&generator);
}

#[test]
fn construction_rejects_out_of_range_ids() {
    let time = MockTime { millis: 0 };
    assert_eq!(
        BasicIdWorker::new(32, 0, &time).err(),
        Some(Error::DatacenterIdOutOfRange { value: 32, max: 31 })
    );
    assert_eq!(
        BasicIdWorker::new(0, 32, &time).err(),
        Some(Error::WorkerIdOutOfRange { value: 32, max: 31 })
    );
    assert_eq!(
        LockIdWorker::new(u64::MAX, 0, &time).err(),
        Some(Error::DatacenterIdOutOfRange {
            value: u64::MAX,
            max: 31
        })
    );
    assert_eq!(
        LockIdWorker::from_components(0, 0, 0, 4096, &time).err(),
        Some(Error::SequenceOutOfRange {
            value: 4096,
            max: 4095
        })
    );
    assert!(BasicIdWorker::new(31, 31, &time).is_ok());
    assert!(LockIdWorker::new(0, 0, &time).is_ok());
}

#[test]
fn timestamp_overflow_is_an_error() {
    let max = SnowflakeId::max_timestamp();
    let generator = BasicIdWorker::new(0, 0, MockTime { millis: max + 1 }).unwrap();
    assert_eq!(
        generator.next_id().unwrap_err(),
        Error::TimestampOverflow {
            timestamp: max + 1,
            max
        }
    );

    let generator = BasicIdWorker::new(0, 0, MockTime { millis: max }).unwrap();
    assert_eq!(generator.next_id().unwrap().timestamp(), max);
}

#[test]
fn first_id_starts_at_sequence_zero_even_at_time_zero() {
    let generator = BasicIdWorker::new(0, 0, MockTime { millis: 0 }).unwrap();
    let id = generator.next_id().unwrap();
    assert_eq!(id.timestamp(), 0);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn distinct_workers_never_collide() {
    let time = MockTime { millis: 500 };
    let a = BasicIdWorker::new(1, 1, &time).unwrap();
    let b = BasicIdWorker::new(1, 2, &time).unwrap();
    let c = BasicIdWorker::new(2, 1, &time).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..=SnowflakeId::max_sequence() {
        assert!(seen.insert(a.next_id().unwrap()));
        assert!(seen.insert(b.next_id().unwrap()));
        assert!(seen.insert(c.next_id().unwrap()));
    }
    assert_eq!(seen.len(), 3 * 4096);
}

#[test]
fn decoded_fields_match_construction() {
    let before = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    let generator = LockIdWorker::new(17, 9, SystemClock::with_epoch(TWITTER_EPOCH).unwrap()).unwrap();
    let id = generator.next_id().unwrap();
    let after = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();

    let decoded = SnowflakeId::from_raw(id.to_raw());
    assert_eq!(decoded.datacenter_id(), 17);
    assert_eq!(decoded.worker_id(), 9);

    let absolute = 1_288_834_974_657 + (id.to_raw() >> 22);
    assert_eq!(absolute, id.timestamp_millis(TWITTER_EPOCH));
    assert!(absolute >= before.as_millis() as u64);
    assert!(absolute <= after.as_millis() as u64);
}

#[test]
fn basic_worker_system_clock_monotonic() {
    let generator = BasicIdWorker::new(1, 1, SystemClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn lock_worker_system_clock_monotonic() {
    let generator = LockIdWorker::new(1, 1, SystemClock::default()).unwrap();
    run_generator_monotonic(&generator);
}

#[test]
fn lock_worker_concurrent_callers_get_distinct_ids() {
    const THREADS: usize = 10;
    const IDS_PER_THREAD: usize = 500;
    const TOTAL_IDS: usize = THREADS * IDS_PER_THREAD;

    let generator = Arc::new(LockIdWorker::new(1, 1, SystemClock::default()).unwrap());
    let issued = Arc::new(Mutex::new(Vec::with_capacity(TOTAL_IDS)));

    scope(|s| {
        for _ in 0..THREADS {
            let generator = Arc::clone(&generator);
            let issued = Arc::clone(&issued);

            s.spawn(move || {
                let mut local = Vec::with_capacity(IDS_PER_THREAD);
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.next_id().unwrap();
                    // Each thread observes its own IDs in increasing order.
                    if let Some(prev) = local.last() {
                        assert!(id > *prev);
                    }
                    local.push(id);
                }
                issued.lock().unwrap().extend(local);
            });
        }
    });

    let mut ids = Arc::try_unwrap(issued).unwrap().into_inner().unwrap();
    ids.sort();

    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), TOTAL_IDS, "expected {TOTAL_IDS} unique IDs");

    let pairs: HashSet<_> = ids.iter().map(|id| (id.timestamp(), id.sequence())).collect();
    assert_eq!(pairs.len(), TOTAL_IDS);

    for window in ids.windows(2) {
        let (a, b) = (window[0], window[1]);
        assert!((a.timestamp(), a.sequence()) < (b.timestamp(), b.sequence()));
    }
}

#[test]
fn lock_worker_threaded_heavy_load() {
    let threads = num_cpus::get().clamp(2, 8);
    let ids_per_thread = 4096 * 16;
    let total_ids = threads * ids_per_thread;

    let generator = Arc::new(LockIdWorker::new(2, 3, SystemClock::default()).unwrap());
    let seen_ids = Arc::new(Mutex::new(HashSet::with_capacity(total_ids)));

    scope(|s| {
        for _ in 0..threads {
            let generator = Arc::clone(&generator);
            let seen_ids = Arc::clone(&seen_ids);

            s.spawn(move || {
                for _ in 0..ids_per_thread {
                    let id = generator.next_id().unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    let final_count = seen_ids.lock().unwrap().len();
    assert_eq!(final_count, total_ids, "expected {total_ids} unique IDs");
}

#[test]
fn shared_through_arc_and_reference() {
    let generator = Arc::new(BasicIdWorker::new(5, 6, MockTime { millis: 9 }).unwrap());
    let first = IdGenerator::next_id(&generator).unwrap();
    let second = IdGenerator::next_id(&generator.as_ref()).unwrap();
    assert_eq!(first.sequence(), 0);
    assert_eq!(second.sequence(), 1);
    assert_eq!(IdGenerator::datacenter_id(&generator), 5);
    assert_eq!(IdGenerator::worker_id(&generator), 6);
}
