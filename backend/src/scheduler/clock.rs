//! Wall-clock sources for the scheduler and the predictor.

use chrono::{Duration as ChronoDuration, NaiveDateTime, TimeZone};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Elapsed real time between two local wall times.
    fn duration_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Duration {
        (to - from).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Real time from `from` to `to`, both local wall times in `tz`.
///
/// Across a daylight-saving change this differs from the naive difference.
/// A repeated wall time resolves to its first occurrence. A wall time that
/// falls in a skipped hour resolves to the same time one hour later.
pub fn wall_clock_delay<Tz: TimeZone>(tz: &Tz, from: NaiveDateTime, to: NaiveDateTime) -> Duration {
    let resolve = |local: NaiveDateTime| {
        tz.from_local_datetime(&local)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(local + ChronoDuration::hours(1))).earliest())
    };
    match (resolve(from), resolve(to)) {
        (Some(from), Some(to)) => to
            .signed_duration_since(from)
            .to_std()
            .unwrap_or(Duration::ZERO),
        _ => (to - from).to_std().unwrap_or(Duration::ZERO),
    }
}

/// The process's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }

    fn duration_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Duration {
        wall_clock_delay(&chrono::Local, from, to)
    }
}

/// Test clock pinned to a start time that follows tokio's clock.
///
/// Under `tokio::time::pause()` the runtime auto-advances through sleeps, and
/// this clock advances with it, so jobs observe the wall time they were
/// scheduled for.
#[derive(Debug, Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

#[derive(Debug)]
struct FakeClockState {
    origin: NaiveDateTime,
    started: tokio::time::Instant,
}

impl FakeClock {
    pub fn new(origin: NaiveDateTime) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                origin,
                started: tokio::time::Instant::now(),
            })),
        }
    }

    /// Jump to a new wall time without moving tokio's clock.
    pub fn set(&self, now: NaiveDateTime) {
        let mut state = self.inner.lock();
        state.origin = now;
        state.started = tokio::time::Instant::now();
    }
}

impl Clock for FakeClock {
    fn now(&self) -> NaiveDateTime {
        let state = self.inner.lock();
        let elapsed = ChronoDuration::from_std(state.started.elapsed()).unwrap_or_else(|_| ChronoDuration::zero());
        state.origin + elapsed
    }
}
