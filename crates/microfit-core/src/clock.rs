//! Wall-clock sources.
//!
//! The timer never accumulates elapsed time itself; it asks a [`Clock`] for
//! the current instant and recomputes from its anchor. Injecting the clock
//! lets tests drive a virtual timeline instead of sleeping.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

pub trait Clock: Send + Sync {
    /// Current wall-clock instant.
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date in local time at `now()`. Daily stats are keyed by this.
    fn local_date(&self) -> NaiveDate {
        self.now().with_timezone(&Local).date_naive()
    }
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    offset: FixedOffset,
}

/// A virtual clock that only moves when told to.
///
/// Clones share the same timeline, so a test can hand one clone to the
/// timer and keep another to advance time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    /// A clock at `start` whose local dates are computed in UTC.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self::with_offset(start, Utc.fix())
    }

    /// A clock at `start` whose local dates use the given UTC offset.
    pub fn with_offset(start: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualState { now: start, offset })),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.with_state(|s| s.now = now);
    }

    pub fn advance(&self, by: Duration) {
        self.with_state(|s| s.now += by);
    }

    /// Move the clock by whole seconds. Negative values move it backwards.
    pub fn advance_secs(&self, secs: i64) {
        self.advance(Duration::seconds(secs));
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ManualState) -> R) -> R {
        // A poisoned lock only means another test thread panicked mid-update;
        // the timestamp itself is still usable.
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.with_state(|s| s.now)
    }

    fn local_date(&self) -> NaiveDate {
        self.with_state(|s| s.now.with_timezone(&s.offset).date_naive())
    }
}
