//! Periodic tick sources.
//!
//! A [`PeriodicTrigger`] registers a recurring tick and hands back a
//! [`TriggerHandle`]. The controller keeps at most one registration alive
//! and drops ticks carrying any other handle, so a tick that was already
//! queued when its registration was cancelled never reaches the timer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Nominal tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriggerHandle(u64);

impl TriggerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait PeriodicTrigger {
    /// Start delivering ticks every `period`.
    fn schedule(&mut self, period: Duration) -> TriggerHandle;

    /// Stop a registration. Unknown or already cancelled handles are ignored.
    fn cancel(&mut self, handle: TriggerHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    active: Vec<(TriggerHandle, Duration)>,
    scheduled_total: usize,
}

/// Trigger that never fires on its own. Tests call the controller's
/// `on_tick` with [`ManualTrigger::active`] after moving a virtual clock.
///
/// Clones share the same registrations.
#[derive(Debug, Clone, Default)]
pub struct ManualTrigger {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single live registration, if exactly one exists.
    pub fn active(&self) -> Option<TriggerHandle> {
        self.with_state(|s| match s.active.as_slice() {
            [(handle, _)] => Some(*handle),
            _ => None,
        })
    }

    pub fn active_count(&self) -> usize {
        self.with_state(|s| s.active.len())
    }

    /// How many registrations were ever made.
    pub fn scheduled_total(&self) -> usize {
        self.with_state(|s| s.scheduled_total)
    }

    pub fn period_of(&self, handle: TriggerHandle) -> Option<Duration> {
        self.with_state(|s| {
            s.active
                .iter()
                .find(|(h, _)| *h == handle)
                .map(|(_, period)| *period)
        })
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ManualState) -> R) -> R {
        let mut guard = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl PeriodicTrigger for ManualTrigger {
    fn schedule(&mut self, period: Duration) -> TriggerHandle {
        self.with_state(|s| {
            s.next_id += 1;
            s.scheduled_total += 1;
            let handle = TriggerHandle(s.next_id);
            s.active.push((handle, period));
            handle
        })
    }

    fn cancel(&mut self, handle: TriggerHandle) {
        self.with_state(|s| s.active.retain(|(h, _)| *h != handle));
    }
}

/// Trigger backed by tokio intervals.
///
/// Each registration spawns a task that sends its handle on the channel
/// once per period. Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioTrigger {
    tx: mpsc::UnboundedSender<TriggerHandle>,
    next_id: u64,
    tasks: HashMap<TriggerHandle, JoinHandle<()>>,
}

impl TokioTrigger {
    /// Create the trigger and the receiving end its ticks arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TriggerHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                next_id: 0,
                tasks: HashMap::new(),
            },
            rx,
        )
    }
}

impl PeriodicTrigger for TokioTrigger {
    fn schedule(&mut self, period: Duration) -> TriggerHandle {
        self.next_id += 1;
        let handle = TriggerHandle(self.next_id);
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; the timer's first sample
            // is due one period after the registration.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(handle).is_err() {
                    break;
                }
            }
        });
        debug!(handle = handle.0, ?period, "trigger scheduled");
        self.tasks.insert(handle, task);
        handle
    }

    fn cancel(&mut self, handle: TriggerHandle) {
        if let Some(task) = self.tasks.remove(&handle) {
            task.abort();
            debug!(handle = handle.0, "trigger cancelled");
        }
    }
}

impl Drop for TokioTrigger {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
