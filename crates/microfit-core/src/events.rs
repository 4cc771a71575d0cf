use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, TimerStatus};

/// Every state change in the timer produces an Event.
/// The stats aggregator and the notifier consume them; the CLI prints them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A fresh phase instance began running from its full duration.
    TimerStarted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase completed with auto-switch off; the timer waits for `start()`.
    TimerStopped {
        phase: Phase,
        at: DateTime<Utc>,
    },
    /// Manual phase flip.
    ModeSwitched {
        from: Phase,
        to: Phase,
        duration_secs: u64,
        status: TimerStatus,
        at: DateTime<Utc>,
    },
    /// One sampled second of running time in `phase`.
    SecondElapsed {
        phase: Phase,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Auto-switch started the next phase.
    PhaseStarted {
        phase: Phase,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StatsReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        phase: Phase,
        remaining_secs: u64,
        total_secs: u64,
        progress_pct: f64,
        completed_sessions: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::TimerStopped { at, .. }
            | Event::ModeSwitched { at, .. }
            | Event::SecondElapsed { at, .. }
            | Event::PhaseCompleted { at, .. }
            | Event::PhaseStarted { at, .. }
            | Event::StatsReset { at }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}
