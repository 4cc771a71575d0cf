//! Session timer implementation.
//!
//! The timer is a wall-clock-anchored state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically. Remaining time is always recomputed from the anchor,
//! never decremented, so late or missed ticks cannot introduce drift.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running
//!               |
//!               +-> (phase complete) -> Running (auto-switch) | Stopped
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new(DurationConfig::default(), clock);
//! timer.start();
//! // Once per second:
//! for event in timer.tick() { /* feed stats and notifier */ }
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::durations::{DurationConfig, Phase};
use crate::clock::Clock;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Stopped,
    Running,
    Paused,
}

/// Core session timer.
///
/// Lives for one app session only; live countdown state is never persisted.
pub struct SessionTimer {
    config: DurationConfig,
    clock: Arc<dyn Clock>,
    phase: Phase,
    status: TimerStatus,
    /// Duration of the current phase instance in seconds.
    total_secs: u64,
    /// When the current running interval began (only set while Running).
    anchor: Option<DateTime<Utc>>,
    /// Remaining time captured at pause (only set while Paused).
    paused_remaining_secs: Option<u64>,
    /// Remaining time shown while Stopped: the full pending phase, or 0
    /// after a phase completed without auto-switch.
    stopped_remaining_secs: u64,
    completed_sessions: u64,
}

impl SessionTimer {
    /// Create a stopped timer with a full Focus phase pending.
    pub fn new(config: DurationConfig, clock: Arc<dyn Clock>) -> Self {
        let total_secs = config.duration_for(Phase::Focus);
        Self {
            config,
            clock,
            phase: Phase::Focus,
            status: TimerStatus::Stopped,
            total_secs,
            anchor: None,
            paused_remaining_secs: None,
            stopped_remaining_secs: total_secs,
            completed_sessions: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn config(&self) -> &DurationConfig {
        &self.config
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn anchor(&self) -> Option<DateTime<Utc>> {
        self.anchor
    }

    pub fn paused_remaining_secs(&self) -> Option<u64> {
        self.paused_remaining_secs
    }

    pub fn completed_sessions(&self) -> u64 {
        self.completed_sessions
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_at(self.clock.now())
    }

    /// 0.0 .. 100.0 share of the current phase instance already elapsed.
    pub fn progress_pct(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        let elapsed = self.total_secs.saturating_sub(self.remaining_secs());
        (elapsed as f64 / self.total_secs as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status,
            phase: self.phase,
            remaining_secs: self.remaining_secs(),
            total_secs: self.total_secs,
            progress_pct: self.progress_pct(),
            completed_sessions: self.completed_sessions,
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a fresh phase from `Stopped`, or resume from `Paused`.
    /// No-op while already running.
    pub fn start(&mut self) -> Option<Event> {
        let now = self.clock.now();
        match self.status {
            TimerStatus::Stopped => {
                self.total_secs = self.config.duration_for(self.phase);
                self.anchor = Some(now);
                self.paused_remaining_secs = None;
                self.status = TimerStatus::Running;
                debug!(phase = ?self.phase, duration_secs = self.total_secs, "timer started");
                Some(Event::TimerStarted {
                    phase: self.phase,
                    duration_secs: self.total_secs,
                    at: now,
                })
            }
            TimerStatus::Paused => {
                let remaining = self.paused_remaining_secs.take().unwrap_or(self.total_secs);
                let elapsed = self.total_secs.saturating_sub(remaining);
                self.anchor = Some(now - Duration::seconds(elapsed as i64));
                self.status = TimerStatus::Running;
                debug!(phase = ?self.phase, remaining_secs = remaining, "timer resumed");
                Some(Event::TimerResumed {
                    phase: self.phase,
                    remaining_secs: remaining,
                    at: now,
                })
            }
            TimerStatus::Running => None,
        }
    }

    /// Resume a paused timer. No-op in any other state.
    pub fn resume(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Paused => self.start(),
            _ => None,
        }
    }

    /// Capture the remaining time and stop the clock. No-op unless running.
    pub fn pause(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let now = self.clock.now();
        let remaining = self.remaining_at(now);
        self.paused_remaining_secs = Some(remaining);
        self.anchor = None;
        self.status = TimerStatus::Paused;
        debug!(phase = ?self.phase, remaining_secs = remaining, "timer paused");
        Some(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: remaining,
            at: now,
        })
    }

    /// Pause when running, otherwise start or resume.
    pub fn toggle(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Running => self.pause(),
            TimerStatus::Paused | TimerStatus::Stopped => self.start(),
        }
    }

    /// Flip the phase immediately, discarding whatever remained of the old one.
    ///
    /// A running timer restarts the new phase from its full duration. A
    /// paused or stopped timer is left stopped with the full new phase pending.
    pub fn switch_mode(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let from = self.phase;
        self.phase = from.flipped();
        self.total_secs = self.config.duration_for(self.phase);
        self.paused_remaining_secs = None;
        match self.status {
            TimerStatus::Running => {
                self.anchor = Some(now);
            }
            TimerStatus::Paused | TimerStatus::Stopped => {
                self.anchor = None;
                self.status = TimerStatus::Stopped;
                self.stopped_remaining_secs = self.total_secs;
            }
        }
        debug!(?from, to = ?self.phase, status = ?self.status, "mode switched");
        Some(Event::ModeSwitched {
            from,
            to: self.phase,
            duration_secs: self.total_secs,
            status: self.status,
            at: now,
        })
    }

    /// Sample the clock. Call once per period while running.
    ///
    /// Emits `SecondElapsed` for the active phase, and on reaching zero
    /// `PhaseCompleted` followed by `PhaseStarted` (auto-switch) or
    /// `TimerStopped`. A single tick completes at most one phase.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.status != TimerStatus::Running {
            return Vec::new();
        }
        let now = self.clock.now();
        let mut events = vec![Event::SecondElapsed {
            phase: self.phase,
            at: now,
        }];
        if self.remaining_at(now) > 0 {
            return events;
        }

        let finished = self.phase;
        events.push(Event::PhaseCompleted {
            phase: finished,
            duration_secs: self.total_secs,
            at: now,
        });
        if finished == Phase::Focus {
            self.completed_sessions += 1;
        }
        info!(phase = ?finished, completed_sessions = self.completed_sessions, "phase completed");

        if self.config.auto_switch() {
            self.phase = finished.flipped();
            self.total_secs = self.config.duration_for(self.phase);
            self.anchor = Some(now);
            events.push(Event::PhaseStarted {
                phase: self.phase,
                duration_secs: self.total_secs,
                at: now,
            });
        } else {
            self.status = TimerStatus::Stopped;
            self.anchor = None;
            self.stopped_remaining_secs = 0;
            events.push(Event::TimerStopped {
                phase: finished,
                at: now,
            });
        }
        events
    }

    /// Replace the durations. Running and paused phases keep their current
    /// length; the new values apply from the next phase instance. A stopped
    /// timer refreshes its pending phase immediately.
    pub fn set_config(&mut self, config: DurationConfig) {
        self.config = config;
        if self.status == TimerStatus::Stopped {
            self.total_secs = config.duration_for(self.phase);
            self.stopped_remaining_secs = self.total_secs;
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        match self.status {
            TimerStatus::Running => {
                let elapsed = self.anchor.map(|anchor| elapsed_secs(anchor, now)).unwrap_or(0);
                self.total_secs.saturating_sub(elapsed)
            }
            TimerStatus::Paused => self.paused_remaining_secs.unwrap_or(self.total_secs),
            TimerStatus::Stopped => self.stopped_remaining_secs,
        }
    }
}

/// Whole seconds from `anchor` to `now`; a clock that moved backwards yields 0.
fn elapsed_secs(anchor: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - anchor).num_seconds().max(0) as u64
}

impl fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTimer")
            .field("config", &self.config)
            .field("phase", &self.phase)
            .field("status", &self.status)
            .field("total_secs", &self.total_secs)
            .field("anchor", &self.anchor)
            .field("paused_remaining_secs", &self.paused_remaining_secs)
            .field("stopped_remaining_secs", &self.stopped_remaining_secs)
            .field("completed_sessions", &self.completed_sessions)
            .finish_non_exhaustive()
    }
}
