//! Timer controller.
//!
//! Owns the session timer, the stats aggregator, the notifier and the
//! periodic trigger, and is the only place their state changes. Every
//! handler runs to completion before the next one is dispatched, so none of
//! the parts need locking.
//!
//! The trigger is registered while the timer is running and cancelled on
//! every path that leaves `Running`, including `shutdown()` and drop.

use tracing::debug;

use crate::events::Event;
use crate::notify::Notifier;
use crate::stats::StatsAggregator;
use crate::storage::{Config, KeyValueStore};
use crate::timer::SessionTimer;
use crate::trigger::{PeriodicTrigger, TriggerHandle, TICK_PERIOD};

pub struct TimerController<S: KeyValueStore, T: PeriodicTrigger> {
    timer: SessionTimer,
    stats: StatsAggregator<S>,
    notifier: Notifier,
    trigger: T,
    active: Option<TriggerHandle>,
}

impl<S: KeyValueStore, T: PeriodicTrigger> TimerController<S, T> {
    pub fn new(
        timer: SessionTimer,
        stats: StatsAggregator<S>,
        notifier: Notifier,
        trigger: T,
    ) -> Self {
        let mut controller = Self {
            timer,
            stats,
            notifier,
            trigger,
            active: None,
        };
        controller.sync_trigger();
        controller
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn stats(&self) -> &StatsAggregator<S> {
        &self.stats
    }

    pub fn trigger(&self) -> &T {
        &self.trigger
    }

    /// The live trigger registration, if the timer is running.
    pub fn active_trigger(&self) -> Option<TriggerHandle> {
        self.active
    }

    // ── User handlers ────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let event = self.timer.start();
        self.after_command(event)
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.timer.pause();
        self.after_command(event)
    }

    pub fn resume(&mut self) -> Option<Event> {
        let event = self.timer.resume();
        self.after_command(event)
    }

    pub fn toggle(&mut self) -> Option<Event> {
        let event = self.timer.toggle();
        self.after_command(event)
    }

    pub fn switch_mode(&mut self) -> Option<Event> {
        let event = self.timer.switch_mode();
        // A running timer was re-anchored; realign the tick cadence with it.
        if self.timer.is_running() {
            self.restart_trigger();
        }
        self.after_command(event)
    }

    /// Clear all statistics. Confirmation is the caller's job.
    pub fn reset_stats(&mut self) -> Event {
        self.stats.reset();
        Event::StatsReset {
            at: self.timer.clock().now(),
        }
    }

    /// Apply new durations and notification preferences.
    pub fn apply_config(&mut self, config: &Config) {
        self.timer.set_config(config.durations());
        self.notifier.set_config(config.notifications.clone());
    }

    // ── Tick handler ─────────────────────────────────────────────────

    /// Handle one tick from the trigger. Ticks from any registration other
    /// than the live one are dropped.
    pub fn on_tick(&mut self, handle: TriggerHandle) -> Vec<Event> {
        if self.active != Some(handle) {
            debug!(handle = handle.id(), "ignoring stale tick");
            return Vec::new();
        }
        let events = self.timer.tick();
        for event in &events {
            self.dispatch(event);
        }
        if events
            .iter()
            .any(|e| matches!(e, Event::PhaseStarted { .. }))
        {
            self.restart_trigger();
        }
        self.sync_trigger();
        events
    }

    /// Deregister the trigger. The timer keeps its state.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.active.take() {
            self.trigger.cancel(handle);
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn after_command(&mut self, event: Option<Event>) -> Option<Event> {
        if let Some(ref e) = event {
            self.dispatch(e);
        }
        self.sync_trigger();
        event
    }

    fn dispatch(&mut self, event: &Event) {
        self.stats.record(event);
        self.notifier.handle(event);
    }

    fn sync_trigger(&mut self) {
        match (self.timer.is_running(), self.active) {
            (true, None) => {
                self.active = Some(self.trigger.schedule(TICK_PERIOD));
            }
            (false, Some(_)) => self.shutdown(),
            _ => {}
        }
    }

    fn restart_trigger(&mut self) {
        self.shutdown();
        self.sync_trigger();
    }
}

impl<S: KeyValueStore, T: PeriodicTrigger> Drop for TimerController<S, T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::{Alert, RecordingSink};
    use crate::storage::{MemoryStore, NotificationsConfig};
    use crate::timer::{DurationConfig, Phase, TimerStatus};
    use crate::trigger::ManualTrigger;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    struct Harness {
        controller: TimerController<MemoryStore, ManualTrigger>,
        clock: ManualClock,
        trigger: ManualTrigger,
        sink: RecordingSink,
    }

    impl Harness {
        fn new(focus: i64, brk: i64, auto: bool) -> Self {
            let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 15, 9, 0, 0).unwrap());
            let shared: Arc<dyn crate::clock::Clock> = Arc::new(clock.clone());
            let timer = SessionTimer::new(DurationConfig::new(focus, brk, auto), shared.clone());
            let stats = StatsAggregator::load(MemoryStore::new(), shared);
            let sink = RecordingSink::new();
            let notifier = Notifier::new(NotificationsConfig::default(), Box::new(sink.clone()));
            let trigger = ManualTrigger::new();
            let controller = TimerController::new(timer, stats, notifier, trigger.clone());
            Self {
                controller,
                clock,
                trigger,
                sink,
            }
        }

        /// Advance one second and deliver a tick on the live registration.
        fn second(&mut self) -> Vec<Event> {
            self.clock.advance_secs(1);
            match self.trigger.active() {
                Some(handle) => self.controller.on_tick(handle),
                None => Vec::new(),
            }
        }
    }

    #[test]
    fn trigger_follows_running_state() {
        let mut h = Harness::new(60, 30, true);
        assert_eq!(h.trigger.active_count(), 0);

        h.controller.start();
        assert_eq!(h.trigger.active_count(), 1);
        assert_eq!(h.controller.active_trigger(), h.trigger.active());

        h.controller.pause();
        assert_eq!(h.trigger.active_count(), 0);

        h.controller.resume();
        assert_eq!(h.trigger.active_count(), 1);
    }

    #[test]
    fn ticks_feed_stats() {
        let mut h = Harness::new(60, 30, true);
        h.controller.start();
        for _ in 0..5 {
            h.second();
        }
        assert_eq!(h.controller.stats().today().focus_seconds, 5);
        assert_eq!(h.controller.timer().remaining_secs(), 55);
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let mut h = Harness::new(60, 30, true);
        h.controller.start();
        let old = h.trigger.active().unwrap();
        h.controller.pause();
        h.controller.resume();

        h.clock.advance_secs(1);
        assert!(h.controller.on_tick(old).is_empty());
        assert_eq!(h.controller.stats().all_time().total_focus_seconds, 0);
    }

    #[test]
    fn completion_without_auto_switch_deregisters_trigger() {
        let mut h = Harness::new(3, 2, false);
        h.controller.start();
        h.second();
        h.second();
        let events = h.second();
        assert!(matches!(events.last(), Some(Event::TimerStopped { .. })));
        assert_eq!(h.trigger.active_count(), 0);
        assert_eq!(h.controller.timer().status(), TimerStatus::Stopped);
        assert_eq!(h.controller.stats().today().sessions_completed, 1);
        assert_eq!(h.sink.alerts().len(), 1);
    }

    #[test]
    fn auto_switch_alerts_and_keeps_ticking() {
        let mut h = Harness::new(2, 2, true);
        h.controller.start();
        h.second();
        h.second();
        assert_eq!(h.controller.timer().phase(), Phase::Break);
        assert_eq!(h.trigger.active_count(), 1);
        assert_eq!(h.trigger.scheduled_total(), 2);

        let alerts = h.sink.alerts();
        assert!(matches!(alerts[0], Alert::Sound { .. }));
        assert!(matches!(alerts[1], Alert::Toast { .. }));
        assert!(matches!(alerts[2], Alert::Desktop { .. }));

        h.second();
        let stats = h.controller.stats().today();
        assert_eq!(stats.focus_seconds, 2);
        assert_eq!(stats.break_seconds, 1);
        assert_eq!(stats.sessions_completed, 1);
    }

    #[test]
    fn switch_mode_while_running_realigns_trigger() {
        let mut h = Harness::new(60, 30, true);
        h.controller.start();
        let first = h.trigger.active().unwrap();
        h.controller.switch_mode();
        let second = h.trigger.active().unwrap();
        assert_ne!(first, second);
        assert_eq!(h.controller.timer().remaining_secs(), 30);
    }

    #[test]
    fn reset_stats_clears_totals() {
        let mut h = Harness::new(60, 30, true);
        h.controller.start();
        h.second();
        let event = h.controller.reset_stats();
        assert!(matches!(event, Event::StatsReset { .. }));
        assert_eq!(h.controller.stats().all_time().total_focus_seconds, 0);
        assert_eq!(h.controller.timer().status(), TimerStatus::Running);
    }

    #[test]
    fn apply_config_updates_pending_phase() {
        let mut h = Harness::new(60, 30, true);
        let mut config = Config::default();
        config.timer.focus_duration_secs = 90;
        h.controller.apply_config(&config);
        assert_eq!(h.controller.timer().remaining_secs(), 90);
    }

    #[test]
    fn drop_deregisters_trigger() {
        let mut h = Harness::new(60, 30, true);
        h.controller.start();
        let trigger = h.trigger.clone();
        assert_eq!(trigger.active_count(), 1);
        drop(h);
        assert_eq!(trigger.active_count(), 0);
    }
}
