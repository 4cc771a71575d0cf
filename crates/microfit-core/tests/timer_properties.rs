//! Property tests for the session timer's timing guarantees.
//!
//! All tests drive a virtual clock; nothing sleeps.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use microfit_core::{DurationConfig, ManualClock, Phase, SessionTimer, StatsAggregator, TimerStatus};
use microfit_core::MemoryStore;
use proptest::prelude::*;

fn timer(focus: i64, brk: i64, auto: bool) -> (SessionTimer, ManualClock) {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 15, 9, 0, 0).unwrap());
    let timer = SessionTimer::new(DurationConfig::new(focus, brk, auto), Arc::new(clock.clone()));
    (timer, clock)
}

proptest! {
    #[test]
    fn remaining_tracks_elapsed_wall_time(d in 1i64..20_000, frac in 0.0f64..1.0) {
        let e = ((d as f64) * frac) as i64;
        let (mut timer, clock) = timer(d, 60, true);
        timer.start();
        clock.advance_secs(e);
        prop_assert_eq!(timer.remaining_secs(), (d - e) as u64);
    }

    #[test]
    fn pause_then_immediate_resume_is_lossless(d in 2i64..20_000, frac in 0.0f64..1.0) {
        let e = ((d as f64) * frac) as i64;
        let (mut timer, clock) = timer(d, 60, true);
        timer.start();
        clock.advance_secs(e);
        let before = timer.remaining_secs();
        timer.pause();
        timer.resume();
        prop_assert_eq!(timer.remaining_secs(), before);
    }

    #[test]
    fn pausing_neither_loses_nor_gains_time(
        d in 2i64..20_000,
        frac in 0.0f64..1.0,
        paused_for in 0i64..100_000,
    ) {
        let e = ((d as f64) * frac) as i64;
        let (mut timer, clock) = timer(d, 60, true);
        timer.start();
        clock.advance_secs(e);
        timer.pause();
        let at_pause = timer.remaining_secs();
        clock.advance_secs(paused_for);
        timer.resume();
        prop_assert_eq!(timer.remaining_secs(), at_pause);
        prop_assert_eq!(timer.status(), TimerStatus::Running);
    }

    #[test]
    fn clock_regression_never_underflows(d in 1i64..5_000, back in 1i64..100_000) {
        let (mut timer, clock) = timer(d, 60, true);
        timer.start();
        clock.advance_secs(-back);
        prop_assert_eq!(timer.remaining_secs(), d as u64);
        prop_assert!(timer.tick().len() == 1);
    }

    #[test]
    fn same_day_ticks_sum_per_phase(n in 0usize..500, m in 0usize..500) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 4, 15, 9, 0, 0).unwrap());
        let mut stats = StatsAggregator::load(MemoryStore::new(), Arc::new(clock));
        for _ in 0..n {
            stats.record_second(Phase::Focus);
        }
        for _ in 0..m {
            stats.record_second(Phase::Break);
        }
        prop_assert_eq!(stats.today().focus_seconds, n as u64);
        prop_assert_eq!(stats.today().break_seconds, m as u64);
    }
}

#[test]
fn completing_focus_then_break_alternates_phases() {
    let (mut timer, clock) = timer(1500, 300, true);
    timer.start();
    clock.advance_secs(1500);
    timer.tick();
    assert_eq!(timer.phase(), Phase::Break);
    assert_eq!(timer.remaining_secs(), 300);
    assert_eq!(timer.completed_sessions(), 1);

    clock.advance_secs(300);
    timer.tick();
    assert_eq!(timer.phase(), Phase::Focus);
    assert_eq!(timer.remaining_secs(), 1500);
    assert_eq!(timer.completed_sessions(), 1);
}

#[test]
fn stopped_timer_restarts_fresh_full_phase() {
    let (mut timer, clock) = timer(60, 30, false);
    timer.start();
    clock.advance_secs(60);
    timer.tick();
    assert_eq!(timer.status(), TimerStatus::Stopped);
    assert_eq!(timer.remaining_secs(), 0);

    clock.advance_secs(3600);
    timer.start();
    assert_eq!(timer.remaining_secs(), 60);
    clock.advance_secs(15);
    assert_eq!(timer.remaining_secs(), 45);
}
