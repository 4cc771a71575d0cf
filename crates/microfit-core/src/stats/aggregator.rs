//! Stats aggregator.
//!
//! Consumes `SecondElapsed` and `PhaseCompleted` events, keeps the daily map
//! and the all-time totals in memory, and flushes every mutation to a
//! [`KeyValueStore`]. Writes are best-effort: a failed save is logged and
//! the in-memory state stays authoritative.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::daily::{AllTimeStats, DailyStat, DATE_FORMAT};
use crate::clock::Clock;
use crate::events::Event;
use crate::storage::KeyValueStore;
use crate::timer::Phase;

pub const TOTAL_FOCUS_KEY: &str = "microfit-total-focus-time";
pub const TOTAL_BREAK_KEY: &str = "microfit-total-break-time";
pub const COMPLETED_SESSIONS_KEY: &str = "microfit-completed-sessions";
pub const DAILY_STATS_KEY: &str = "microfit-daily-stats";

pub struct StatsAggregator<S: KeyValueStore> {
    store: S,
    clock: Arc<dyn Clock>,
    daily: BTreeMap<NaiveDate, DailyStat>,
    all_time: AllTimeStats,
}

impl<S: KeyValueStore> StatsAggregator<S> {
    /// Hydrate from `store`. Absent or malformed values start at zero.
    pub fn load(store: S, clock: Arc<dyn Clock>) -> Self {
        let all_time = AllTimeStats {
            total_focus_seconds: load_counter(&store, TOTAL_FOCUS_KEY),
            total_break_seconds: load_counter(&store, TOTAL_BREAK_KEY),
            completed_sessions: load_counter(&store, COMPLETED_SESSIONS_KEY),
        };
        let daily = load_daily(&store);
        debug!(days = daily.len(), ?all_time, "stats loaded");
        Self {
            store,
            clock,
            daily,
            all_time,
        }
    }

    /// Apply a timer event. Events other than `SecondElapsed` and
    /// `PhaseCompleted` are ignored.
    pub fn record(&mut self, event: &Event) {
        match event {
            Event::SecondElapsed { phase, .. } => self.record_second(*phase),
            Event::PhaseCompleted { phase, .. } => self.record_completion(*phase),
            _ => {}
        }
    }

    /// Credit one second of `phase` to today and to the totals.
    pub fn record_second(&mut self, phase: Phase) {
        let today = self.clock.local_date();
        let entry = self.daily.entry(today).or_default();
        match phase {
            Phase::Focus => {
                entry.focus_seconds += 1;
                self.all_time.total_focus_seconds += 1;
                self.persist(TOTAL_FOCUS_KEY, &self.all_time.total_focus_seconds.to_string());
            }
            Phase::Break => {
                entry.break_seconds += 1;
                self.all_time.total_break_seconds += 1;
                self.persist(TOTAL_BREAK_KEY, &self.all_time.total_break_seconds.to_string());
            }
        }
        self.persist_daily();
    }

    /// Count a completed session. Only focus phases count.
    pub fn record_completion(&mut self, phase: Phase) {
        if phase != Phase::Focus {
            return;
        }
        let today = self.clock.local_date();
        self.daily.entry(today).or_default().sessions_completed += 1;
        self.all_time.completed_sessions += 1;
        self.persist(
            COMPLETED_SESSIONS_KEY,
            &self.all_time.completed_sessions.to_string(),
        );
        self.persist_daily();
    }

    /// Clear every daily entry and zero the totals.
    pub fn reset(&mut self) {
        self.daily.clear();
        self.all_time = AllTimeStats::default();
        self.persist(TOTAL_FOCUS_KEY, "0");
        self.persist(TOTAL_BREAK_KEY, "0");
        self.persist(COMPLETED_SESSIONS_KEY, "0");
        self.persist_daily();
        info!("stats reset");
    }

    pub fn all_time(&self) -> AllTimeStats {
        self.all_time
    }

    /// Stats for the current local date (zeroed if nothing recorded yet).
    pub fn today(&self) -> DailyStat {
        self.day(self.clock.local_date())
    }

    /// Stats for `date`, zeroed if nothing was recorded that day.
    pub fn day(&self, date: NaiveDate) -> DailyStat {
        self.daily.get(&date).copied().unwrap_or_default()
    }

    /// The stored entry for `date`, `None` if the day has no entry.
    pub fn entry(&self, date: NaiveDate) -> Option<&DailyStat> {
        self.daily.get(&date)
    }

    /// Every recorded day, oldest first.
    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, DailyStat)> + '_ {
        self.daily.iter().map(|(date, stat)| (*date, *stat))
    }

    /// The latest recorded day strictly before `date`.
    pub fn previous_recorded_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.daily.range(..date).next_back().map(|(d, _)| *d)
    }

    /// The earliest recorded day strictly after `date`.
    pub fn next_recorded_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.daily
            .range(date..)
            .find(|(d, _)| **d > date)
            .map(|(d, _)| *d)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn persist(&self, key: &str, value: &str) {
        if let Err(e) = self.store.save(key, value) {
            warn!(key, error = %e, "failed to persist stats");
        }
    }

    fn persist_daily(&self) {
        let by_key: BTreeMap<String, DailyStat> = self
            .daily
            .iter()
            .map(|(date, stat)| (date.format(DATE_FORMAT).to_string(), *stat))
            .collect();
        match serde_json::to_string(&by_key) {
            Ok(json) => self.persist(DAILY_STATS_KEY, &json),
            Err(e) => warn!(error = %e, "failed to serialize daily stats"),
        }
    }
}

fn load_counter<S: KeyValueStore>(store: &S, key: &str) -> u64 {
    match store.load(key) {
        Ok(Some(raw)) => raw.trim().parse::<u64>().unwrap_or_else(|e| {
            warn!(key, value = %raw, error = %e, "discarding malformed counter");
            0
        }),
        Ok(None) => 0,
        Err(e) => {
            warn!(key, error = %e, "failed to load counter");
            0
        }
    }
}

fn load_daily<S: KeyValueStore>(store: &S) -> BTreeMap<NaiveDate, DailyStat> {
    let raw = match store.load(DAILY_STATS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return BTreeMap::new(),
        Err(e) => {
            warn!(error = %e, "failed to load daily stats");
            return BTreeMap::new();
        }
    };
    let by_key: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(map) => map,
        Err(e) => {
            warn!(error = %e, "discarding malformed daily stats");
            return BTreeMap::new();
        }
    };
    by_key
        .into_iter()
        .filter_map(|(key, value)| {
            let date = match NaiveDate::parse_from_str(&key, DATE_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping daily stat with malformed date");
                    return None;
                }
            };
            match serde_json::from_value::<DailyStat>(value) {
                Ok(stat) => Some((date, stat)),
                Err(e) => {
                    warn!(key = %key, error = %e, "skipping malformed daily stat");
                    None
                }
            }
        })
        .collect()
}
