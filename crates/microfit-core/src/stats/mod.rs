//! Focus/break statistics.
//!
//! Per-calendar-day buckets plus all-time totals, fed one sampled second
//! and one completed focus phase at a time by the session timer.

mod aggregator;
mod daily;

pub use aggregator::{
    StatsAggregator, COMPLETED_SESSIONS_KEY, DAILY_STATS_KEY, TOTAL_BREAK_KEY, TOTAL_FOCUS_KEY,
};
pub use daily::{percent, AllTimeStats, DailyStat, DATE_FORMAT};
