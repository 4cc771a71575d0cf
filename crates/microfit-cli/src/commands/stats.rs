use std::sync::Arc;

use chrono::NaiveDate;
use clap::Subcommand;
use microfit_core::stats::DATE_FORMAT;
use microfit_core::{AllTimeStats, Clock, DailyStat, Database, Event, StatsAggregator, SystemClock};
use serde_json::json;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// All-time stats
    All,
    /// Stats for one day
    Day {
        /// Date as YYYY-MM-DD
        date: String,
        /// Show the closest recorded day before DATE instead
        #[arg(long, conflicts_with = "next")]
        prev: bool,
        /// Show the closest recorded day after DATE instead
        #[arg(long)]
        next: bool,
    },
    /// Every recorded day, oldest first
    History,
    /// Clear all statistics
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn day_json(date: NaiveDate, stat: &DailyStat) -> serde_json::Value {
    json!({
        "date": date.format(DATE_FORMAT).to_string(),
        "focusSeconds": stat.focus_seconds,
        "breakSeconds": stat.break_seconds,
        "sessionsCompleted": stat.sessions_completed,
        "focusPercent": stat.focus_percent(),
        "breakPercent": stat.break_percent(),
    })
}

fn all_time_json(stats: &AllTimeStats) -> serde_json::Value {
    json!({
        "totalFocusSeconds": stats.total_focus_seconds,
        "totalBreakSeconds": stats.total_break_seconds,
        "completedSessions": stats.completed_sessions,
        "focusPercent": stats.focus_percent(),
        "breakPercent": stats.break_percent(),
    })
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let clock = Arc::new(SystemClock);
    let mut stats = StatsAggregator::load(db, clock.clone());

    let output = match action {
        StatsAction::Today => day_json(clock.local_date(), &stats.today()),
        StatsAction::All => all_time_json(&stats.all_time()),
        StatsAction::Day { date, prev, next } => {
            let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
                .map_err(|e| format!("invalid date '{date}': {e}"))?;
            let target = if prev {
                stats
                    .previous_recorded_day(date)
                    .ok_or_else(|| format!("no recorded day before {date}"))?
            } else if next {
                stats
                    .next_recorded_day(date)
                    .ok_or_else(|| format!("no recorded day after {date}"))?
            } else {
                date
            };
            day_json(target, &stats.day(target))
        }
        StatsAction::History => {
            let days: Vec<_> = stats.days().map(|(date, stat)| day_json(date, &stat)).collect();
            serde_json::Value::Array(days)
        }
        StatsAction::Reset { yes } => {
            if !yes {
                return Err("refusing to reset statistics without --yes".into());
            }
            stats.reset();
            serde_json::to_value(Event::StatsReset { at: clock.now() })?
        }
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
