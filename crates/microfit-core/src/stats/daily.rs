use serde::{Deserialize, Serialize};

/// Key format of the daily map (`YYYY-MM-DD`, local time).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Aggregate for one calendar day.
///
/// Older data used `focusTime`/`breakTime`/`sessions`; both spellings load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    #[serde(default, alias = "focusTime")]
    pub focus_seconds: u64,
    #[serde(default, alias = "breakTime")]
    pub break_seconds: u64,
    #[serde(default, alias = "sessions")]
    pub sessions_completed: u64,
}

impl DailyStat {
    pub fn focus_percent(&self) -> u64 {
        percent(self.focus_seconds, self.break_seconds)
    }

    pub fn break_percent(&self) -> u64 {
        percent(self.break_seconds, self.focus_seconds)
    }
}

/// Running totals since the last reset.
///
/// Accumulated alongside the daily map, never recomputed from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllTimeStats {
    pub total_focus_seconds: u64,
    pub total_break_seconds: u64,
    pub completed_sessions: u64,
}

impl AllTimeStats {
    pub fn focus_percent(&self) -> u64 {
        percent(self.total_focus_seconds, self.total_break_seconds)
    }

    pub fn break_percent(&self) -> u64 {
        percent(self.total_break_seconds, self.total_focus_seconds)
    }
}

/// `part` as a whole-number share of `part + other`, rounding halves up.
/// 0 when both are 0.
pub fn percent(part: u64, other: u64) -> u64 {
    let total = part as u128 + other as u128;
    if total == 0 {
        return 0;
    }
    ((200 * part as u128 + total) / (2 * total)) as u64
}
