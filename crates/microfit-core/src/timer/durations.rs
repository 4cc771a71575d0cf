use serde::{Deserialize, Serialize};
use tracing::warn;

/// Shortest phase the timer will run. Anything below is clamped up to it.
pub const MIN_DURATION_SECS: u64 = 1;

pub const DEFAULT_FOCUS_SECS: u64 = 30 * 60;
pub const DEFAULT_BREAK_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Focus,
    Break,
}

impl Phase {
    /// The phase that follows this one.
    pub fn flipped(self) -> Self {
        match self {
            Phase::Focus => Phase::Break,
            Phase::Break => Phase::Focus,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::Break => "Break",
        }
    }
}

/// Phase durations and the auto-advance policy.
///
/// Durations are always at least [`MIN_DURATION_SECS`]; the only way to
/// build one from untrusted input is [`DurationConfig::new`], which clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DurationConfig {
    focus_secs: u64,
    break_secs: u64,
    auto_switch: bool,
}

impl DurationConfig {
    pub fn new(focus_secs: i64, break_secs: i64, auto_switch: bool) -> Self {
        Self {
            focus_secs: clamp_duration("focus", focus_secs),
            break_secs: clamp_duration("break", break_secs),
            auto_switch,
        }
    }

    pub fn focus_secs(&self) -> u64 {
        self.focus_secs
    }

    pub fn break_secs(&self) -> u64 {
        self.break_secs
    }

    pub fn auto_switch(&self) -> bool {
        self.auto_switch
    }

    /// Configured duration of a full `phase` instance, in seconds.
    pub fn duration_for(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Focus => self.focus_secs,
            Phase::Break => self.break_secs,
        }
    }
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            focus_secs: DEFAULT_FOCUS_SECS,
            break_secs: DEFAULT_BREAK_SECS,
            auto_switch: true,
        }
    }
}

fn clamp_duration(which: &str, secs: i64) -> u64 {
    if secs < MIN_DURATION_SECS as i64 {
        warn!(phase = which, requested = secs, "duration below minimum, clamping");
        MIN_DURATION_SECS
    } else {
        secs as u64
    }
}
