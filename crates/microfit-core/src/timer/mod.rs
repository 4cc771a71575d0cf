mod durations;
mod engine;

pub use durations::{
    DurationConfig, Phase, DEFAULT_BREAK_SECS, DEFAULT_FOCUS_SECS, MIN_DURATION_SECS,
};
pub use engine::{SessionTimer, TimerStatus};
