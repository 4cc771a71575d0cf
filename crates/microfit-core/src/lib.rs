//! # MicroFit Core Library
//!
//! This library provides the core logic for the MicroFit interval timer,
//! which alternates focus and break phases and keeps per-day statistics.
//! The CLI binary is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session Timer**: A wall-clock-anchored state machine; the caller
//!   invokes `tick()` once per period and reacts to the returned events
//! - **Stats**: Per-day and all-time focus/break totals, persisted through a
//!   key-value store on every mutation
//! - **Notifier**: Turns phase transitions into sound/toast/desktop alerts
//! - **Controller**: Single-threaded glue that owns the parts above and the
//!   periodic trigger driving them
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core timer state machine
//! - [`StatsAggregator`]: Daily and all-time statistics
//! - [`TimerController`]: Event dispatch and trigger lifecycle
//! - [`Database`]: SQLite-backed persistence
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod controller;
pub mod error;
pub mod events;
pub mod format;
pub mod notify;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::TimerController;
pub use error::{ConfigError, CoreError, StorageError};
pub use events::Event;
pub use notify::{Alert, LogSink, NotificationSink, Notifier, RecordingSink, SoundKind};
pub use stats::{AllTimeStats, DailyStat, StatsAggregator};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, NotificationsConfig, TimerConfig};
pub use timer::{DurationConfig, Phase, SessionTimer, TimerStatus};
pub use trigger::{ManualTrigger, PeriodicTrigger, TokioTrigger, TriggerHandle, TICK_PERIOD};
