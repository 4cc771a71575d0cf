//! Phase-transition alerts.
//!
//! The [`Notifier`] turns timer events into alert requests and hands them
//! to a [`NotificationSink`]. How a sound is played or a toast is drawn is
//! the sink's business.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::events::Event;
use crate::format::format_hms;
use crate::storage::NotificationsConfig;
use crate::timer::Phase;

/// How long an in-app toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_millis(3500);

pub const APP_NAME: &str = "MicroFit";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    #[default]
    Bells,
    #[serde(rename = "alarm")]
    AlarmClock,
    Whistle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Alert {
    Sound { sound: SoundKind },
    Toast { message: String, duration: Duration },
    Desktop { title: String, body: String },
}

/// External delivery of alerts (speaker, screen, OS notification center).
pub trait NotificationSink {
    fn deliver(&mut self, alert: Alert);
}

pub struct Notifier {
    config: NotificationsConfig,
    sink: Box<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(config: NotificationsConfig, sink: Box<dyn NotificationSink>) -> Self {
        Self { config, sink }
    }

    pub fn set_config(&mut self, config: NotificationsConfig) {
        self.config = config;
    }

    /// React to a timer event. Only phase completion and auto-started
    /// phases produce alerts.
    pub fn handle(&mut self, event: &Event) {
        match event {
            Event::PhaseCompleted { .. } => {
                if self.config.sound_enabled {
                    self.sink.deliver(Alert::Sound {
                        sound: self.config.sound,
                    });
                }
            }
            Event::PhaseStarted {
                phase,
                duration_secs,
                ..
            } => {
                let message = phase_started_message(*phase, *duration_secs);
                if self.config.toast_enabled {
                    self.sink.deliver(Alert::Toast {
                        message: message.clone(),
                        duration: TOAST_DURATION,
                    });
                }
                if self.config.desktop_enabled {
                    self.sink.deliver(Alert::Desktop {
                        title: APP_NAME.to_string(),
                        body: message,
                    });
                }
            }
            _ => {}
        }
    }
}

pub fn phase_started_message(phase: Phase, duration_secs: u64) -> String {
    format!(
        "{} started: {} remaining",
        phase.label(),
        format_hms(duration_secs)
    )
}

/// Sink that only writes alerts to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn deliver(&mut self, alert: Alert) {
        info!(?alert, "alert");
    }
}

/// Sink that keeps every alert in memory. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        match self.alerts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl NotificationSink for RecordingSink {
    fn deliver(&mut self, alert: Alert) {
        match self.alerts.lock() {
            Ok(mut guard) => guard.push(alert),
            Err(poisoned) => poisoned.into_inner().push(alert),
        }
    }
}
