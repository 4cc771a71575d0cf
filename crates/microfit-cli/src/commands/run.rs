//! Foreground timer session.
//!
//! Ticks come from a [`TokioTrigger`]; stdin lines and Ctrl-C are polled in
//! the same `select!` loop, so the controller is only ever touched from one
//! task.

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use microfit_core::format::format_clock;
use microfit_core::notify::APP_NAME;
use microfit_core::{
    Alert, Clock, Config, Database, Event, NotificationSink, Notifier, SessionTimer,
    StatsAggregator, SystemClock, TimerController, TimerStatus, TokioTrigger,
};
use notify_rust::Notification;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

#[derive(Args)]
pub struct RunArgs {
    /// Focus phase length in seconds (overrides config)
    #[arg(long = "focus", value_name = "SECS", allow_negative_numbers = true)]
    focus_secs: Option<i64>,
    /// Break phase length in seconds (overrides config)
    #[arg(long = "break", value_name = "SECS", allow_negative_numbers = true)]
    break_secs: Option<i64>,
    /// Stop after each phase instead of starting the next one
    #[arg(long)]
    no_auto_switch: bool,
    /// Exit once this many phases have completed
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_phases: Option<u32>,
}

/// Bell and toast on the terminal, desktop alerts through the OS.
struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn deliver(&mut self, alert: Alert) {
        match alert {
            Alert::Sound { sound } => {
                debug!(?sound, "ringing terminal bell");
                let mut stderr = std::io::stderr();
                let _ = stderr.write_all(b"\x07");
                let _ = stderr.flush();
            }
            Alert::Toast { message, .. } => eprintln!("\n>> {message}"),
            Alert::Desktop { title, body } => {
                if let Err(e) = Notification::new()
                    .summary(&title)
                    .body(&body)
                    .appname(APP_NAME)
                    .show()
                {
                    warn!(error = %e, "desktop notification failed");
                }
            }
        }
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(args))
}

async fn session(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(secs) = args.focus_secs {
        config.timer.focus_duration_secs = secs;
    }
    if let Some(secs) = args.break_secs {
        config.timer.break_duration_secs = secs;
    }
    if args.no_auto_switch {
        config.timer.auto_switch = false;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let timer = SessionTimer::new(config.durations(), clock.clone());
    let stats = StatsAggregator::load(Database::open()?, clock);
    let notifier = Notifier::new(config.notifications.clone(), Box::new(TerminalSink));
    let (trigger, mut ticks) = TokioTrigger::new();
    let mut controller = TimerController::new(timer, stats, notifier, trigger);

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut completed: u32 = 0;

    emit(controller.start())?;
    loop {
        tokio::select! {
            Some(handle) = ticks.recv() => {
                for event in controller.on_tick(handle) {
                    match event {
                        Event::SecondElapsed { phase, .. } => {
                            let remaining = controller.timer().remaining_secs();
                            eprint!("\r{} {}", phase.label(), format_clock(remaining));
                        }
                        Event::PhaseCompleted { .. } => {
                            completed += 1;
                            emit(Some(event))?;
                        }
                        other => emit(Some(other))?,
                    }
                }
                if args.max_phases.is_some_and(|max| completed >= max) {
                    break;
                }
                if controller.timer().status() == TimerStatus::Stopped {
                    break;
                }
            }
            line = stdin.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match line.trim() {
                        "p" => emit(controller.toggle())?,
                        "s" => emit(controller.switch_mode())?,
                        "q" => break,
                        "" => {}
                        other => eprintln!("unknown command '{other}' (p: pause/resume, s: switch, q: quit)"),
                    },
                    None => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    controller.shutdown();
    eprintln!();
    println!("{}", serde_json::to_string_pretty(&controller.timer().snapshot())?);
    Ok(())
}

/// Print a state-change event as one JSON line.
fn emit(event: Option<Event>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(event) = event {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}
