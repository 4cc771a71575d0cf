use clap::Subcommand;
use microfit_core::Config;
use serde_json::json;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "timer.focus_duration_secs", "notifications.sound")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            let mut report = json!({ "key": key, "value": config.get(&key) });
            // Durations below the minimum are stored as written but clamped
            // when a session starts.
            if key.starts_with("timer.") {
                let durations = config.durations();
                report["effective"] = json!({
                    "focus_secs": durations.focus_secs(),
                    "break_secs": durations.break_secs(),
                    "auto_switch": durations.auto_switch(),
                });
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
