//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with `HOME` pointed at a fresh temp
//! directory so config and database never touch the real user profile.

use std::path::Path;
use std::process::{Command, Stdio};

use microfit_core::stats::DAILY_STATS_KEY;
use microfit_core::{Database, KeyValueStore};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_microfit-cli"))
        .args(args)
        .env("HOME", home)
        .env_remove("MICROFIT_ENV")
        .env("MICROFIT_LOG", "off")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "timer.focus_duration_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1800");
    assert!(home.path().join(".config/microfit/config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "timer.break_duration_secs", "300"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "timer.break_duration_secs"]);
    assert_eq!(stdout.trim(), "300");

    let (_, _, code) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "timer.break_duration_secs"]);
    assert_eq!(stdout.trim(), "60");
}

#[test]
fn test_config_set_reports_clamped_duration() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "set", "timer.focus_duration_secs", "0"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["value"], "0");
    assert_eq!(parsed["effective"]["focus_secs"], 1);
    assert_eq!(parsed["effective"]["break_secs"], 60);

    let (stdout, _, _) = run_cli(home.path(), &["config", "set", "notifications.sound", "whistle"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["value"], "whistle");
    assert!(parsed.get("effective").is_none());
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "timer.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["timer"]["auto_switch"], true);
    assert_eq!(parsed["notifications"]["sound"], "bells");
}

#[test]
fn test_stats_today_empty() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["stats", "today"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["focusSeconds"], 0);
    assert_eq!(parsed["focusPercent"], 0);
}

#[test]
fn test_stats_day_rejects_bad_date() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["stats", "day", "15/04/2025"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("invalid date"));
}

/// Write a daily map straight into the CLI's database under `home`.
fn seed_daily_stats(home: &Path, json: &str) {
    let dir = home.join(".config/microfit");
    std::fs::create_dir_all(&dir).unwrap();
    let db = Database::open_at(&dir.join("microfit.db")).unwrap();
    db.save(DAILY_STATS_KEY, json).unwrap();
}

#[test]
fn test_stats_day_navigates_recorded_days() {
    let home = tempfile::tempdir().unwrap();
    seed_daily_stats(
        home.path(),
        r#"{"2025-04-10":{"focusSeconds":600},"2025-04-12":{"focusSeconds":1200}}"#,
    );

    let (stdout, _, code) = run_cli(home.path(), &["stats", "day", "2025-04-11", "--prev"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["date"], "2025-04-10");
    assert_eq!(parsed["focusSeconds"], 600);

    let (stdout, _, code) = run_cli(home.path(), &["stats", "day", "2025-04-10", "--next"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["date"], "2025-04-12");

    let (_, stderr, code) = run_cli(home.path(), &["stats", "day", "2025-04-12", "--next"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no recorded day after 2025-04-12"));
}

#[test]
fn test_run_rejects_zero_max_phases() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["run", "--max-phases", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn test_stats_reset_requires_confirmation() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["stats", "reset"]);
    assert_eq!(code, 1);
    let (stdout, _, code) = run_cli(home.path(), &["stats", "reset", "--yes"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("StatsReset"));
}

#[test]
fn test_run_completes_phases_and_records_stats() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(
        home.path(),
        &["config", "set", "notifications.desktop_enabled", "false"],
    );
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--focus", "1", "--break", "1", "--max-phases", "2"],
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.matches("\"PhaseCompleted\"").count(), 2);
    assert!(stdout.contains("\"PhaseStarted\""));

    let (stdout, _, _) = run_cli(home.path(), &["stats", "all"]);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["completedSessions"], 1);
    assert_eq!(parsed["totalFocusSeconds"], 1);
    assert_eq!(parsed["totalBreakSeconds"], 1);
}

#[test]
fn test_run_without_auto_switch_stops_after_one_phase() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--focus", "1", "--no-auto-switch"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("\"TimerStopped\""));
    assert!(!stdout.contains("\"PhaseStarted\""));
}
