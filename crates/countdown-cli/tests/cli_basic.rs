//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against an isolated data directory and
//! verify outputs.

use std::path::Path;
use std::process::{Command, Stdio};

use countdown_core::{now_secs, Database, Prefs, TimerState};

/// Run a CLI command with `data_dir` as its data directory.
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_countdown"))
        .args(args)
        .env("COUNTDOWN_DATA_DIR", data_dir)
        .env_remove("COUNTDOWN_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn open_db(data_dir: &Path) -> Database {
    Database::open_at(&data_dir.join("countdown.db")).expect("Failed to open database")
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_status_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_json(dir.path(), &["status"]);
    let snapshot = &out["snapshot"];
    assert_eq!(snapshot["state"], "stopped");
    assert_eq!(snapshot["remaining_secs"], 600);
    assert_eq!(snapshot["display"], "10:00");
    assert_eq!(snapshot["controls"]["start"], true);
    assert_eq!(snapshot["controls"]["pause"], false);
    assert_eq!(snapshot["controls"]["stop"], false);
}

#[test]
fn test_start_persists_running_state() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_json(dir.path(), &["start"]);
    assert_eq!(out["snapshot"]["state"], "running");
    let types: Vec<_> = out["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap().to_string())
        .collect();
    assert!(types.contains(&"TimerStarted".to_string()));
    assert!(types.contains(&"AlarmScheduled".to_string()));

    let out = run_json(dir.path(), &["status"]);
    assert_eq!(out["snapshot"]["state"], "running");
    assert!(out["snapshot"]["remaining_secs"].as_u64().unwrap() <= 600);
}

#[test]
fn test_start_pause_stop() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["start"]);

    let out = run_json(dir.path(), &["pause"]);
    assert_eq!(out["snapshot"]["state"], "paused");
    assert_eq!(out["snapshot"]["controls"]["start"], true);
    assert_eq!(out["snapshot"]["controls"]["stop"], true);

    let out = run_json(dir.path(), &["stop"]);
    assert_eq!(out["snapshot"]["state"], "stopped");
    assert_eq!(out["snapshot"]["remaining_secs"], 600);
}

#[test]
fn test_disabled_control_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["pause"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("cannot pause: timer is stopped"), "{stderr}");
}

#[test]
fn test_paused_shows_notification() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["start"]);
    run_json(dir.path(), &["pause"]);

    let out = run_json(dir.path(), &["notification", "show"]);
    assert_eq!(out["notification"]["kind"], "paused");
    assert_eq!(out["message"], "Timer is paused.");
}

#[test]
fn test_notification_actions() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_json(dir.path(), &["notification", "start"]);
    assert_eq!(out["state"], "running");

    let out = run_json(dir.path(), &["notification", "show"]);
    assert_eq!(out["notification"]["kind"], "running");

    let out = run_json(dir.path(), &["notification", "pause"]);
    assert_eq!(out["state"], "paused");

    let out = run_json(dir.path(), &["notification", "stop"]);
    assert_eq!(out["state"], "stopped");

    let (code, _, _) = run_cli(dir.path(), &["notification", "resume"]);
    assert_ne!(code, 0);
}

#[test]
fn test_watch_once_reports_pending_alarm() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["watch", "--once"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no alarm pending"));

    run_json(dir.path(), &["start"]);
    let (code, stdout, _) = run_cli(dir.path(), &["watch", "--once"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("alarm pending"), "{stdout}");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "timer.length_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.length_minutes", "3"]);
    assert_eq!(code, 0);

    let out = run_json(dir.path(), &["status"]);
    assert_eq!(out["snapshot"]["remaining_secs"], 180);
    assert_eq!(out["snapshot"]["display"], "3:00");
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.length_minutes", "0"]);
    assert_ne!(code, 0);
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "timer.nope", "1"]);
    assert_ne!(code, 0);
    let (code, _, _) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_list_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "alarm.enabled", "false"]);
    let out = run_json(dir.path(), &["config", "list"]);
    assert_eq!(out["alarm"]["enabled"], false);

    let (code, stdout, _) = run_cli(dir.path(), &["config", "list", "--toml"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("[timer]"));

    run_cli(dir.path(), &["config", "reset"]);
    let out = run_json(dir.path(), &["config", "list"]);
    assert_eq!(out["alarm"]["enabled"], true);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("countdown"));
}

#[test]
fn test_run_on_stopped_timer_exits_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["run"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("10:00"), "{stderr}");

    let db = open_db(dir.path());
    let prefs = Prefs::new(&db);
    assert_eq!(prefs.timer_state().unwrap(), TimerState::Stopped);
    assert_eq!(prefs.seconds_remaining().unwrap(), 600);
    assert_eq!(prefs.previous_timer_length_seconds().unwrap(), 600);
}

#[test]
fn test_run_ticks_to_expiry_with_closed_stderr() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = open_db(dir.path());
        let prefs = Prefs::new(&db);
        prefs.set_timer_state(TimerState::Running).unwrap();
        prefs.set_previous_timer_length_seconds(2).unwrap();
        prefs.set_seconds_remaining(2).unwrap();
    }

    let mut child = Command::new(env!("CARGO_BIN_EXE_countdown"))
        .arg("run")
        .env("COUNTDOWN_DATA_DIR", dir.path())
        .env_remove("COUNTDOWN_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    drop(child.stderr.take());
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Timer expired!"));

    let db = open_db(dir.path());
    let prefs = Prefs::new(&db);
    assert_eq!(prefs.timer_state().unwrap(), TimerState::Stopped);
    assert_eq!(prefs.seconds_remaining().unwrap(), 600);
    assert_eq!(prefs.alarm_wake_up_time().unwrap(), None);
}

#[test]
fn test_watch_once_fires_due_alarm() {
    let dir = tempfile::tempdir().unwrap();
    let now = now_secs();
    {
        let db = open_db(dir.path());
        let prefs = Prefs::new(&db);
        prefs.set_timer_state(TimerState::Running).unwrap();
        prefs.set_previous_timer_length_seconds(600).unwrap();
        prefs.set_seconds_remaining(600).unwrap();
        prefs.set_alarm_set_time(now - 605).unwrap();
        prefs.set_alarm_wake_up_time(Some(now - 5)).unwrap();
    }

    let (code, stdout, stderr) = run_cli(dir.path(), &["watch", "--once"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("Timer expired!"), "{stdout}");

    let out = run_json(dir.path(), &["notification", "show"]);
    assert_eq!(out["notification"]["kind"], "expired");
    assert_eq!(out["actions"][0], "start");

    let out = run_json(dir.path(), &["status"]);
    assert_eq!(out["snapshot"]["state"], "stopped");
    assert_eq!(out["snapshot"]["remaining_secs"], 600);
}

#[cfg(unix)]
#[test]
fn test_watch_exits_cleanly_on_sigint() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_countdown"))
        .arg("watch")
        .env("COUNTDOWN_DATA_DIR", dir.path())
        .env_remove("COUNTDOWN_LOG")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn CLI");

    // Let a couple of poll iterations pass before interrupting.
    std::thread::sleep(std::time::Duration::from_millis(2_500));
    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(0));
}
