//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory and
//! checks the JSON it prints.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_focusweek"))
        .args(args)
        .env("FOCUSWEEK_HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("{args:?} printed non-JSON ({e}): {stdout}"))
}

#[test]
fn test_task_add_and_list() {
    let home = tempfile::tempdir().unwrap();
    let task = run_json(home.path(), &["task", "add", "mon", "Write", "report"]);
    assert_eq!(task["content"], "Write report");
    assert_eq!(task["dayIndex"], 0);
    assert_eq!(task["status"], "todo");

    let week = run_json(home.path(), &["task", "list"]);
    let days = week.as_array().unwrap();
    assert_eq!(days.len(), 7);
    assert_eq!(days[0]["count"], 1);
    assert_eq!(days[0]["tasks"][0]["id"], task["id"]);

    let tuesday = run_json(home.path(), &["task", "list", "--day", "tuesday"]);
    assert_eq!(tuesday["count"], 0);
}

#[test]
fn test_fourth_task_on_a_day_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    for n in 1..=3 {
        run_json(home.path(), &["task", "add", "2", &format!("task {n}")]);
    }
    let (_, stderr, code) = run_cli(home.path(), &["task", "add", "2", "one too many"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("already has 3 tasks"), "stderr: {stderr}");

    let wednesday = run_json(home.path(), &["task", "list", "--day", "wed"]);
    assert_eq!(wednesday["count"], 3);
    assert_eq!(wednesday["full"], true);
}

#[test]
fn test_task_move_and_done() {
    let home = tempfile::tempdir().unwrap();
    let task = run_json(home.path(), &["task", "add", "fri", "Review"]);
    let id = task["id"].as_str().unwrap();

    let moved = run_json(home.path(), &["task", "move", id, "sunday"]);
    assert_eq!(moved["dayIndex"], 6);

    let done = run_json(home.path(), &["task", "done", id]);
    assert_eq!(done["status"], "done");
    let undone = run_json(home.path(), &["task", "done", id]);
    assert_eq!(undone["status"], "todo");
}

#[test]
fn test_focus_then_delete_stops_timer() {
    let home = tempfile::tempdir().unwrap();
    let task = run_json(home.path(), &["task", "add", "mon", "Deep work"]);
    let id = task["id"].as_str().unwrap();

    let focus = run_json(home.path(), &["task", "focus", id]);
    assert_eq!(focus["status"]["timer"]["isRunning"], true);
    assert_eq!(focus["status"]["timer"]["mode"], "focus");
    assert_eq!(focus["status"]["activeTask"]["status"], "wip");

    run_json(home.path(), &["task", "delete", id]);
    let status = run_json(home.path(), &["timer", "status"]);
    assert_eq!(status["timer"]["isRunning"], false);
    assert!(status["activeTask"].is_null());
}

#[test]
fn test_timer_mode_and_pause() {
    let home = tempfile::tempdir().unwrap();
    let switched = run_json(home.path(), &["timer", "mode", "short"]);
    assert_eq!(switched["status"]["timer"]["mode"], "short");
    assert_eq!(switched["status"]["timer"]["remainingSeconds"], 300);
    assert_eq!(switched["status"]["clock"], "05:00");

    let started = run_json(home.path(), &["timer", "start"]);
    assert_eq!(started["status"]["timer"]["isRunning"], true);
    let paused = run_json(home.path(), &["timer", "pause"]);
    assert_eq!(paused["status"]["timer"]["isRunning"], false);

    let (_, _, code) = run_cli(home.path(), &["timer", "mode", "siesta"]);
    assert_eq!(code, 1);
}

#[test]
fn test_notes_newest_first() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["note", "add", "call", "the", "bank"]);
    let second = run_json(home.path(), &["note", "add", "buy milk"]);

    let notes = run_json(home.path(), &["note", "list"]);
    assert_eq!(notes[0]["text"], "buy milk");
    assert_eq!(notes[1]["text"], "call the bank");

    run_json(home.path(), &["note", "delete", second["id"].as_str().unwrap()]);
    let cleared = run_json(home.path(), &["note", "clear"]);
    assert_eq!(cleared["cleared"], 1);

    let (_, _, code) = run_cli(home.path(), &["note", "add", "   "]);
    assert_eq!(code, 1);
}

#[test]
fn test_settings_validation() {
    let home = tempfile::tempdir().unwrap();
    let settings = run_json(
        home.path(),
        &["settings", "set", "--focus", "50", "--sound", "off", "--sound-kind", "bell"],
    );
    assert_eq!(settings["focusTime"], 50);
    assert_eq!(settings["soundEnabled"], false);
    assert_eq!(settings["soundType"], "bell");

    let status = run_json(home.path(), &["timer", "status"]);
    assert_eq!(status["timer"]["remainingSeconds"], 3000);

    let (_, _, code) = run_cli(home.path(), &["settings", "set", "--short", "0"]);
    assert_eq!(code, 1);
    let shown = run_json(home.path(), &["settings", "show"]);
    assert_eq!(shown["shortBreak"], 5);
}

#[test]
fn test_cloud_without_user_falls_back_to_local() {
    let home = tempfile::tempdir().unwrap();
    run_json(home.path(), &["config", "set", "storage.backend", "cloud"]);
    let status = run_json(home.path(), &["status"]);
    assert_eq!(status["connection"], "local");
    assert_eq!(status["week"].as_array().unwrap().len(), 7);

    run_json(home.path(), &["config", "set", "storage.user_id", "dana"]);
    run_json(home.path(), &["task", "add", "mon", "cloud task"]);
    let status = run_json(home.path(), &["status"]);
    assert_eq!(status["connection"], "cloud");
    assert_eq!(status["taskCount"], 1);
    assert!(home.path().join("focusweek.db").exists());
}

#[test]
fn test_config_get_prints_typed_json() {
    let home = tempfile::tempdir().unwrap();
    let backend = run_json(home.path(), &["config", "get", "storage.backend"]);
    assert_eq!(backend["key"], "storage.backend");
    assert_eq!(backend["value"], "local");

    let focus = run_json(home.path(), &["config", "get", "defaults.focusTime"]);
    assert_eq!(focus["value"], 25);

    let set = run_json(home.path(), &["config", "set", "defaults.focusTime", "40"]);
    assert_eq!(set["value"], 40);

    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}
