//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify outputs. Mutating steps live in one sequential workflow test
//! so parallel test threads don't contend for the SQLite file.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "studyplan-cli", "--"])
        .args(args)
        .env("STUDYPLAN_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Pull the record id out of a "Something created: <id>" line.
fn created_id(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.split_once("created: "))
        .map(|(_, id)| id.trim().to_string())
        .expect("no 'created:' line in output")
}

#[test]
fn test_config_show() {
    let (stdout, _stderr, code) = run_cli(&["config", "show"]);
    assert_eq!(code, 0, "config show failed");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json["planner"]["phase_weights"].is_array());
}

#[test]
fn test_invalid_weights_rejected() {
    let (_stdout, stderr, code) = run_cli(&["config", "set-weights", "50,40,30,20"]);
    assert_ne!(code, 0, "weights not summing to 100 must be rejected");
    assert!(stderr.contains("100"), "unexpected stderr: {stderr}");
}

#[test]
fn test_unknown_chapter_fails() {
    let (_stdout, _stderr, code) = run_cli(&["chapter", "get", "no-such-id"]);
    assert_ne!(code, 0, "unknown chapter id must fail");
}

#[test]
fn test_plan_chapter_progress_workflow() {
    // Plan creation and recomputation.
    let (stdout, _stderr, code) = run_cli(&[
        "plan", "create", "--start", "2024-01-01", "--months", "4", "--weekly-hours", "10",
    ]);
    assert_eq!(code, 0, "plan create failed");
    let plan_id = created_id(&stdout);

    let (stdout, _stderr, code) = run_cli(&["plan", "show", "--id", &plan_id]);
    assert_eq!(code, 0, "plan show failed");
    let plan: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(plan["plan"]["phases"].as_array().unwrap().len(), 4);

    let (stdout, _stderr, code) = run_cli(&[
        "plan", "edit", "--id", &plan_id, "--months", "6",
    ]);
    assert_eq!(code, 0, "plan edit failed");
    let edited: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(edited["plan"]["total_months"], 6);

    // Subject and chapter lifecycle.
    let (stdout, _stderr, code) = run_cli(&["subject", "add", "Calculus"]);
    assert_eq!(code, 0, "subject add failed");
    let subject_id = created_id(&stdout);

    let (stdout, _stderr, code) = run_cli(&["chapter", "add", &subject_id, "Limits"]);
    assert_eq!(code, 0, "chapter add failed");
    let chapter_id = created_id(&stdout);

    let survey = r#"{"phase":"survey","checklist":[{"label":"Skim","checked":true}],"minutes_spent":10}"#;
    let (stdout, _stderr, code) = run_cli(&["chapter", "complete", &chapter_id, survey]);
    assert_eq!(code, 0, "chapter complete failed");
    assert!(stdout.contains("Advanced to: question"), "unexpected output: {stdout}");

    // Guard failure is surfaced, not applied.
    let empty_questions = r#"{"phase":"question","questions":[],"minutes_spent":0}"#;
    let (_stdout, stderr, code) = run_cli(&["chapter", "complete", &chapter_id, empty_questions]);
    assert_ne!(code, 0, "empty question list must not pass the guard");
    assert!(stderr.contains("question"), "unexpected stderr: {stderr}");

    // Progress roll-ups.
    let (stdout, _stderr, code) = run_cli(&["progress", "subject", &subject_id]);
    assert_eq!(code, 0, "progress subject failed");
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["total_chapters"], 1);
    assert_eq!(report["completed_chapters"], 0);

    let (_stdout, _stderr, code) = run_cli(&["progress", "all"]);
    assert_eq!(code, 0, "progress all failed");
}
