#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mtnt(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mtnt").unwrap();
    cmd.current_dir(dir.path())
        .env("MTNT_HOME", dir.path())
        .env("TZ", "UTC")
        .env_remove("RUST_LOG");
    cmd
}

fn add_task(dir: &TempDir, name: &str, start: &str, every: &str) {
    mtnt(dir)
        .args(["task", "add", name, "--start", start, "--every", every])
        .assert()
        .success();
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn first_run_writes_default_config() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));

    assert!(dir.path().join("config.yaml").exists());
}

#[test]
fn verbose_logs_first_run_config_write() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["-v", "config", "path"])
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote default config"));
}

#[test]
fn config_show_lists_data_files() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("task_list.json"))
        .stdout(predicate::str::contains("action_list.json"));
}

// ---------------------------------------------------------------------------
// task add / list / get
// ---------------------------------------------------------------------------

#[test]
fn task_add_and_list() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "oil change", "2024-01-01 09:00", "30 days");

    assert!(dir.path().join("task_list.json").exists());

    mtnt(&dir)
        .args(["task", "list", "--at", "2024-01-10 00:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("oil change"))
        .stdout(predicate::str::contains("30 days"))
        .stdout(predicate::str::contains("2024-01-31 09:00"));
}

#[test]
fn task_add_duplicate_fails() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "filter", "2024-01-01 09:00", "1 week");

    mtnt(&dir)
        .args(["task", "add", "filter", "--every", "2 weeks"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn task_add_rejects_bad_interval() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["task", "add", "gutters", "--every", "every so often"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse interval"));
}

#[test]
fn task_get_missing_fails() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["task", "get", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn task_list_json() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "smoke alarm", "2024-01-01 09:00", "1 day");

    let output = mtnt(&dir)
        .args(["task", "list", "--json", "--at", "2024-01-05 08:00"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "smoke alarm");
    assert_eq!(items[0]["interval_seconds"], 86_400);
    assert_eq!(items[0]["next"], "2024-01-05T09:00:00+00:00");
    assert_eq!(items[0]["overdue"], true);
}

#[test]
fn task_search_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "Clean Gutters", "2024-01-01 09:00", "12 weeks");
    add_task(&dir, "oil change", "2024-01-01 09:00", "30 days");

    mtnt(&dir)
        .args(["task", "search", "gutter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Clean Gutters"))
        .stdout(predicate::str::contains("oil change").not());
}

// ---------------------------------------------------------------------------
// record / action
// ---------------------------------------------------------------------------

#[test]
fn record_and_list_actions() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "oil change", "2024-01-01 09:00", "30 days");

    mtnt(&dir)
        .args([
            "record",
            "oil change",
            "--at",
            "2024-01-15 10:00",
            "--actor",
            "sam",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded run of 'oil change'"));

    mtnt(&dir)
        .args(["action", "list", "--task", "oil change"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-15 10:00"))
        .stdout(predicate::str::contains("sam"));
}

#[test]
fn record_unknown_task_fails() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["record", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task 'ghost' not found"));
}

#[test]
fn action_list_desc_orders_newest_first() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "water plants", "2024-01-01 09:00", "2 days");
    for at in ["2024-01-01 09:05", "2024-01-05 09:05", "2024-01-03 09:05"] {
        mtnt(&dir)
            .args(["record", "water plants", "--at", at])
            .assert()
            .success();
    }

    let output = mtnt(&dir)
        .args(["action", "list", "--desc", "--json"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stamps: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["timestamp"].as_str().unwrap())
        .collect();
    assert_eq!(
        stamps,
        vec![
            "2024-01-05T09:05:00+00:00",
            "2024-01-03T09:05:00+00:00",
            "2024-01-01T09:05:00+00:00",
        ]
    );
}

#[test]
fn delete_task_blocked_by_actions() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "oil change", "2024-01-01 09:00", "30 days");
    mtnt(&dir)
        .args(["record", "oil change", "--at", "2024-01-15 10:00"])
        .assert()
        .success();

    mtnt(&dir)
        .args(["task", "delete", "oil change"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still reference it"));

    mtnt(&dir)
        .args(["action", "delete", "oil change", "--at", "2024-01-15 10:00"])
        .assert()
        .success();

    mtnt(&dir)
        .args(["task", "delete", "oil change"])
        .assert()
        .success();

    mtnt(&dir)
        .args(["task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks."));
}

#[test]
fn action_recorded_now_can_be_deleted_by_its_shown_minute() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["task", "add", "filter", "--every", "1 day"])
        .assert()
        .success();
    mtnt(&dir).args(["record", "filter"]).assert().success();

    let output = mtnt(&dir)
        .args(["action", "list", "--json"])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stamp = value[0]["timestamp"].as_str().unwrap().to_string();
    assert!(stamp.contains(":00+00:00"), "not minute-aligned: {stamp}");

    // the minute as the table shows it, e.g. "2024-01-15 10:00"
    let shown = stamp[..16].replace('T', " ");
    mtnt(&dir)
        .args(["action", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(shown.as_str()));

    mtnt(&dir)
        .args(["action", "delete", "filter", "--at", shown.as_str()])
        .assert()
        .success();
    mtnt(&dir)
        .args(["action", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No actions."));
}

#[test]
fn action_delete_missing_fails() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "oil change", "2024-01-01 09:00", "30 days");

    mtnt(&dir)
        .args(["action", "delete", "oil change", "--at", "2024-01-15 10:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no action for task 'oil change'"));
}

// ---------------------------------------------------------------------------
// task edit
// ---------------------------------------------------------------------------

#[test]
fn edit_rename_moves_actions() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "oil", "2024-01-01 09:00", "30 days");
    mtnt(&dir)
        .args(["record", "oil", "--at", "2024-01-15 10:00"])
        .assert()
        .success();

    mtnt(&dir)
        .args(["task", "edit", "oil", "--name", "engine oil"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated task 'engine oil'"));

    mtnt(&dir).args(["task", "get", "oil"]).assert().failure();

    mtnt(&dir)
        .args(["action", "list", "--task", "engine oil"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-15 10:00"));

    mtnt(&dir)
        .args(["task", "delete", "engine oil"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 action(s)"));
}

#[test]
fn edit_to_existing_name_changes_nothing() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "a", "2024-01-01 09:00", "1 day");
    add_task(&dir, "b", "2024-01-01 09:00", "1 day");

    mtnt(&dir)
        .args(["task", "edit", "a", "--name", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    mtnt(&dir).args(["task", "get", "a"]).assert().success();
}

#[test]
fn edit_without_changes_fails() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "a", "2024-01-01 09:00", "1 day");

    mtnt(&dir)
        .args(["task", "edit", "a"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to change"));
}

// ---------------------------------------------------------------------------
// due / overdue
// ---------------------------------------------------------------------------

#[test]
fn due_shows_next_occurrence_in_window() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "feed fish", "2024-01-01 09:00", "1 day");
    add_task(&dir, "descale", "2024-01-01 09:00", "4 weeks");

    mtnt(&dir)
        .args(["due", "--at", "2024-01-05 08:00", "--within", "2 hours"])
        .assert()
        .success()
        .stdout(predicate::str::contains("feed fish"))
        .stdout(predicate::str::contains("2024-01-05 09:00"))
        .stdout(predicate::str::contains("descale").not());
}

#[test]
fn due_all_lists_every_occurrence() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "feed fish", "2024-01-01 09:00", "1 day");

    let output = mtnt(&dir)
        .args([
            "due",
            "--json",
            "--all",
            "--at",
            "2024-01-05 08:00",
            "--within",
            "3 days",
        ])
        .output()
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let times = value[0]["times"].as_array().unwrap();
    assert_eq!(times.len(), 3);
    assert_eq!(times[0], "2024-01-05T09:00:00+00:00");
    assert_eq!(times[2], "2024-01-07T09:00:00+00:00");
}

#[test]
fn due_negative_window_looks_back() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "feed fish", "2024-01-01 09:00", "1 day");

    mtnt(&dir)
        .args(["due", "--all", "--at", "2024-01-05 10:00", "--within=-2h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-05 09:00"));
}

#[test]
fn due_negative_window_needs_all() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "feed fish", "2024-01-01 09:00", "1 day");

    mtnt(&dir)
        .args(["due", "--at", "2024-01-05 10:00", "--within=-2h"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only works with --all"));
}

#[test]
fn overdue_until_recorded() {
    let dir = TempDir::new().unwrap();
    add_task(&dir, "mow lawn", "2024-01-01 09:00", "7 days");

    mtnt(&dir)
        .args(["overdue", "--at", "2024-01-10 12:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mow lawn"))
        .stdout(predicate::str::contains("2024-01-08 09:00"))
        .stdout(predicate::str::contains("never"));

    mtnt(&dir)
        .args(["record", "mow lawn", "--at", "2024-01-09 10:00"])
        .assert()
        .success();

    mtnt(&dir)
        .args(["overdue", "--at", "2024-01-10 12:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing overdue."));
}

#[test]
fn unscheduled_task_is_never_due() {
    let dir = TempDir::new().unwrap();
    mtnt(&dir)
        .args(["task", "add", "someday", "--unscheduled", "--every", "1 day"])
        .assert()
        .success();

    mtnt(&dir)
        .args(["due", "--within", "30 days"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing due."));
    mtnt(&dir)
        .args(["overdue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing overdue."));
}
