//! Tests for the `stepref` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use stepref::core::StepId;
use stepref::model::Element;
use stepref::test_utils::fixtures::{SAMPLE_SCHEMA_TOML, plan_element, reference_element, step_element};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("schema.toml"), SAMPLE_SCHEMA_TOML).unwrap();
        Self {
            dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, element: &Element) -> PathBuf {
        let path = self.path(name);
        element.write_to(&path, true).unwrap();
        path
    }

    fn stepref(&self) -> Command {
        let mut cmd = Command::cargo_bin("stepref").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("STEPREF_IGNORE_ERRORS")
            .env_remove("RUST_LOG")
            .arg("--schema")
            .arg(self.path("schema.toml"));
        cmd
    }
}

fn dangling_plan() -> Element {
    let alias = step_element("Sweep", StepId::new()).with_child(reference_element("Target", StepId::new()));
    plan_element(vec![alias])
}

#[test]
fn test_check_clean_document() {
    let ws = Workspace::new();
    ws.write("plan.json", &plan_element(vec![step_element("Delay", StepId::new())]));

    ws.stepref()
        .args(["check", "plan.json", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 step(s)").and(predicate::str::contains("0 warning(s)")));
}

#[test]
fn test_check_reports_unresolved_reference() {
    let ws = Workspace::new();
    ws.write("plan.json", &dangling_plan());

    ws.stepref()
        .args(["check", "plan.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 warning(s)"))
        .stderr(predicate::str::contains("Unable to resolve step reference"));
}

#[test]
fn test_check_strict_fails_on_warnings() {
    let ws = Workspace::new();
    ws.write("plan.json", &dangling_plan());

    ws.stepref()
        .args(["check", "plan.json", "--strict"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("strict mode"));
}

#[test]
fn test_ignore_errors_from_environment() {
    let ws = Workspace::new();
    ws.write("plan.json", &dangling_plan());

    ws.stepref()
        .env("STEPREF_IGNORE_ERRORS", "1")
        .args(["check", "plan.json", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 warning(s)"));
}

#[test]
fn test_ignore_errors_from_config_file() {
    let ws = Workspace::new();
    ws.write("plan.json", &dangling_plan());
    fs::write(ws.path("stepref.toml"), "ignore-errors = true\n").unwrap();

    ws.stepref()
        .args(["--config", "stepref.toml", "check", "plan.json", "--strict"])
        .assert()
        .success();
}

#[test]
fn test_normalize_to_stdout_writes_references() {
    let ws = Workspace::new();
    let shared = StepId::new();
    let alias = step_element("Sweep", StepId::new()).with_child(reference_element("Target", shared));
    ws.write("plan.json", &plan_element(vec![alias, step_element("Delay", shared)]));

    let output = ws.stepref().args(["normalize", "plan.json"]).assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
    let written = Element::from_json(&stdout).unwrap();
    let target = written.child("Steps").unwrap().children[0].child("Target").unwrap();
    assert_eq!(target.value(), shared.to_string());
}

#[test]
fn test_paste_writes_output_file() {
    let ws = Workspace::new();
    let owner = StepId::new();
    ws.write("plan.json", &plan_element(vec![step_element("Sweep", owner)]));
    ws.write("step.json", &step_element("Delay", StepId::new()));

    ws.stepref()
        .args(["paste", "plan.json", "step.json", "--parent", &owner.to_string(), "--output", "out.json"])
        .assert()
        .success();

    let written = Element::read_from(&ws.path("out.json")).unwrap();
    let sweep = &written.child("Steps").unwrap().children[0];
    assert_eq!(sweep.child("ChildTestSteps").map(|c| c.children.len()), Some(1));
}

#[test]
fn test_missing_schema_is_reported() {
    let ws = Workspace::new();
    ws.write("plan.json", &plan_element(Vec::new()));

    let mut cmd = Command::cargo_bin("stepref").unwrap();
    cmd.current_dir(ws.dir.path())
        .env_remove("STEPREF_SCHEMA")
        .args(["check", "plan.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--schema"));
}

#[test]
fn test_invalid_schema_is_reported() {
    let ws = Workspace::new();
    fs::write(ws.path("schema.toml"), "[[types]]\nname = \"Loop\"\nbase = \"Loop\"\n").unwrap();
    ws.write("plan.json", &plan_element(Vec::new()));

    ws.stepref().args(["check", "plan.json"]).assert().failure().code(1);
}
