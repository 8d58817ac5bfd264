use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Plans directory, agent index and an empty XDG config home.
struct CliEnv {
    dir: TempDir,
    plans: PathBuf,
    registry: PathBuf,
}

impl CliEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let plans = dir.path().join("Docs").join("Plans");
        std::fs::create_dir_all(&plans).expect("Failed to create plans dir");
        std::fs::create_dir_all(dir.path().join("Docs").join("Context")).expect("Failed to create context dir");
        let registry = dir.path().join("AGENTS.md");
        std::fs::write(
            &registry,
            "| Category | Agent | Focus |\n|---|---|---|\n| Backend | backend-specialist | APIs |\n| Frontend | frontend-specialist | UI |\n",
        )
        .expect("Failed to write agent index");
        Self { dir, plans, registry }
    }

    fn write_plan(&self, phases: Vec<Value>) -> PathBuf {
        let path = self.plans.join("plan-billing.json");
        let document = json!({
            "metadata": {"created": "2025-11-20", "created_by": "planner", "plan_id": "plan-billing", "version": "1.0"},
            "planning": {
                "goal": "Ship billing", "reason": "Revenue", "scope": "Backend",
                "success_metrics": ["Invoices sent"], "estimated_timeline": "2 weeks", "priority": "High"
            },
            "files_impacted": [],
            "phases": phases,
            "subagent_assignments": [],
            "reference_documents": [],
            "potential_blockers": [],
            "success_criteria": ["Invoices reach customers"]
        });
        std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).expect("Failed to write plan");
        path
    }

    /// `wp --no-color --registry <index>` with configuration isolated to the temp dir
    fn wp(&self) -> Command {
        let mut cmd = Command::cargo_bin("wp").expect("Failed to find wp binary");
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .arg("--no-color")
            .arg("--registry")
            .arg(&self.registry);
        cmd
    }
}

fn phase(number: u32, status: &str, deps: Value) -> Value {
    json!({
        "number": number,
        "name": format!("Phase {number} work"),
        "description": "Work",
        "status": status,
        "completion_percentage": match status { "completed" => 100, "in_progress" => 50, _ => 0 },
        "estimated_effort": 4,
        "assigned_subagent": "backend-specialist",
        "steps": [
            {"number": 1, "description": "First", "status": "not_started"},
            {"number": 2, "description": "Second", "status": "not_started"}
        ],
        "dependencies": deps,
        "blockers": [],
        "deliverables": []
    })
}

fn read(path: &Path) -> Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_cli_start_next() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "completed", json!([])), phase(2, "not_started", json!([1]))]);

    env.wp()
        .arg("start-next")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Started Phase 2: Phase 2 work"))
        .stdout(predicate::str::contains("Created backup"));

    assert_eq!(read(&plan)["phases"][1]["status"], "in_progress");
}

#[test]
fn test_cli_start_next_rejected_while_in_progress() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "in_progress", json!([])), phase(2, "not_started", json!([]))]);
    let before = std::fs::read(&plan).unwrap();

    env.wp()
        .arg("start-next")
        .arg(&plan)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Phase 1 is already in_progress"));

    assert_eq!(std::fs::read(&plan).unwrap(), before);
}

#[test]
fn test_cli_phase_multi_update() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "completed", json!([])), phase(2, "in_progress", json!([1])), phase(3, "not_started", json!([2]))]);

    env.wp()
        .args(["phase".as_ref(), plan.as_os_str(), "2".as_ref()])
        .args(["--status", "completed", "--actual-effort", "3", "--notes", "Shipped"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated Phase 2 status: in_progress → completed"))
        .stdout(predicate::str::contains("Set Phase 2 actual effort: 3h"));

    let doc = read(&plan);
    assert_eq!(doc["phases"][1]["completion_notes"], "Shipped");
    assert_eq!(doc["phase_index"]["next_available"], 3);
}

#[test]
fn test_cli_illegal_transition_needs_force() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "completed", json!([])), phase(2, "not_started", json!([1]))]);

    env.wp()
        .args(["phase".as_ref(), plan.as_os_str(), "1".as_ref(), "--status".as_ref(), "not_started".as_ref()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid transition for Phase 1"));

    env.wp()
        .arg("--force")
        .args(["phase".as_ref(), plan.as_os_str(), "1".as_ref(), "--status".as_ref(), "not_started".as_ref()])
        .assert()
        .success()
        .stdout(predicate::str::contains("(forced)"));
}

#[test]
fn test_cli_step_updates_completion() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "in_progress", json!([])), phase(2, "not_started", json!([1]))]);

    env.wp()
        .args(["step".as_ref(), plan.as_os_str(), "1".as_ref(), "1".as_ref(), "completed".as_ref()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Auto-updated Phase 1 completion: 50% → 50%").not())
        .stdout(predicate::str::contains("Updated Phase 1, Step 1 status: not_started → completed"));

    assert_eq!(read(&plan)["phases"][0]["completion_percentage"], 50);
}

#[test]
fn test_cli_unknown_owner_without_registry_entry() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "in_progress", json!([])), phase(2, "not_started", json!([1]))]);

    env.wp()
        .args(["phase".as_ref(), plan.as_os_str(), "2".as_ref(), "--owner".as_ref(), "python-pro".as_ref()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown owner 'python-pro'"));
}

#[test]
fn test_cli_complete_last_phase_archives() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "completed", json!([])), phase(2, "in_progress", json!([1]))]);

    env.wp()
        .args(["complete".as_ref(), plan.as_os_str(), "--notes".as_ref(), "All done".as_ref()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan completed! Archived to:"));

    assert!(!plan.exists());
    assert!(env.plans.join("Completed").join("plan-billing.json").exists());
}

#[test]
fn test_cli_validate_exit_codes() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "completed", json!([])), phase(2, "not_started", json!([1]))]);

    env.wp()
        .arg("validate")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));

    let plan = env.write_plan(vec![phase(1, "not_started", json!([2])), phase(2, "not_started", json!([1]))]);
    env.wp()
        .arg("validate")
        .arg(&plan)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Circular dependency detected: Phase 1 → Phase 2 → Phase 1"));
}

#[test]
fn test_cli_status_view() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "completed", json!([])), phase(2, "in_progress", json!([1]))]);

    env.wp()
        .arg("status")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("## Currently In Progress"))
        .stdout(predicate::str::contains("`wp complete`: complete Phase 2"));
}

#[test]
fn test_cli_list_flags_open_phases() {
    let env = CliEnv::new();
    env.write_plan(vec![phase(1, "in_progress", json!([])), phase(2, "not_started", json!([1]))]);

    env.wp()
        .arg("list")
        .arg(&env.plans)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("## plan-billing.json"))
        .stdout(predicate::str::contains("still in_progress"));
}

#[test]
fn test_cli_restore_without_backup() {
    let env = CliEnv::new();
    let plan = env.write_plan(vec![phase(1, "completed", json!([])), phase(2, "not_started", json!([1]))]);

    env.wp()
        .arg("--no-backup")
        .arg("start-next")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created backup").not());

    env.wp()
        .arg("restore")
        .arg(&plan)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No backup available"));
}

#[test]
fn test_cli_missing_plan() {
    let env = CliEnv::new();

    env.wp()
        .arg("summary")
        .arg(env.plans.join("plan-missing.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}
