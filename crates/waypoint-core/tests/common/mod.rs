#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};
use tempfile::TempDir;
use waypoint_core::{
    EngineBuilder, FixedClock, LifecycleEngine, StaticRegistry, ValidationReport, Validator,
    validate::{Issue, Rule, Unavailable},
};

/// A `Docs/Plans` + `Docs/Context` layout inside a temporary directory.
pub struct Workspace {
    pub dir: TempDir,
    pub plans: PathBuf,
    pub context: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let plans = dir.path().join("Docs").join("Plans");
        let context = dir.path().join("Docs").join("Context");
        std::fs::create_dir_all(&plans).expect("Failed to create plans dir");
        std::fs::create_dir_all(&context).expect("Failed to create context dir");
        Self { dir, plans, context }
    }

    /// Writes `document` as `Docs/Plans/<name>` and returns its path.
    pub fn write_plan(&self, name: &str, document: &Value) -> PathBuf {
        let path = self.plans.join(name);
        let text = serde_json::to_string_pretty(document).expect("Failed to render plan");
        std::fs::write(&path, text).expect("Failed to write plan");
        path
    }

    pub fn write_context(&self, name: &str) -> PathBuf {
        let path = self.context.join(name);
        std::fs::write(&path, "{}").expect("Failed to write context file");
        path
    }
}

pub fn bytes(path: &Path) -> Vec<u8> {
    std::fs::read(path).expect("Failed to read file")
}

pub fn document(path: &Path) -> Value {
    serde_json::from_slice(&bytes(path)).expect("Plan is not JSON")
}

pub fn phase(number: u32, status: &str, dependencies: Value) -> Value {
    let completion = match status {
        "completed" => 100,
        "in_progress" => 50,
        _ => 0,
    };
    json!({
        "number": number,
        "name": format!("Phase {number} work"),
        "description": "Work to do",
        "status": status,
        "completion_percentage": completion,
        "estimated_effort": 4,
        "assigned_subagent": "backend-specialist",
        "steps": [
            {"number": 1, "description": "First", "status": "not_started"},
            {"number": 2, "description": "Second", "status": "not_started"},
            {"number": 3, "description": "Third", "status": "not_started"}
        ],
        "dependencies": dependencies,
        "blockers": [],
        "deliverables": ["Code"]
    })
}

pub fn plan(phases: Vec<Value>) -> Value {
    json!({
        "metadata": {
            "created": "2025-11-20",
            "created_by": "planner",
            "plan_id": "plan-billing",
            "version": "1.0"
        },
        "planning": {
            "goal": "Ship billing",
            "reason": "Revenue",
            "scope": "Backend and UI",
            "success_metrics": ["Invoices sent"],
            "estimated_timeline": "2 weeks",
            "priority": "High"
        },
        "files_impacted": [{"path": "src/billing.rs", "action": "create"}],
        "phases": phases,
        "subagent_assignments": [
            {"subagent": "backend-specialist", "phases_involved": [1]}
        ],
        "reference_documents": [],
        "potential_blockers": [],
        "success_criteria": ["Invoices reach customers"]
    })
}

/// Phase 1 completed, Phase 2 in progress, Phase 3 waiting on Phase 2.
pub fn three_phase_plan() -> Value {
    plan(vec![
        phase(1, "completed", json!([])),
        phase(2, "in_progress", json!([1])),
        phase(3, "not_started", json!([2])),
    ])
}

pub fn clock(date: &str) -> Arc<FixedClock> {
    let at = format!("{date}T12:00:00Z").parse().expect("Invalid timestamp");
    Arc::new(FixedClock::utc(at))
}

pub fn registry() -> Arc<StaticRegistry> {
    Arc::new(StaticRegistry::new([
        "backend-specialist",
        "frontend-specialist",
    ]))
}

pub fn builder(date: &str) -> EngineBuilder {
    EngineBuilder::new()
        .with_registry(registry())
        .with_clock(clock(date))
}

pub fn engine(date: &str) -> LifecycleEngine {
    builder(date).build().expect("Failed to build engine")
}

pub fn engine_with_validator(validator: Arc<dyn Validator>) -> LifecycleEngine {
    builder("2025-11-23")
        .with_validator(validator)
        .build()
        .expect("Failed to build engine")
}

/// Blocks every write.
pub struct RejectingValidator;

impl Validator for RejectingValidator {
    fn validate(&self, _path: &Path, _content: &str) -> Result<ValidationReport, Unavailable> {
        let mut report = ValidationReport::new();
        report.push(Issue::blocking(Rule::External, "", "Rejected by policy"));
        Ok(report)
    }
}

/// Never reachable.
pub struct UnavailableValidator;

impl Validator for UnavailableValidator {
    fn validate(&self, _path: &Path, _content: &str) -> Result<ValidationReport, Unavailable> {
        Err(Unavailable::new("validator binary not found"))
    }
}

/// Accepts with one warning.
pub struct WarningValidator;

impl Validator for WarningValidator {
    fn validate(&self, _path: &Path, _content: &str) -> Result<ValidationReport, Unavailable> {
        let mut report = ValidationReport::new();
        report.push(Issue::warning(Rule::External, "", "Consider smaller phases"));
        Ok(report)
    }
}
