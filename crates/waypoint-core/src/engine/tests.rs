//! Tests for the engine module.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};
use tempfile::TempDir;

use super::*;
use crate::{config::FixedClock, models::Status, registry::StaticRegistry};

fn create_test_engine(config: EngineConfig) -> LifecycleEngine {
    EngineBuilder::new()
        .with_config(config)
        .with_registry(Arc::new(StaticRegistry::new(["backend-specialist"])))
        .with_clock(Arc::new(FixedClock::utc(
            "2025-11-23T08:00:00Z".parse().expect("valid timestamp"),
        )))
        .build()
        .expect("Failed to build engine")
}

fn phase(number: u32, status: &str, deps: Value) -> Value {
    json!({
        "number": number,
        "name": format!("Phase {number}"),
        "description": "Work",
        "status": status,
        "completion_percentage": if status == "completed" { 100 } else { 0 },
        "estimated_effort": "3h",
        "assigned_subagent": "backend-specialist",
        "steps": [{"number": 1, "description": "Do it", "status": "not_started"}],
        "dependencies": deps,
        "blockers": [],
        "deliverables": []
    })
}

fn write_plan(dir: &Path, phases: Vec<Value>) -> PathBuf {
    let path = dir.join("plan-test.json");
    let document = json!({
        "metadata": {"created": "2025-11-20", "created_by": "planner", "plan_id": "plan-test", "version": "1.0"},
        "planning": {
            "goal": "Test", "reason": "Coverage", "scope": "Engine",
            "success_metrics": [], "estimated_timeline": "1 day", "priority": "Low"
        },
        "files_impacted": [],
        "phases": phases,
        "subagent_assignments": [],
        "reference_documents": [],
        "potential_blockers": [],
        "success_criteria": ["Green"]
    });
    std::fs::write(&path, serde_json::to_string_pretty(&document).expect("render")).expect("write plan");
    path
}

#[test]
fn test_empty_mutation_list_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_plan(temp_dir.path(), vec![phase(1, "not_started", json!([])), phase(2, "not_started", json!([1]))]);
    let engine = create_test_engine(EngineConfig::default());

    let err = engine.apply(&path, &[], false).unwrap_err();
    assert!(matches!(err, LifecycleError::InvalidInput { ref field, .. } if field == "mutations"));
}

#[test]
fn test_forced_start_allows_second_phase_in_progress() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_plan(
        temp_dir.path(),
        vec![phase(1, "in_progress", json!([])), phase(2, "not_started", json!([]))],
    );
    let engine = create_test_engine(EngineConfig::default());

    let outcome = engine.start_next(&path, true).unwrap();
    assert_eq!(outcome.index.in_progress, vec![1, 2]);
    assert_eq!(outcome.index.current_in_progress, Some(1));
    assert!(outcome.messages[0].contains("(forced)"));
}

#[test]
fn test_strict_policy_rejects_retroactive_completion() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_plan(temp_dir.path(), vec![phase(1, "not_started", json!([])), phase(2, "not_started", json!([1]))]);
    let engine = create_test_engine(EngineConfig {
        transition_policy: crate::transitions::TransitionPolicy::Strict,
        ..EngineConfig::default()
    });

    let err = engine
        .set_phase_status(&path, 1, Status::Completed, None, false)
        .unwrap_err();
    assert!(matches!(err, LifecycleError::IllegalTransition { .. }));
}

#[test]
fn test_resolve_context_defaults_to_sibling_directory() {
    let engine = create_test_engine(EngineConfig::default());
    let resolved = engine.resolve_context(Path::new("Docs/Plans/plan-test.json"), "context-1.json");
    assert_eq!(resolved, Path::new("Docs/Plans/../Context/context-1.json"));

    let absolute = engine.resolve_context(Path::new("plan-test.json"), "/tmp/context-1.json");
    assert_eq!(absolute, Path::new("/tmp/context-1.json"));
}

#[test]
fn test_resolve_context_uses_configured_directory() {
    let engine = create_test_engine(EngineConfig {
        context_dir: Some(PathBuf::from("/srv/context")),
        ..EngineConfig::default()
    });
    let resolved = engine.resolve_context(Path::new("Docs/Plans/plan-test.json"), "context-1.json");
    assert_eq!(resolved, Path::new("/srv/context/context-1.json"));
}

#[test]
fn test_configured_backup_directory() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_plan(temp_dir.path(), vec![phase(1, "not_started", json!([])), phase(2, "not_started", json!([1]))]);
    let engine = create_test_engine(EngineConfig {
        backup_dir: "snapshots".to_string(),
        ..EngineConfig::default()
    });

    engine.start_next(&path, false).unwrap();
    assert!(temp_dir.path().join("snapshots").join("plan-test.2025-11-23.backup.json").exists());
}

#[test]
fn test_string_effort_is_preserved_on_save() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = write_plan(temp_dir.path(), vec![phase(1, "not_started", json!([])), phase(2, "not_started", json!([1]))]);
    let engine = create_test_engine(EngineConfig::default());

    engine.start_next(&path, false).unwrap();
    let saved: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(saved["phases"][0]["estimated_effort"], "3h");
    assert_eq!(saved["metadata"]["last_updated"], "2025-11-23T08:00:00Z");
}

#[test]
fn test_empty_validator_command_is_configuration_error() {
    let result = EngineBuilder::new()
        .with_config(EngineConfig {
            validator_command: Some(Vec::new()),
            ..EngineConfig::default()
        })
        .build();
    assert!(matches!(result, Err(LifecycleError::Configuration { .. })));
}
