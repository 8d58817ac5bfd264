use serde_json::{Value, json};

use super::*;

fn sample() -> Value {
    json!({
        "metadata": {"plan_id": "plan-demo", "version": "1.0"},
        "planning": {"goal": "Demo", "priority": "Medium"},
        "phases": [
            {
                "number": 1,
                "name": "Setup",
                "status": "completed",
                "completion_percentage": 100,
                "estimated_effort": "2h",
                "actual_effort": 1.5,
                "steps": [
                    {"number": 1, "description": "Scaffold", "status": "completed"},
                    {"number": 2, "description": "Configure"}
                ],
                "dependencies": [],
                "risk": "low"
            },
            {
                "number": 2,
                "name": "Build",
                "status": "in_progress",
                "dependencies": [1, "Phase 1", "after setup", null]
            }
        ],
        "success_criteria": ["Works"]
    })
}

#[test]
fn test_decode_keeps_unknown_keys() {
    let plan: Plan = serde_json::from_value(sample()).unwrap();
    assert_eq!(plan.extra["success_criteria"], json!(["Works"]));
    assert_eq!(plan.phases[0].extra["risk"], "low");
    assert_eq!(plan.phases[0].steps()[0].extra["description"], "Scaffold");
    assert_eq!(plan.metadata.fields["plan_id"], "plan-demo");

    let back = serde_json::to_value(&plan).unwrap();
    assert_eq!(back["phases"][0]["risk"], "low");
    assert_eq!(back["success_criteria"], json!(["Works"]));
    assert!(back["phases"][1].get("steps").is_none());
}

#[test]
fn test_stale_phase_index_decodes_as_absent() {
    let mut doc = sample();
    doc["phase_index"] = json!({"total": 3, "current_in_progress": "Phase 2"});
    let plan: Plan = serde_json::from_value(doc).unwrap();
    assert!(plan.phase_index.is_none());
    assert!(plan.extra.get("phase_index").is_none());

    let mut doc = sample();
    doc["phase_index"] = json!({"total": 2, "current_in_progress": 2});
    let plan: Plan = serde_json::from_value(doc).unwrap();
    assert_eq!(plan.phase_index.map(|i| i.current_in_progress), Some(Some(2)));
}

#[test]
fn test_missing_optional_fields_use_defaults() {
    let plan: Plan = serde_json::from_value(sample()).unwrap();
    let build = &plan.phases[1];
    assert_eq!(build.owner(), "unassigned");
    assert_eq!(build.completion(), 0);
    assert!(build.steps().is_empty());
    assert_eq!(build.step_completion(), None);
    assert_eq!(plan.phases[0].steps()[1].status(), Status::NotStarted);
}

#[test]
fn test_effort_forms() {
    let plan: Plan = serde_json::from_value(sample()).unwrap();
    assert_eq!(
        plan.phases[0].estimated_effort,
        Some(Effort::Text("2h".to_string()))
    );
    assert_eq!(plan.phases[0].estimated_effort.as_ref().and_then(Effort::hours), Some(2.0));
    assert_eq!(plan.phases[0].actual_effort, Some(Effort::Hours(1.5)));
    assert_eq!(Effort::Whole(4).hours(), Some(4.0));
    assert_eq!(Effort::Text("soon".to_string()).hours(), None);
    assert_eq!(plan.total_actual_effort(), 1.5);
}

#[test]
fn test_dependency_references_normalize() {
    let plan: Plan = serde_json::from_value(sample()).unwrap();
    let build = &plan.phases[1];
    assert_eq!(
        build.dependencies.as_deref().map(<[DependencyRef]>::len),
        Some(4)
    );
    assert_eq!(build.dependency_numbers(), vec![1, 1]);
}

#[test]
fn test_step_completion_truncates() {
    let plan: Plan = serde_json::from_value(sample()).unwrap();
    assert_eq!(plan.phases[0].completed_steps(), 1);
    assert_eq!(plan.phases[0].step_completion(), Some(50));

    let mut phase = Phase::new(3, "Test");
    phase.steps = Some(
        (1..=3)
            .map(|n| Step {
                number: n,
                status: Some(if n < 3 { Status::Completed } else { Status::InProgress }),
                extra: serde_json::Map::new(),
            })
            .collect(),
    );
    assert_eq!(phase.step_completion(), Some(66));
}

#[test]
fn test_plan_queries() {
    let plan: Plan = serde_json::from_value(sample()).unwrap();
    assert_eq!(plan.current_phase().map(|p| p.number), Some(2));
    assert_eq!(plan.phase(1).map(Phase::name), Some("Setup"));
    assert!(!plan.all_completed());
    assert!(!plan.metadata.is_archived());
    assert_eq!(plan.planning().goal(), "Demo");
    assert_eq!(plan.planning().timeline(), "N/A");
    assert!(plan.history().is_empty());
}

#[test]
fn test_status_parsing() {
    assert_eq!("IN_PROGRESS".parse::<Status>().unwrap(), Status::InProgress);
    let err = "done".parse::<Status>().unwrap_err();
    assert!(err.contains("not_started"));
}
