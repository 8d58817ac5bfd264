//! In-process structural validation of plan documents.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Issue, Rule, Unavailable, ValidationReport, Validator};
use crate::{
    graph::{DependencyGraph, normalize_value},
    models::{Effort, Status},
    registry::{HUMAN_OWNER, OwnerRegistry, StaticRegistry},
};

const REQUIRED_TOP_LEVEL: [&str; 8] = [
    "metadata",
    "planning",
    "files_impacted",
    "phases",
    "subagent_assignments",
    "reference_documents",
    "potential_blockers",
    "success_criteria",
];

const ARRAY_FIELDS: [&str; 6] = [
    "files_impacted",
    "phases",
    "subagent_assignments",
    "reference_documents",
    "potential_blockers",
    "success_criteria",
];

const METADATA_FIELDS: [&str; 4] = ["created", "created_by", "plan_id", "version"];

const PLANNING_FIELDS: [&str; 6] = [
    "goal",
    "reason",
    "scope",
    "success_metrics",
    "estimated_timeline",
    "priority",
];

const PHASE_FIELDS: [&str; 11] = [
    "number",
    "name",
    "description",
    "status",
    "completion_percentage",
    "estimated_effort",
    "assigned_subagent",
    "steps",
    "dependencies",
    "blockers",
    "deliverables",
];

const PRIORITIES: [&str; 4] = ["Critical", "High", "Medium", "Low"];

/// Thresholds for the effort and size warnings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationLimits {
    /// Estimated effort above this is a warning
    pub max_phase_hours: f64,

    /// More phases than this is a warning
    pub max_phases: usize,

    /// Phases above this effort assigned to `human` get a warning
    pub complex_human_hours: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_phase_hours: 20.0,
            max_phases: 8,
            complex_human_hours: 10.0,
        }
    }
}

/// Schema, reference and dependency checks over a raw JSON document.
#[derive(Clone)]
pub struct StructuralValidator {
    registry: Arc<dyn OwnerRegistry>,
    limits: ValidationLimits,
}

impl StructuralValidator {
    pub fn new(registry: Arc<dyn OwnerRegistry>, limits: ValidationLimits) -> Self {
        Self { registry, limits }
    }

    /// Runs every check against `document`. Never fails.
    pub fn check(&self, document: &Value) -> ValidationReport {
        let mut report = ValidationReport::new();
        let Some(root) = document.as_object() else {
            report.push(Issue::blocking(
                Rule::Syntax,
                "",
                "Plan document must be a JSON object",
            ));
            return report;
        };

        check_required(root, &mut report);

        let phases = root
            .get("phases")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let numbers = phase_numbers(phases);

        for (i, phase) in phases.iter().enumerate() {
            self.check_phase(i + 1, phase, phases, &numbers, &mut report);
        }

        if let Some(cycle) = DependencyGraph::from_values(phases).find_cycle() {
            report.push(
                Issue::blocking(
                    Rule::Cycle(cycle.0.clone()),
                    "",
                    format!("Circular dependency detected: {cycle}"),
                )
                .with_hint("remove or reorder dependencies to break the cycle"),
            );
        }

        if let Some(assignments) = root.get("subagent_assignments").and_then(Value::as_array) {
            for (i, assignment) in assignments.iter().enumerate() {
                self.check_assignment(i + 1, assignment, &numbers, &mut report);
            }
        }

        self.check_quality(root, phases, &mut report);
        report
    }

    fn check_phase(
        &self,
        index: usize,
        phase: &Value,
        phases: &[Value],
        numbers: &HashSet<u32>,
        report: &mut ValidationReport,
    ) {
        let location = phase_location(index, phase);
        let Some(fields) = phase.as_object() else {
            report.push(Issue::blocking(Rule::FieldType, location, "Phase must be an object"));
            return;
        };

        for field in PHASE_FIELDS {
            if !fields.contains_key(field) {
                report.push(Issue::blocking(
                    Rule::RequiredField,
                    &location,
                    format!("Missing required field '{field}'"),
                ));
            }
        }

        if let Some(number) = fields.get("number") {
            match as_positive(number) {
                Some(n) => {
                    let first = phases.iter().position(|p| p.get("number").and_then(as_positive) == Some(n));
                    if first.is_some_and(|first| first + 1 != index) {
                        report.push(Issue::blocking(
                            Rule::PhaseNumber,
                            &location,
                            format!("Duplicate phase number {n}"),
                        ));
                    }
                }
                None => report.push(Issue::blocking(
                    Rule::PhaseNumber,
                    &location,
                    format!("number must be a positive integer (got {number})"),
                )),
            }
        }

        if let Some(status) = fields.get("status") {
            check_status(status, &location, report);
        }

        if let Some(pct) = fields.get("completion_percentage") {
            let valid = pct.as_i64().is_some_and(|n| (0..=100).contains(&n));
            if !valid {
                report.push(Issue::blocking(
                    Rule::Completion,
                    &location,
                    format!("completion_percentage must be integer 0-100 (got {pct})"),
                ));
            }
        }

        if let Some(effort) = fields.get("estimated_effort") {
            self.check_effort(effort, &location, report);
        }

        if let Some(owner) = fields.get("assigned_subagent") {
            self.check_owner(owner, &location, report);
        }

        if let Some(steps) = fields.get("steps") {
            check_steps(steps, &location, report);
        }

        if let Some(dependencies) = fields.get("dependencies") {
            check_dependencies(dependencies, numbers, &location, report);
        }
    }

    fn check_effort(&self, effort: &Value, location: &str, report: &mut ValidationReport) {
        match effort_hours(effort) {
            Some(hours) if hours <= 0.0 => report.push(Issue::blocking(
                Rule::Effort,
                location,
                format!("estimated_effort must be positive (got {effort})"),
            )),
            Some(hours) if hours > self.limits.max_phase_hours => report.push(
                Issue::warning(
                    Rule::Effort,
                    location,
                    format!(
                        "estimated_effort is {hours} hours (>{}h)",
                        self.limits.max_phase_hours
                    ),
                )
                .with_hint("consider breaking this phase into smaller phases"),
            ),
            Some(_) => {}
            None => report.push(Issue::blocking(
                Rule::Effort,
                location,
                format!("estimated_effort must be a number (got {effort})"),
            )),
        }
    }

    fn check_owner(&self, owner: &Value, location: &str, report: &mut ValidationReport) {
        let Some(owner) = owner.as_str() else {
            report.push(Issue::blocking(
                Rule::FieldType,
                location,
                format!("owner must be a string (got {owner})"),
            ));
            return;
        };
        if self.registry.contains(owner) {
            return;
        }
        let suggestions = self.registry.suggestions(owner);
        let mut hint = format!("valid owners: {}", self.registry.known().join(", "));
        if !suggestions.is_empty() {
            hint.push_str(&format!("; did you mean: {}?", suggestions.join(", ")));
        }
        report.push(
            Issue::blocking(
                Rule::UnknownOwner {
                    owner: owner.to_string(),
                    suggestions,
                },
                location,
                format!("Unknown owner '{owner}'"),
            )
            .with_hint(hint),
        );
    }

    fn check_assignment(
        &self,
        index: usize,
        assignment: &Value,
        numbers: &HashSet<u32>,
        report: &mut ValidationReport,
    ) {
        let location = format!("Subagent Assignment {index}");
        let Some(subagent) = assignment.get("subagent") else {
            report.push(Issue::blocking(
                Rule::Assignments,
                location,
                "Missing 'subagent' field",
            ));
            return;
        };
        self.check_owner(subagent, &location, report);

        let Some(involved) = assignment.get("phases_involved") else {
            return;
        };
        let Some(involved) = involved.as_array() else {
            report.push(Issue::blocking(
                Rule::Assignments,
                location,
                "'phases_involved' must be an array",
            ));
            return;
        };
        for reference in involved {
            let resolved = normalize_value(reference).is_some_and(|n| numbers.contains(&n));
            if !resolved {
                let mut valid: Vec<u32> = numbers.iter().copied().collect();
                valid.sort_unstable();
                report.push(
                    Issue::blocking(
                        Rule::Assignments,
                        &location,
                        format!("References non-existent phase {reference}"),
                    )
                    .with_hint(format!("valid phase numbers: {valid:?}")),
                );
            }
        }
    }

    fn check_quality(&self, root: &Map<String, Value>, phases: &[Value], report: &mut ValidationReport) {
        for (i, phase) in phases.iter().enumerate() {
            let location = phase_location(i + 1, phase);
            let Some(fields) = phase.as_object() else {
                continue;
            };

            let hours = fields.get("estimated_effort").and_then(effort_hours);
            if !fields.contains_key("estimated_effort") {
                report.push(Issue::warning(
                    Rule::Quality,
                    &location,
                    "Missing 'estimated_effort' - helpful for planning",
                ));
            }

            let human = fields.get("assigned_subagent").and_then(Value::as_str) == Some(HUMAN_OWNER);
            if let Some(hours) = hours.filter(|h| human && *h > self.limits.complex_human_hours) {
                report.push(
                    Issue::warning(
                        Rule::Quality,
                        &location,
                        format!("Complex phase ({hours}h) assigned to '{HUMAN_OWNER}'"),
                    )
                    .with_hint("could a specialist owner help with this?"),
                );
            }

            let status = fields
                .get("status")
                .and_then(Value::as_str)
                .and_then(|s| s.parse::<Status>().ok());
            let pct = fields.get("completion_percentage").and_then(Value::as_i64);
            match (status, pct) {
                (Some(Status::Completed), Some(pct)) if pct != 100 => report.push(Issue::warning(
                    Rule::Quality,
                    &location,
                    format!("Status 'completed' but completion_percentage is {pct}"),
                )),
                (Some(Status::NotStarted), Some(pct)) if pct != 0 => report.push(Issue::warning(
                    Rule::Quality,
                    &location,
                    format!("Status 'not_started' but completion_percentage is {pct}"),
                )),
                _ => {}
            }
        }

        if phases.len() > self.limits.max_phases {
            report.push(
                Issue::warning(
                    Rule::Quality,
                    "",
                    format!("Plan has {} phases (>{})", phases.len(), self.limits.max_phases),
                )
                .with_hint("consider combining phases to avoid over-planning"),
            );
        }

        if let Some(blockers) = root.get("potential_blockers").and_then(Value::as_array) {
            for blocker in blockers {
                let high = blocker.get("impact").and_then(Value::as_str) == Some("High");
                let mitigated = blocker
                    .get("mitigation_strategy")
                    .is_some_and(|m| !m.is_null() && m.as_str() != Some(""));
                if high && !mitigated {
                    let issue = blocker.get("issue").and_then(Value::as_str).unwrap_or("Unknown");
                    report.push(
                        Issue::warning(
                            Rule::Quality,
                            "",
                            format!("High-impact blocker lacks mitigation strategy: '{issue}'"),
                        )
                        .with_hint("add a 'mitigation_strategy' field"),
                    );
                }
            }
        }

        if root
            .get("success_criteria")
            .and_then(Value::as_array)
            .is_some_and(Vec::is_empty)
        {
            report.push(
                Issue::warning(Rule::Quality, "", "No success criteria defined")
                    .with_hint("add measurable success criteria to verify completion"),
            );
        }

        if let Some(priority) = root.get("planning").and_then(|p| p.get("priority")) {
            let known = priority.as_str().is_some_and(|p| PRIORITIES.contains(&p));
            if !known {
                report.push(
                    Issue::warning(Rule::Quality, "", format!("Invalid priority {priority}"))
                        .with_hint(format!("valid priorities: {}", PRIORITIES.join(", "))),
                );
            }
        }
    }
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new(Arc::new(StaticRegistry::default()), ValidationLimits::default())
    }
}

impl Validator for StructuralValidator {
    fn validate(&self, _path: &Path, content: &str) -> Result<ValidationReport, Unavailable> {
        match serde_json::from_str::<Value>(content) {
            Ok(document) => Ok(self.check(&document)),
            Err(e) => {
                let mut report = ValidationReport::new();
                report.push(Issue::blocking(
                    Rule::Syntax,
                    "",
                    format!("Invalid JSON in plan file: {e}"),
                ));
                Ok(report)
            }
        }
    }
}

fn check_required(root: &Map<String, Value>, report: &mut ValidationReport) {
    for field in REQUIRED_TOP_LEVEL {
        if !root.contains_key(field) {
            report.push(Issue::blocking(
                Rule::RequiredField,
                "",
                format!("Missing required top-level field: '{field}'"),
            ));
        }
    }

    for (section, subfields) in [("metadata", &METADATA_FIELDS[..]), ("planning", &PLANNING_FIELDS[..])] {
        let Some(value) = root.get(section) else {
            continue;
        };
        let Some(object) = value.as_object() else {
            report.push(Issue::blocking(
                Rule::FieldType,
                "",
                format!("Field '{section}' must be an object"),
            ));
            continue;
        };
        for subfield in subfields {
            if !object.contains_key(*subfield) {
                report.push(Issue::blocking(
                    Rule::RequiredField,
                    "",
                    format!("Missing required field: '{section}.{subfield}'"),
                ));
            }
        }
    }

    for field in ARRAY_FIELDS {
        if root.get(field).is_some_and(|v| !v.is_array()) {
            report.push(Issue::blocking(
                Rule::FieldType,
                "",
                format!("Field '{field}' must be an array"),
            ));
        }
    }

    if root.get("execution_history").is_some_and(|v| !v.is_array()) {
        report.push(Issue::blocking(
            Rule::FieldType,
            "",
            "Field 'execution_history' must be an array",
        ));
    }

    if let Some(phases) = root.get("phases").and_then(Value::as_array) {
        if phases.len() < 2 {
            report.push(
                Issue::blocking(
                    Rule::PhaseCount,
                    "",
                    format!("Plan must have at least 2 phases (found {})", phases.len()),
                )
                .with_hint("break work into logical phases such as setup, implementation and testing"),
            );
        }
    }
}

fn check_status(status: &Value, location: &str, report: &mut ValidationReport) {
    let valid = status.as_str().is_some_and(|s| s.parse::<Status>().is_ok() && s == s.to_lowercase());
    if !valid {
        report.push(
            Issue::blocking(Rule::Status, location, format!("Invalid status {status}"))
                .with_hint(format!("valid statuses: {}", Status::valid_values())),
        );
    }
}

/// Numeric references must resolve; references with no digits are ignored.
fn check_dependencies(
    dependencies: &Value,
    numbers: &HashSet<u32>,
    location: &str,
    report: &mut ValidationReport,
) {
    let Some(deps) = dependencies.as_array() else {
        report.push(Issue::blocking(
            Rule::FieldType,
            location,
            "'dependencies' must be an array",
        ));
        return;
    };
    for n in deps.iter().filter_map(normalize_value) {
        if !numbers.contains(&n) {
            report.push(Issue::blocking(
                Rule::Dependencies,
                location,
                format!("Dependency on non-existent phase {n}"),
            ));
        }
    }
}

fn check_steps(steps: &Value, location: &str, report: &mut ValidationReport) {
    let Some(steps) = steps.as_array() else {
        report.push(Issue::blocking(Rule::FieldType, location, "'steps' must be an array"));
        return;
    };
    if steps.is_empty() {
        report.push(
            Issue::blocking(Rule::Steps, location, "'steps' array is empty")
                .with_hint("add at least one step"),
        );
        return;
    }

    let mut seen = HashSet::new();
    for (i, step) in steps.iter().enumerate() {
        let step_location = format!("{location}, Step entry {}", i + 1);
        let Some(number) = step.get("number") else {
            report.push(Issue::blocking(Rule::Steps, step_location, "Missing required field 'number'"));
            continue;
        };
        match as_positive(number) {
            Some(n) if !seen.insert(n) => report.push(Issue::blocking(
                Rule::Steps,
                &step_location,
                format!("Duplicate step number {n}"),
            )),
            Some(_) => {}
            None => report.push(Issue::blocking(
                Rule::Steps,
                &step_location,
                format!("number must be a positive integer (got {number})"),
            )),
        }
        if let Some(status) = step.get("status") {
            check_status(status, &step_location, report);
        }
    }
}

fn as_positive(value: &Value) -> Option<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
}

fn phase_numbers(phases: &[Value]) -> HashSet<u32> {
    phases
        .iter()
        .filter_map(|p| p.get("number").and_then(as_positive))
        .collect()
}

fn phase_location(index: usize, phase: &Value) -> String {
    match phase.get("number").and_then(as_positive) {
        Some(n) => format!("Phase {n}"),
        None => format!("Phase entry {index}"),
    }
}

fn effort_hours(value: &Value) -> Option<f64> {
    if value.is_null() || value.is_boolean() {
        return None;
    }
    serde_json::from_value::<Effort>(value.clone())
        .ok()
        .and_then(|effort| effort.hours())
}
