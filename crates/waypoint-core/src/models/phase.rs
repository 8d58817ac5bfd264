//! Phase and step models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Status;
use crate::graph;

/// Effort in hours, stored either as a JSON number or a numeric string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Effort {
    Whole(i64),
    Hours(f64),
    Text(String),
}

impl Effort {
    /// Parsed hour count, `None` when the stored text is not numeric.
    pub fn hours(&self) -> Option<f64> {
        match self {
            Effort::Whole(h) => Some(*h as f64),
            Effort::Hours(h) => Some(*h),
            Effort::Text(t) => t.trim().trim_end_matches('h').trim().parse().ok(),
        }
    }
}

impl From<f64> for Effort {
    fn from(hours: f64) -> Self {
        Effort::Hours(hours)
    }
}

/// A dependency reference as written in the document: `2` or `"Phase 2"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DependencyRef {
    Number(i64),
    Text(String),
    Other(Value),
}

impl DependencyRef {
    /// Phase number this reference points at, if it names one.
    pub fn phase_number(&self) -> Option<u32> {
        match self {
            DependencyRef::Number(n) => u32::try_from(*n).ok().filter(|n| *n > 0),
            DependencyRef::Text(text) => graph::parse_reference(text),
            DependencyRef::Other(_) => None,
        }
    }
}

/// Something currently preventing a phase from progressing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Blocker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mitigation: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An atomic task within a phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Step number, unique within the owning phase
    pub number: u32,

    /// Current status; absent means not started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Every other key, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn status(&self) -> Status {
        self.status.unwrap_or_default()
    }
}

/// A numbered unit of work within a plan.
///
/// Required document fields are modelled as `Option` so that a document
/// missing one round-trips without the field appearing, leaving the
/// structural validator to report it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Phase {
    pub number: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_percentage: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<Effort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_effort: Option<Effort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_subagent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<Vec<DependencyRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockers: Option<Vec<Blocker>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverables: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_notes: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Phase {
    /// Creates a not-started phase with the given number and name.
    pub fn new(number: u32, name: impl Into<String>) -> Self {
        Self {
            number,
            name: Some(name.into()),
            description: None,
            status: Some(Status::NotStarted),
            completion_percentage: Some(0),
            estimated_effort: None,
            actual_effort: None,
            assigned_subagent: None,
            steps: None,
            dependencies: None,
            blockers: None,
            deliverables: None,
            completion_notes: None,
            extra: Map::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status.unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }

    pub fn owner(&self) -> &str {
        self.assigned_subagent.as_deref().unwrap_or("unassigned")
    }

    pub fn completion(&self) -> i64 {
        self.completion_percentage.unwrap_or(0)
    }

    pub fn steps(&self) -> &[Step] {
        self.steps.as_deref().unwrap_or_default()
    }

    pub fn blockers(&self) -> &[Blocker] {
        self.blockers.as_deref().unwrap_or_default()
    }

    /// Normalized dependency phase numbers; unparseable references are dropped.
    pub fn dependency_numbers(&self) -> Vec<u32> {
        self.dependencies
            .iter()
            .flatten()
            .filter_map(DependencyRef::phase_number)
            .collect()
    }

    /// Number of steps marked completed.
    pub fn completed_steps(&self) -> usize {
        self.steps()
            .iter()
            .filter(|s| s.status() == Status::Completed)
            .count()
    }

    /// Completion derived from step progress, truncating. `None` without steps.
    pub fn step_completion(&self) -> Option<i64> {
        let total = self.steps().len();
        if total == 0 {
            return None;
        }
        Some((self.completed_steps() * 100 / total) as i64)
    }

    pub fn step(&self, number: u32) -> Option<&Step> {
        self.steps().iter().find(|s| s.number == number)
    }
}
