//! Plan document model.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Effort, Phase, PhaseIndex, Status};

/// Identity and bookkeeping fields of a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Metadata {
    /// Stamped on every save (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    /// Stamped when the plan is archived (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Sum of every phase's actual effort, stamped on archive. Plans with no
    /// recorded effort are stamped with 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_actual_effort: Option<Effort>,

    /// `created`, `created_by`, `plan_id`, `version` and anything else
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Metadata {
    /// Whether the plan carries completion stamps from a previous archive.
    pub fn is_archived(&self) -> bool {
        self.completed_at.is_some() && self.status.as_deref() == Some("completed")
    }
}

/// Goal, priority and timeline record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Planning {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Planning {
    fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn goal(&self) -> String {
        self.text("goal").unwrap_or_else(|| "N/A".to_string())
    }

    pub fn priority(&self) -> String {
        self.text("priority").unwrap_or_else(|| "N/A".to_string())
    }

    pub fn timeline(&self) -> String {
        self.text("estimated_timeline")
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// One entry of the append-only execution history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HistoryEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases_completed: Vec<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases_in_progress: Vec<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A persisted multi-phase plan.
///
/// Collections the engine never touches (`files_impacted`,
/// `subagent_assignments`, `success_criteria`, ...) live in `extra` and are
/// written back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Plan {
    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<Planning>,

    #[serde(default)]
    pub phases: Vec<Phase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_history: Option<Vec<HistoryEntry>>,

    /// Derived on every save. A stale or hand-edited index decodes as `None`
    /// and is rebuilt.
    #[serde(
        default,
        deserialize_with = "derived_index",
        skip_serializing_if = "Option::is_none"
    )]
    pub phase_index: Option<PhaseIndex>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn derived_index<'de, D>(deserializer: D) -> Result<Option<PhaseIndex>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl Plan {
    pub fn phase(&self, number: u32) -> Option<&Phase> {
        self.phases.iter().find(|p| p.number == number)
    }

    pub fn planning(&self) -> Planning {
        self.planning.clone().unwrap_or_default()
    }

    /// Phases with the given status, in declaration order.
    pub fn phases_with(&self, status: Status) -> impl Iterator<Item = &Phase> {
        self.phases.iter().filter(move |p| p.status() == status)
    }

    /// First in-progress phase in declaration order.
    pub fn current_phase(&self) -> Option<&Phase> {
        self.phases_with(Status::InProgress).next()
    }

    /// True when the plan has phases and every one is completed.
    pub fn all_completed(&self) -> bool {
        !self.phases.is_empty() && self.phases.iter().all(|p| p.status() == Status::Completed)
    }

    /// Sum of parseable actual efforts across phases.
    pub fn total_actual_effort(&self) -> f64 {
        self.phases
            .iter()
            .filter_map(|p| p.actual_effort.as_ref().and_then(|e| e.hours()))
            .sum()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.execution_history.as_deref().unwrap_or_default()
    }
}
