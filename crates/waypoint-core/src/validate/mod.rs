//! Plan document validation.
//!
//! Validation produces a [`ValidationReport`] rather than failing: callers
//! decide what a blocking report means. The engine runs the in-process
//! [`StructuralValidator`] before every write and the configured
//! [`Validator`] after it.
//!
//! ```text
//! candidate document ──▶ StructuralValidator ──▶ blocking? abort, nothing written
//!                                               │
//!                                               ▼
//!                        save ──▶ Validator ──▶ blocking? restore snapshot
//! ```

pub mod command;
pub mod structural;

use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

pub use command::CommandValidator;
pub use structural::{StructuralValidator, ValidationLimits};

use crate::error::LifecycleError;

/// Whether an issue stops a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocking,
    Warning,
}

/// The check that produced an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Content is not JSON or not an object
    Syntax,
    RequiredField,
    FieldType,
    PhaseCount,
    PhaseNumber,
    Status,
    Completion,
    Effort,
    /// Owner absent from the registry
    UnknownOwner {
        owner: String,
        suggestions: Vec<String>,
    },
    Steps,
    Dependencies,
    /// Dependency cycle, entry point first
    Cycle(Vec<u32>),
    Assignments,
    Quality,
    /// Reported by an external validator
    External,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    pub rule: Rule,

    /// Where the issue was found, e.g. `Phase 2`; empty for document-wide issues
    pub location: String,
    pub message: String,
    pub hint: Option<String>,
}

impl Issue {
    pub fn blocking(rule: Rule, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Blocking,
            rule,
            location: location.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn warning(rule: Rule, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::blocking(rule, location, message)
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{}", self.message)?;
        } else {
            write!(f, "{}: {}", self.location, self.message)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// Ordered findings of one validation run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn blocking(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_blocking())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| !i.is_blocking())
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking().next().is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Rendered warning messages.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings().map(ToString::to_string).collect()
    }

    /// Rendered blocking messages.
    pub fn blocking_messages(&self) -> Vec<String> {
        self.blocking().map(ToString::to_string).collect()
    }

    /// 0 clean, 1 warnings only, 2 blocking.
    pub fn exit_code(&self) -> u8 {
        if self.is_blocking() {
            2
        } else if self.is_clean() {
            0
        } else {
            1
        }
    }

    /// The error a blocking report stands for, `None` when nothing blocks.
    ///
    /// A cycle takes precedence over an unknown owner, which takes
    /// precedence over every other blocking issue.
    pub fn to_error(&self) -> Option<LifecycleError> {
        if !self.is_blocking() {
            return None;
        }

        let cycle = self.blocking().find_map(|issue| match &issue.rule {
            Rule::Cycle(cycle) => Some(cycle.clone()),
            _ => None,
        });
        if let Some(cycle) = cycle {
            return Some(LifecycleError::CyclicDependency { cycle });
        }

        let owner = self.blocking().find_map(|issue| match &issue.rule {
            Rule::UnknownOwner { owner, suggestions } => Some(LifecycleError::UnknownOwner {
                location: issue.location.clone(),
                owner: owner.clone(),
                suggestions: suggestions.clone(),
            }),
            _ => None,
        });
        if owner.is_some() {
            return owner;
        }

        Some(LifecycleError::MalformedDocument {
            errors: self.blocking_messages(),
        })
    }
}

/// The validation subsystem could not produce a verdict.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct Unavailable {
    pub reason: String,
}

impl Unavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<Unavailable> for LifecycleError {
    fn from(err: Unavailable) -> Self {
        LifecycleError::InfrastructureUnavailable { reason: err.reason }
    }
}

/// Capability that validates written plan content.
///
/// `path` is the file the content was written to; `content` is the exact
/// text on disk.
pub trait Validator: Send + Sync {
    fn validate(&self, path: &Path, content: &str) -> Result<ValidationReport, Unavailable>;
}
