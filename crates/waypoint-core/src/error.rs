//! Error types for the lifecycle engine.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Status;

/// Comprehensive error type for all lifecycle operations.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// A plan, phase or step reference does not resolve
    #[error("{what} not found")]
    NotFound { what: String },

    /// The document violates the plan schema
    #[error("Malformed plan document:\n{}", bullet_list(.errors))]
    MalformedDocument { errors: Vec<String> },

    /// The requested status change is not in the transition table
    #[error(
        "Invalid transition for {subject} from '{from}' to '{to}' (allowed: {})",
        allowed_list(.allowed)
    )]
    IllegalTransition {
        subject: String,
        from: Status,
        to: Status,
        allowed: Vec<Status>,
    },

    /// The phase dependency graph contains a cycle
    #[error("Circular dependency detected: {}", render_cycle(.cycle))]
    CyclicDependency { cycle: Vec<u32> },

    /// An owner is absent from the owner registry
    #[error("{location}: unknown owner '{owner}'{}", suggestion_suffix(.suggestions))]
    UnknownOwner {
        location: String,
        owner: String,
        suggestions: Vec<String>,
    },

    /// Restore was requested but no dated backup exists
    #[error("No backup available for '{path}'")]
    BackupUnavailable { path: PathBuf },

    /// The plan has been completed and moved to the archive store
    #[error("Plan '{path}' is archived and can no longer be modified")]
    PlanArchived { path: PathBuf },

    /// An archived plan with the same file name already exists
    #[error("Cannot archive: '{path}' already exists")]
    ArchiveOccupied { path: PathBuf },

    /// The validation subsystem could not be reached
    #[error("Validation unavailable: {reason}")]
    InfrastructureUnavailable { reason: String },

    /// Invalid input validation errors
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// Another phase already holds the in-progress slot
    #[error("Phase {phase} is already in_progress. Complete it first or use --force.")]
    PhaseInProgress { phase: u32 },

    /// No not-started phase has its dependencies satisfied
    #[error("No eligible phases to start (all completed or blocked by dependencies){}", blocked_suffix(.blocked))]
    NoEligiblePhase { blocked: Vec<String> },

    /// `complete_current` found nothing to complete
    #[error("No phase currently in_progress")]
    NoPhaseInProgress,

    /// Post-write validation failed and the previous document was restored
    #[error("Validation failed with blocking errors; previous document restored:\n{}", bullet_list(.errors))]
    RolledBack { errors: Vec<String> },

    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("  - {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn allowed_list(allowed: &[Status]) -> String {
    if allowed.is_empty() {
        "none, use --force to override".to_string()
    } else {
        allowed
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {}?)", suggestions.join(", "))
    }
}

fn blocked_suffix(blocked: &[String]) -> String {
    if blocked.is_empty() {
        String::new()
    } else {
        format!("\n{}", bullet_list(blocked))
    }
}

/// Renders a cycle as `Phase 1 → Phase 2 → Phase 1`.
pub fn render_cycle(cycle: &[u32]) -> String {
    cycle
        .iter()
        .map(|n| format!("Phase {n}"))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> LifecycleError {
        LifecycleError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl LifecycleError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Shorthand for a reference that does not resolve.
    pub fn not_found(what: impl Into<String>) -> Self {
        LifecycleError::NotFound { what: what.into() }
    }

    /// Exit status for the command surface. Every error is a rejection.
    pub fn exit_code(&self) -> u8 {
        2
    }
}

/// Extension trait attaching a path to `std::io::Error` results.
pub trait FsResultExt<T> {
    /// Map I/O errors into [`LifecycleError::FileSystem`] for `path`.
    fn fs_context(self, path: &Path) -> Result<T>;
}

impl<T> FsResultExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, path: &Path) -> Result<T> {
        self.map_err(|source| LifecycleError::FileSystem {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Result type alias for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;
