//! Status enumeration shared by phases and steps.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type-safe enumeration of phase and step statuses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Work has not begun
    #[default]
    NotStarted,

    /// Work is underway
    InProgress,

    /// Work is finished
    Completed,

    /// Work cannot proceed until a blocker is resolved
    Blocked,
}

impl Status {
    /// Every status, in the order used for listings and error messages.
    pub const ALL: [Status; 4] = [
        Status::NotStarted,
        Status::InProgress,
        Status::Completed,
        Status::Blocked,
    ];

    /// Document string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotStarted => "not_started",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
            Status::Blocked => "blocked",
        }
    }

    /// Status glyph used by the markdown views.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use waypoint_core::models::Status;
    ///
    /// assert_eq!(Status::Completed.icon(), "✓");
    /// assert_eq!(Status::InProgress.icon(), "⟳");
    /// ```
    pub fn icon(&self) -> &'static str {
        match self {
            Status::NotStarted => "○",
            Status::InProgress => "⟳",
            Status::Completed => "✓",
            Status::Blocked => "⚠",
        }
    }

    /// Comma separated list of valid status strings.
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(Status::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "not_started" => Ok(Status::NotStarted),
            "in_progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            "blocked" => Ok(Status::Blocked),
            _ => Err(format!(
                "Invalid status '{s}' (valid: {})",
                Status::valid_values()
            )),
        }
    }
}
