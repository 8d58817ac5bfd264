//! Input validation shared by the engine and the command surface.
//!
//! These checks run before any document is loaded, so a bad argument is
//! rejected without touching the plan.

use std::str::FromStr;

use crate::{
    LifecycleError, Result,
    models::{Phase, Status},
};

/// Parses a status string.
///
/// # Errors
///
/// * `LifecycleError::InvalidInput` - When the string names no status
///
/// # Examples
///
/// ```rust
/// # use waypoint_core::{models::Status, operations::parse_status};
/// assert_eq!(parse_status("in_progress")?, Status::InProgress);
/// assert!(parse_status("done").is_err());
/// # Result::<(), waypoint_core::LifecycleError>::Ok(())
/// ```
pub fn parse_status(value: &str) -> Result<Status> {
    Status::from_str(value).map_err(|reason| LifecycleError::invalid_input("status").with_reason(reason))
}

/// Checks a completion percentage is within 0-100.
pub fn validate_completion(completion: i64) -> Result<i64> {
    if (0..=100).contains(&completion) {
        Ok(completion)
    } else {
        Err(LifecycleError::invalid_input("completion")
            .with_reason(format!("Completion {completion} invalid (must be 0-100)")))
    }
}

/// Checks an effort value is a positive number of hours.
pub fn validate_effort(hours: f64) -> Result<f64> {
    if hours.is_finite() && hours > 0.0 {
        Ok(hours)
    } else {
        Err(LifecycleError::invalid_input("actual_effort")
            .with_reason(format!("Actual effort must be positive number (got '{hours}')")))
    }
}

/// Checks `completion` agrees with the phase's status: a completed phase sits
/// at 100 and a not-started phase at 0.
pub fn check_completion_agrees(phase: &Phase, completion: i64) -> Result<()> {
    let expected = match phase.status() {
        Status::Completed => Some(100),
        Status::NotStarted => Some(0),
        _ => None,
    };
    match expected {
        Some(expected) if expected != completion => Err(LifecycleError::invalid_input("completion")
            .with_reason(format!(
                "Phase {} is {}; completion must be {expected} (got {completion})",
                phase.number,
                phase.status()
            ))),
        _ => Ok(()),
    }
}

/// Rejects blank owner ids.
pub fn validate_owner(owner: &str) -> Result<&str> {
    let owner = owner.trim();
    if owner.is_empty() {
        Err(LifecycleError::invalid_input("owner").with_reason("Owner cannot be empty"))
    } else {
        Ok(owner)
    }
}
