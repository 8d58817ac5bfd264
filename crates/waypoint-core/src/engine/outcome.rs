//! Result of an accepted mutation.

use std::path::PathBuf;

use crate::models::PhaseIndex;

/// What a successful mutation did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    /// Human-readable descriptions of the applied changes
    pub messages: Vec<String>,

    /// Non-blocking validation findings
    pub warnings: Vec<String>,

    /// Archive location when the mutation completed the plan
    pub archived_to: Option<PathBuf>,

    /// Scheduling index as saved
    pub index: PhaseIndex,
}

impl Outcome {
    pub fn note(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub(crate) fn warn_once(&mut self, warning: String) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// 0 applied cleanly, 1 applied with warnings.
    pub fn exit_code(&self) -> u8 {
        if self.warnings.is_empty() { 0 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_reflects_warnings() {
        let mut outcome = Outcome::default();
        assert_eq!(outcome.exit_code(), 0);
        outcome.warn_once("No success criteria defined".to_string());
        outcome.warn_once("No success criteria defined".to_string());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.exit_code(), 1);
    }
}
