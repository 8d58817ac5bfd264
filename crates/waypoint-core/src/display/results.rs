//! Result wrapper types for displaying mutation outcomes and validation reports.

use std::fmt;

use super::status::OperationStatus;
use crate::{engine::Outcome, validate::ValidationReport};

/// Formats an accepted mutation: one success line per applied change, then
/// any warnings.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::{Outcome, display::OutcomeView};
///
/// let mut outcome = Outcome::default();
/// outcome.note("Started Phase 2: Build");
///
/// assert_eq!(OutcomeView(&outcome).to_string(), "✓ Started Phase 2: Build\n");
/// ```
pub struct OutcomeView<'a>(pub &'a Outcome);

impl<'a> fmt::Display for OutcomeView<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.0.messages {
            write!(f, "{}", OperationStatus::success(message.as_str()))?;
        }
        if !self.0.warnings.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings:")?;
            for warning in &self.0.warnings {
                write!(f, "{}", OperationStatus::warning(warning.as_str()))?;
            }
        }
        Ok(())
    }
}

/// Formats a validation report for one plan file.
pub struct ReportView<'a> {
    pub name: &'a str,
    pub report: &'a ValidationReport,
}

impl<'a> ReportView<'a> {
    pub fn new(name: &'a str, report: &'a ValidationReport) -> Self {
        Self { name, report }
    }
}

impl<'a> fmt::Display for ReportView<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.report.is_clean() {
            return write!(f, "{}", OperationStatus::success(format!("{} is valid", self.name)));
        }

        let blocking: Vec<_> = self.report.blocking().collect();
        if !blocking.is_empty() {
            writeln!(f, "## Errors")?;
            writeln!(f)?;
            for issue in &blocking {
                write!(f, "{}", OperationStatus::failure(issue.to_string()))?;
            }
            writeln!(f)?;
        }

        let warnings: Vec<_> = self.report.warnings().collect();
        if !warnings.is_empty() {
            writeln!(f, "## Warnings")?;
            writeln!(f)?;
            for issue in &warnings {
                write!(f, "{}", OperationStatus::warning(issue.to_string()))?;
            }
            writeln!(f)?;
        }

        writeln!(
            f,
            "{}: {} error(s), {} warning(s)",
            self.name,
            blocking.len(),
            warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{Issue, Rule};

    #[test]
    fn test_outcome_view_lists_warnings() {
        let outcome = Outcome {
            messages: vec!["Completed Phase 1: Setup".to_string()],
            warnings: vec!["No success criteria defined".to_string()],
            ..Outcome::default()
        };
        let output = OutcomeView(&outcome).to_string();
        assert!(output.starts_with("✓ Completed Phase 1: Setup\n"));
        assert!(output.contains("Warnings:\n⚠ No success criteria defined\n"));
    }

    #[test]
    fn test_report_view_clean() {
        let report = ValidationReport::new();
        assert_eq!(
            ReportView::new("plan-demo.json", &report).to_string(),
            "✓ plan-demo.json is valid\n"
        );
    }

    #[test]
    fn test_report_view_counts() {
        let mut report = ValidationReport::new();
        report.push(Issue::blocking(Rule::Status, "Phase 2", "Invalid status 'done'"));
        report.push(Issue::warning(Rule::Quality, "plan", "No success criteria defined"));
        let output = ReportView::new("plan-demo.json", &report).to_string();
        assert!(output.contains("## Errors"));
        assert!(output.contains("✗ Phase 2: Invalid status 'done'"));
        assert!(output.contains("plan-demo.json: 1 error(s), 1 warning(s)"));
    }
}
