//! Display implementations for domain models.
//!
//! Kept apart from the model definitions; every implementation emits
//! markdown for the terminal renderer.

use std::fmt;

use crate::models::{Effort, HistoryEntry, Phase, Status};

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effort::Whole(hours) => write!(f, "{hours}"),
            Effort::Hours(hours) => write!(f, "{hours}"),
            Effort::Text(text) => write!(f, "{}", text.trim_end_matches('h')),
        }
    }
}

fn effort_or(effort: Option<&Effort>, fallback: &str) -> String {
    effort.map_or_else(|| fallback.to_string(), |e| format!("{e}h"))
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Phase {}: {}", self.number, self.name())?;
        writeln!(f)?;
        writeln!(
            f,
            "- Status: {} {} | Completion: {}%",
            self.status().icon(),
            self.status(),
            self.completion()
        )?;
        writeln!(
            f,
            "- Effort: {} (estimated) / {} (actual)",
            effort_or(self.estimated_effort.as_ref(), "?"),
            effort_or(self.actual_effort.as_ref(), "N/A")
        )?;
        writeln!(f, "- Assigned: {}", self.owner())?;
        writeln!(
            f,
            "- Steps: {}/{} completed",
            self.completed_steps(),
            self.steps().len()
        )?;
        if let Some(notes) = &self.completion_notes {
            writeln!(f, "- Notes: {notes}")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {} - {}",
            self.date.as_deref().unwrap_or("?"),
            self.context_file.as_deref().unwrap_or("N/A")
        )?;
        match self.notes.as_deref().filter(|n| !n.is_empty()) {
            Some(notes) => writeln!(f, ": {notes}"),
            None => writeln!(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display() {
        let mut phase = Phase::new(2, "Implement webhooks");
        phase.status = Some(Status::InProgress);
        phase.completion_percentage = Some(50);
        phase.estimated_effort = Some(Effort::Text("6h".to_string()));
        phase.assigned_subagent = Some("backend-specialist".to_string());

        let output = phase.to_string();
        assert!(output.contains("## Phase 2: Implement webhooks"));
        assert!(output.contains("⟳ in_progress | Completion: 50%"));
        assert!(output.contains("6h (estimated) / N/A (actual)"));
        assert!(output.contains("Assigned: backend-specialist"));
    }

    #[test]
    fn test_effort_display() {
        assert_eq!(Effort::Whole(4).to_string(), "4");
        assert_eq!(Effort::Hours(4.5).to_string(), "4.5");
        assert_eq!(Effort::Text("3".to_string()).to_string(), "3");
    }

    #[test]
    fn test_history_entry_display() {
        let entry = HistoryEntry {
            date: Some("2025-11-23".to_string()),
            context_file: Some("context-11-23-25.json".to_string()),
            notes: Some("Phase 1 done".to_string()),
            ..HistoryEntry::default()
        };
        assert_eq!(entry.to_string(), "- 2025-11-23 - context-11-23-25.json: Phase 1 done\n");
    }
}
