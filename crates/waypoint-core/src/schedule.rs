//! Scheduling index derived from phase statuses and dependencies.

use crate::models::{Phase, PhaseIndex, Status};

/// Dependencies of `phase` that are not yet completed, in declaration order.
///
/// References to phases that do not exist are skipped, like unparseable
/// text references.
pub fn unmet_dependencies<'a>(phases: &'a [Phase], phase: &Phase) -> Vec<&'a Phase> {
    phase
        .dependency_numbers()
        .into_iter()
        .filter_map(|n| phases.iter().find(|p| p.number == n))
        .filter(|dep| dep.status() != Status::Completed)
        .collect()
}

/// Whether every resolvable dependency of `phase` is completed.
pub fn dependencies_satisfied(phases: &[Phase], phase: &Phase) -> bool {
    unmet_dependencies(phases, phase).is_empty()
}

/// Recomputes the scheduling index.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::{models::{DependencyRef, Phase, Status}, schedule::build_index};
///
/// let mut setup = Phase::new(1, "Setup");
/// setup.status = Some(Status::Completed);
/// let mut build = Phase::new(2, "Build");
/// build.dependencies = Some(vec![DependencyRef::Number(1)]);
///
/// let index = build_index(&[setup, build]);
/// assert_eq!(index.completed, vec![1]);
/// assert_eq!(index.next_available, Some(2));
/// ```
pub fn build_index(phases: &[Phase]) -> PhaseIndex {
    let mut index = PhaseIndex {
        total: phases.len(),
        ..PhaseIndex::default()
    };

    for phase in phases {
        let bucket = match phase.status() {
            Status::Completed => &mut index.completed,
            Status::InProgress => &mut index.in_progress,
            Status::Blocked => &mut index.blocked,
            Status::NotStarted => &mut index.not_started,
        };
        bucket.push(phase.number);
    }

    index.current_in_progress = index.in_progress.first().copied();
    index.next_available = phases
        .iter()
        .filter(|p| p.status() == Status::NotStarted)
        .find(|p| dependencies_satisfied(phases, p))
        .map(|p| p.number);

    index
}

/// One line per not-started phase describing what holds it back, e.g.
/// `Phase 3: waiting on Phase 2 (in_progress)`.
pub fn blocked_candidates(phases: &[Phase]) -> Vec<String> {
    phases
        .iter()
        .filter(|p| p.status() == Status::NotStarted)
        .filter_map(|p| {
            let unmet = unmet_dependencies(phases, p);
            if unmet.is_empty() {
                return None;
            }
            let waiting = unmet
                .iter()
                .map(|dep| format!("Phase {} ({})", dep.number, dep.status()))
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("Phase {}: waiting on {waiting}", p.number))
        })
        .collect()
}
