//! Dependency graph analysis over phase numbers.
//!
//! Dependencies are declared per phase as integers or loose text such as
//! `"Phase 2"`. [`parse_reference`] and [`normalize_value`] are the only
//! places that interpret those references; everything else works on the
//! normalized phase numbers.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::Phase;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Phase number embedded in a textual reference: the first run of digits.
///
/// ```rust
/// use waypoint_core::graph::parse_reference;
///
/// assert_eq!(parse_reference("Phase 3"), Some(3));
/// assert_eq!(parse_reference("12"), Some(12));
/// assert_eq!(parse_reference("database setup"), None);
/// ```
pub fn parse_reference(text: &str) -> Option<u32> {
    DIGITS
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
}

/// Phase number for a raw JSON dependency value, `None` when it names none.
pub fn normalize_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n > 0),
        Value::String(text) => parse_reference(text),
        _ => None,
    }
}

/// A dependency cycle, from its entry point back to itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle(pub Vec<u32>);

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::error::render_cycle(&self.0))
    }
}

/// Directed graph `phase → [dependencies]`, kept in declaration order.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    order: Vec<u32>,
    edges: HashMap<u32, Vec<u32>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a phase. A repeated number replaces the earlier edges but
    /// keeps its original position.
    pub fn add_phase(&mut self, number: u32, dependencies: impl IntoIterator<Item = u32>) {
        if !self.edges.contains_key(&number) {
            self.order.push(number);
        }
        self.edges.insert(number, dependencies.into_iter().collect());
    }

    /// Graph over typed phases.
    pub fn from_phases(phases: &[Phase]) -> Self {
        let mut graph = Self::new();
        for phase in phases {
            graph.add_phase(phase.number, phase.dependency_numbers());
        }
        graph
    }

    /// Graph over raw phase objects. Entries without an integer `number` are
    /// skipped, as are dependency values that do not normalize.
    pub fn from_values(phases: &[Value]) -> Self {
        let mut graph = Self::new();
        for phase in phases {
            let Some(number) = phase
                .get("number")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
            else {
                continue;
            };
            let dependencies = phase
                .get("dependencies")
                .and_then(Value::as_array)
                .map(|deps| deps.iter().filter_map(normalize_value).collect::<Vec<_>>())
                .unwrap_or_default();
            graph.add_phase(number, dependencies);
        }
        graph
    }

    pub fn dependencies_of(&self, number: u32) -> &[u32] {
        self.edges.get(&number).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, number: u32) -> bool {
        self.edges.contains_key(&number)
    }

    /// First cycle found by a depth-first walk in declaration order.
    pub fn find_cycle(&self) -> Option<Cycle> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        let mut path = Vec::new();

        for &node in &self.order {
            if visited.contains(&node) {
                continue;
            }
            if let Some(cycle) = self.visit(node, &mut visited, &mut on_stack, &mut path) {
                return Some(Cycle(cycle));
            }
        }
        None
    }

    fn visit(
        &self,
        node: u32,
        visited: &mut HashSet<u32>,
        on_stack: &mut HashSet<u32>,
        path: &mut Vec<u32>,
    ) -> Option<Vec<u32>> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        for &next in self.dependencies_of(node) {
            if on_stack.contains(&next) {
                let start = path.iter().position(|n| *n == next).unwrap_or(0);
                let mut cycle = path[start..].to_vec();
                cycle.push(next);
                return Some(cycle);
            }
            if !visited.contains(&next) {
                if let Some(cycle) = self.visit(next, visited, on_stack, path) {
                    return Some(cycle);
                }
            }
        }

        on_stack.remove(&node);
        path.pop();
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn graph(edges: &[(u32, &[u32])]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (node, deps) in edges {
            graph.add_phase(*node, deps.iter().copied());
        }
        graph
    }

    #[test]
    fn test_parse_reference_variants() {
        assert_eq!(parse_reference("Phase 2"), Some(2));
        assert_eq!(parse_reference("phase 10 (api)"), Some(10));
        assert_eq!(parse_reference("after step 4 of phase 7"), Some(4));
        assert_eq!(parse_reference("Phase 0"), None);
        assert_eq!(parse_reference("setup"), None);
        assert_eq!(parse_reference(""), None);
    }

    #[test]
    fn test_normalize_value_ignores_non_references() {
        assert_eq!(normalize_value(&json!(3)), Some(3));
        assert_eq!(normalize_value(&json!("Phase 3")), Some(3));
        assert_eq!(normalize_value(&json!(-1)), None);
        assert_eq!(normalize_value(&json!(2.5)), None);
        assert_eq!(normalize_value(&json!(null)), None);
        assert_eq!(normalize_value(&json!({"phase": 1})), None);
    }

    #[test]
    fn test_acyclic_graph_has_no_cycle() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[1, 2])]);
        assert_eq!(g.find_cycle(), None);
    }

    #[test]
    fn test_three_phase_cycle_reported_from_entry() {
        let g = graph(&[(1, &[2]), (2, &[3]), (3, &[1])]);
        assert_eq!(g.find_cycle(), Some(Cycle(vec![1, 2, 3, 1])));
    }

    #[test]
    fn test_cycle_not_including_first_phase() {
        let g = graph(&[(1, &[]), (2, &[3]), (3, &[2])]);
        assert_eq!(g.find_cycle(), Some(Cycle(vec![2, 3, 2])));
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let g = graph(&[(1, &[]), (2, &[2])]);
        assert_eq!(g.find_cycle(), Some(Cycle(vec![2, 2])));
    }

    #[test]
    fn test_only_first_cycle_reported() {
        let g = graph(&[(1, &[2]), (2, &[1]), (3, &[4]), (4, &[3])]);
        assert_eq!(g.find_cycle(), Some(Cycle(vec![1, 2, 1])));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let g = graph(&[(1, &[]), (2, &[1]), (3, &[1]), (4, &[2, 3])]);
        assert_eq!(g.find_cycle(), None);
    }

    #[test]
    fn test_dangling_reference_is_not_a_cycle() {
        let g = graph(&[(1, &[9]), (2, &[1])]);
        assert_eq!(g.find_cycle(), None);
        assert!(!g.contains(9));
    }

    #[test]
    fn test_from_values_tolerates_loose_references() {
        let phases = vec![
            json!({"number": 1, "dependencies": ["Phase 3"]}),
            json!({"number": 2, "dependencies": [1, "design review"]}),
            json!({"number": 3, "dependencies": [2]}),
            json!({"name": "no number"}),
        ];
        let g = DependencyGraph::from_values(&phases);
        assert_eq!(g.dependencies_of(2), &[1]);
        assert_eq!(g.find_cycle(), Some(Cycle(vec![1, 3, 2, 1])));
    }

    #[test]
    fn test_cycle_display() {
        let cycle = Cycle(vec![1, 2, 1]);
        assert_eq!(cycle.to_string(), "Phase 1 → Phase 2 → Phase 1");
    }
}
