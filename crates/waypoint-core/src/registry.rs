//! Known-owner registry consulted by the structural validator.
//!
//! The engine never edits the registry. Owners come from configuration and
//! from an agent index: a markdown file whose quick-reference table lists one
//! owner per row in its second column.
//!
//! ```text
//! | Category | Agent               | Use When      |
//! |----------|---------------------|---------------|
//! | Backend  | supabase-specialist | Schema work   |
//! ```

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use log::warn;
use regex::Regex;

/// Owner id that is always known: work assigned to a person.
pub const HUMAN_OWNER: &str = "human";

static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|\s+\w+\s+\|\s+([\w-]+)\s+\|").expect("valid regex"));

/// Capability to answer "is this owner known?".
pub trait OwnerRegistry: Send + Sync {
    fn contains(&self, owner: &str) -> bool;

    /// Every known owner, sorted.
    fn known(&self) -> Vec<String>;

    /// Known owners that contain `owner` or are contained in it.
    fn suggestions(&self, owner: &str) -> Vec<String> {
        if owner.is_empty() {
            return Vec::new();
        }
        self.known()
            .into_iter()
            .filter(|known| known.contains(owner) || owner.contains(known.as_str()))
            .collect()
    }
}

/// Registry backed by an in-memory set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticRegistry {
    owners: BTreeSet<String>,
}

impl StaticRegistry {
    /// A registry containing `owners` plus [`HUMAN_OWNER`].
    pub fn new<I, S>(owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut owners: BTreeSet<String> = owners.into_iter().map(Into::into).collect();
        owners.insert(HUMAN_OWNER.to_string());
        Self { owners }
    }

    /// Owners named in an agent-index markdown table.
    pub fn from_agent_index(markdown: &str) -> Self {
        let owners = TABLE_ROW
            .captures_iter(markdown)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|name| name != "Agent" && name != "Category");
        Self::new(owners)
    }

    /// Loads an agent index from disk. A missing or unreadable file leaves
    /// only [`HUMAN_OWNER`] known.
    pub fn load_agent_index(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(markdown) => Self::from_agent_index(&markdown),
            Err(e) => {
                warn!("Agent index not readable at {}: {e}", path.display());
                Self::new(Vec::<String>::new())
            }
        }
    }

    /// Union of two registries.
    pub fn merge(mut self, other: StaticRegistry) -> Self {
        self.owners.extend(other.owners);
        self
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl OwnerRegistry for StaticRegistry {
    fn contains(&self, owner: &str) -> bool {
        self.owners.contains(owner)
    }

    fn known(&self) -> Vec<String> {
        self.owners.iter().cloned().collect()
    }
}
