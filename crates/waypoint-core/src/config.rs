//! Engine configuration and the injected clock.
//!
//! Configuration is a JSON file whose fields all have defaults:
//!
//! ```json
//! {
//!   "transition_policy": "strict",
//!   "owners": ["backend-specialist"],
//!   "agent_index": ".claude/agents/agent-index.md",
//!   "validator_command": ["python3", ".claude/hooks/validate-plan.py"]
//! }
//! ```
//!
//! Lookup order: an explicit path, then `$XDG_CONFIG_HOME/waypoint/config.json`,
//! then [`EngineConfig::default`].

use std::path::{Path, PathBuf};

use jiff::{Timestamp, Zoned, civil::Date, tz::TimeZone};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{FsResultExt, LifecycleError, Result},
    registry::StaticRegistry,
    transitions::TransitionPolicy,
    validate::ValidationLimits,
};

/// Tunables for the lifecycle engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub transition_policy: TransitionPolicy,

    /// Estimated effort ceiling before a warning, in hours
    pub max_phase_hours: f64,

    /// Phase count above which a plan gets a warning
    pub max_phases: usize,

    /// Effort above which a `human`-owned phase gets a warning
    pub complex_human_hours: f64,

    /// Backup directory name, relative to the plan's directory
    pub backup_dir: String,

    /// Archive directory name, relative to the plan's directory
    pub archive_dir: String,

    /// Whether mutations take the daily backup
    pub backups: bool,

    /// Known owners in addition to the agent index
    pub owners: Vec<String>,

    pub agent_index: Option<PathBuf>,

    /// Post-write validator argv; the in-process validator when absent
    pub validator_command: Option<Vec<String>>,

    /// Where history source references resolve; `<plan dir>/../Context` when absent
    pub context_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transition_policy: TransitionPolicy::default(),
            max_phase_hours: 20.0,
            max_phases: 8,
            complex_human_hours: 10.0,
            backup_dir: ".plan-backups".to_string(),
            archive_dir: "Completed".to_string(),
            backups: true,
            owners: Vec::new(),
            agent_index: None,
            validator_command: None,
            context_dir: None,
        }
    }
}

impl EngineConfig {
    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::FileSystem` if the file cannot be read and
    /// `LifecycleError::Configuration` if it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).fs_context(path)?;
        let config = serde_json::from_str(&text).map_err(|e| LifecycleError::Configuration {
            message: format!("{}: {e}", path.display()),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads `explicit` if given, else the XDG config file if present, else
    /// the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// `$XDG_CONFIG_HOME/waypoint/config.json`, if it exists.
    pub fn default_path() -> Option<PathBuf> {
        xdg::BaseDirectories::with_prefix("waypoint").find_config_file("config.json")
    }

    pub fn limits(&self) -> ValidationLimits {
        ValidationLimits {
            max_phase_hours: self.max_phase_hours,
            max_phases: self.max_phases,
            complex_human_hours: self.complex_human_hours,
        }
    }

    /// Owner registry from the configured owners and agent index.
    pub fn registry(&self) -> StaticRegistry {
        let registry = StaticRegistry::new(self.owners.iter().cloned());
        match &self.agent_index {
            Some(path) => registry.merge(StaticRegistry::load_agent_index(path)),
            None => registry,
        }
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Zoned;

    /// Calendar date used for backup names and history entries.
    fn today(&self) -> Date {
        self.now().date()
    }

    /// RFC 3339 stamp for `last_updated` and `completed_at`.
    fn stamp(&self) -> String {
        self.now().timestamp().to_string()
    }
}

/// Wall clock in the system time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Zoned {
        Zoned::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone)]
pub struct FixedClock(Zoned);

impl FixedClock {
    pub fn new(at: Zoned) -> Self {
        Self(at)
    }

    /// A clock fixed at `at`, read in UTC.
    pub fn utc(at: Timestamp) -> Self {
        Self(at.to_zoned(TimeZone::UTC))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Zoned {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::registry::OwnerRegistry;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.transition_policy, TransitionPolicy::Permissive);
        assert_eq!(config.backup_dir, ".plan-backups");
        assert_eq!(config.archive_dir, "Completed");
        assert_eq!(config.limits(), ValidationLimits::default());
        assert!(config.backups);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"transition_policy": "strict", "max_phases": 5}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.transition_policy, TransitionPolicy::Strict);
        assert_eq!(config.max_phases, 5);
        assert_eq!(config.max_phase_hours, 20.0);
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"transition_policy": "lenient"}"#).unwrap();

        assert!(matches!(
            EngineConfig::load(&path),
            Err(LifecycleError::Configuration { .. })
        ));
    }

    #[test]
    fn test_registry_merges_agent_index() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("agent-index.md");
        std::fs::write(&index, "| Backend | api-specialist | APIs |\n").unwrap();

        let config = EngineConfig {
            owners: vec!["ops".to_string()],
            agent_index: Some(index),
            ..EngineConfig::default()
        };
        let registry = config.registry();
        assert!(registry.contains("ops"));
        assert!(registry.contains("api-specialist"));
        assert!(registry.contains("human"));
    }

    #[test]
    fn test_fixed_clock() {
        let at: Timestamp = "2025-11-23T22:30:00Z".parse().unwrap();
        let clock = FixedClock::utc(at);
        assert_eq!(clock.today().to_string(), "2025-11-23");
        assert_eq!(clock.stamp(), "2025-11-23T22:30:00Z");
    }
}
