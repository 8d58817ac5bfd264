//! Builder for creating and configuring LifecycleEngine instances.

use std::sync::Arc;

use log::{debug, warn};

use super::LifecycleEngine;
use crate::{
    config::{Clock, EngineConfig, SystemClock},
    error::{LifecycleError, Result},
    registry::OwnerRegistry,
    store::PersistenceManager,
    validate::{CommandValidator, StructuralValidator, Validator},
};

/// Builder for creating and configuring LifecycleEngine instances.
#[derive(Default)]
pub struct EngineBuilder {
    config: Option<EngineConfig>,
    registry: Option<Arc<dyn OwnerRegistry>>,
    validator: Option<Arc<dyn Validator>>,
    clock: Option<Arc<dyn Clock>>,
    backups: Option<bool>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `config` instead of [`EngineConfig::default`].
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the registry built from the configured owners and agent index.
    pub fn with_registry(mut self, registry: Arc<dyn OwnerRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replaces the post-write validator.
    ///
    /// If not specified, `validator_command` from the configuration is used
    /// when set, otherwise the in-process structural validator.
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Overrides the configuration's `backups` flag.
    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backups = Some(enabled);
        self
    }

    /// Builds the configured engine.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Configuration` if `validator_command` is an
    /// empty list.
    pub fn build(self) -> Result<LifecycleEngine> {
        let mut config = self.config.unwrap_or_default();
        if let Some(backups) = self.backups {
            config.backups = backups;
        }

        let registry = match self.registry {
            Some(registry) => registry,
            None => {
                if config.agent_index.is_none() {
                    warn!("No agent index configured; only 'human' and configured owners are known");
                }
                Arc::new(config.registry())
            }
        };

        let gate = StructuralValidator::new(registry, config.limits());
        let validator: Arc<dyn Validator> = match (self.validator, &config.validator_command) {
            (Some(validator), _) => validator,
            (None, Some(argv)) => {
                let command = CommandValidator::from_argv(argv).ok_or_else(|| {
                    LifecycleError::Configuration {
                        message: "validator_command must name a program".to_string(),
                    }
                })?;
                debug!("Post-write validation via {argv:?}");
                Arc::new(command)
            }
            (None, None) => Arc::new(gate.clone()),
        };

        Ok(LifecycleEngine {
            table: config.transition_policy.table(),
            store: PersistenceManager::from_config(&config),
            gate,
            validator,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config,
        })
    }
}
