//! Host-side module that owns the live component instances of a process.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ComponentConfig;
use crate::registry::{Registry, RegistryError};
use crate::sensor::MovementSensor;

#[derive(Error, Debug)]
pub enum ModuleError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("component name {0} is configured more than once")]
    DuplicateName(String),

    #[error("{name} depends on {dependency}, which is not configured")]
    MissingDependency { name: String, dependency: String },

    #[error("module is already running")]
    AlreadyStarted,
}

/// Validates, constructs and closes the components configured for a process.
pub struct Module {
    registry: Registry,
    instances: Vec<Arc<dyn MovementSensor>>,
}

impl Module {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            instances: Vec::new(),
        }
    }

    /// Validate every config, then construct each component.
    ///
    /// Nothing is constructed unless all configs validate. If a construction
    /// fails, the components built so far are closed before returning.
    pub fn start(&mut self, configs: &[ComponentConfig]) -> Result<(), ModuleError> {
        if !self.instances.is_empty() {
            return Err(ModuleError::AlreadyStarted);
        }

        let mut names = HashSet::new();
        for config in configs {
            if !names.insert(config.name.as_str()) {
                return Err(ModuleError::DuplicateName(config.name.clone()));
            }
        }

        for config in configs {
            let dependencies = self.registry.validate(config)?;
            debug!(name = %config.name, ?dependencies, "validated component");
            if let Some(missing) = dependencies
                .into_iter()
                .find(|dep| !names.contains(dep.as_str()))
            {
                return Err(ModuleError::MissingDependency {
                    name: config.name.clone(),
                    dependency: missing,
                });
            }
        }

        for config in configs {
            match self.registry.construct(config) {
                Ok(instance) => {
                    info!(name = %config.name, model = %config.model, "component started");
                    self.instances.push(instance);
                }
                Err(e) => {
                    self.close();
                    return Err(e.into());
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn MovementSensor>> {
        self.instances
            .iter()
            .find(|instance| instance.name() == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Close every component. Errors are logged and do not stop the others
    /// from closing.
    pub fn close(&mut self) {
        for instance in self.instances.drain(..) {
            match instance.close() {
                Ok(()) => debug!(name = instance.name(), "component closed"),
                Err(e) => warn!(name = instance.name(), "error closing component: {e}"),
            }
        }
    }
}

impl Drop for Module {
    fn drop(&mut self) {
        self.close();
    }
}
