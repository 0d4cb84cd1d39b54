//! Capability-factory registry.
//!
//! Drivers register a [`Registration`] under their [`Model`] once during
//! process startup. The host then validates and constructs configured
//! components by looking the model up here. Nothing registers itself
//! implicitly; the process entry point decides which drivers are available.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::debug;

use crate::config::ComponentConfig;
use crate::model::Model;
use crate::sensor::MovementSensor;

/// Boxed driver error carried through the registry.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

type Validator = dyn Fn(&ComponentConfig) -> Result<Vec<String>, BoxError> + Send + Sync;
type Constructor =
    dyn Fn(&ComponentConfig) -> Result<Arc<dyn MovementSensor>, BoxError> + Send + Sync;

/// Errors from registry lookups and the driver hooks they run.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("no driver registered for model {0}")]
    UnknownModel(Model),

    #[error("invalid configuration for {name}: {source}")]
    Validation {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to construct {name}: {source}")]
    Construction {
        name: String,
        #[source]
        source: BoxError,
    },
}

/// How to validate and build one model.
#[derive(Clone)]
pub struct Registration {
    validator: Arc<Validator>,
    constructor: Arc<Constructor>,
}

impl Registration {
    /// Build a registration from a validator and a constructor.
    ///
    /// The validator must not open any resource. It returns the names of the
    /// components this one depends on, which is an empty `Vec` when there are
    /// none.
    pub fn new<V, C>(validator: V, constructor: C) -> Self
    where
        V: Fn(&ComponentConfig) -> Result<Vec<String>, BoxError> + Send + Sync + 'static,
        C: Fn(&ComponentConfig) -> Result<Arc<dyn MovementSensor>, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            validator: Arc::new(validator),
            constructor: Arc::new(constructor),
        }
    }
}

/// Thread-safe map from [`Model`] to [`Registration`].
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<Model, Registration>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `model`.
    ///
    /// Returns `true` if the model was added. Registering a model that is
    /// already present keeps the existing registration and returns `false`,
    /// so startup code can call this more than once.
    pub fn register(&self, model: Model, registration: Registration) -> bool {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&model) {
            debug!(%model, "model already registered");
            return false;
        }
        debug!(%model, "registered model");
        entries.insert(model, registration);
        true
    }

    pub fn contains(&self, model: &Model) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(model)
    }

    /// Registered models, sorted.
    pub fn models(&self) -> Vec<Model> {
        let mut models: Vec<Model> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        models.sort();
        models
    }

    /// Validate `config` with its model's validator and return its dependencies.
    pub fn validate(&self, config: &ComponentConfig) -> Result<Vec<String>, RegistryError> {
        let registration = self.lookup(&config.model)?;
        (registration.validator)(config).map_err(|source| RegistryError::Validation {
            name: config.name.clone(),
            source,
        })
    }

    /// Construct a live instance for `config`.
    pub fn construct(
        &self,
        config: &ComponentConfig,
    ) -> Result<Arc<dyn MovementSensor>, RegistryError> {
        let registration = self.lookup(&config.model)?;
        (registration.constructor)(config).map_err(|source| RegistryError::Construction {
            name: config.name.clone(),
            source,
        })
    }

    // Clone the entry out so driver hooks never run under the registry lock.
    fn lookup(&self, model: &Model) -> Result<Registration, RegistryError> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownModel(model.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_sensor::FixedSensor;

    fn accepting() -> Registration {
        Registration::new(
            |_| Ok(Vec::new()),
            |config| Ok(Arc::new(FixedSensor::new(&config.name)) as Arc<dyn MovementSensor>),
        )
    }

    fn rejecting() -> Registration {
        Registration::new(
            |_| Err("serial_path is required".into()),
            |_| Err("should not be called".into()),
        )
    }

    fn config(model: &Model) -> ComponentConfig {
        ComponentConfig::new("imu", model.clone(), Default::default())
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = Registry::new();
        let model = Model::new("acme", "sensor", "one");

        assert!(registry.register(model.clone(), accepting()));
        assert!(!registry.register(model.clone(), rejecting()));

        // The first registration is kept.
        assert!(registry.validate(&config(&model)).unwrap().is_empty());
        assert_eq!(registry.models(), vec![model]);
    }

    #[test]
    fn test_unknown_model() {
        let registry = Registry::new();
        let model = Model::new("acme", "sensor", "missing");
        assert!(!registry.contains(&model));
        assert!(matches!(
            registry.validate(&config(&model)),
            Err(RegistryError::UnknownModel(m)) if m == model
        ));
        assert!(matches!(
            registry.construct(&config(&model)),
            Err(RegistryError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_validation_error_carries_component_name() {
        let registry = Registry::new();
        let model = Model::new("acme", "sensor", "strict");
        registry.register(model.clone(), rejecting());

        let err = registry.validate(&config(&model)).unwrap_err();
        assert!(matches!(&err, RegistryError::Validation { name, .. } if name == "imu"));
        assert!(err.to_string().contains("serial_path is required"));
    }

    #[test]
    fn test_construct_returns_named_instance() {
        let registry = Registry::new();
        let model = Model::new("acme", "sensor", "one");
        registry.register(model.clone(), accepting());

        let sensor = registry.construct(&config(&model)).unwrap();
        assert_eq!(sensor.name(), "imu");
    }

    #[test]
    fn test_models_are_sorted() {
        let registry = Registry::new();
        registry.register(Model::new("b", "x", "y"), accepting());
        registry.register(Model::new("a", "x", "y"), accepting());
        let names: Vec<String> = registry.models().iter().map(|m| m.to_string()).collect();
        assert_eq!(names, vec!["a:x:y", "b:x:y"]);
    }
}
