//! Movement sensor capability contract.
//!
//! This crate describes what a host expects from a movement sensor driver and
//! provides the pieces the host uses to discover and run drivers:
//!
//! - [`MovementSensor`] - the capability trait every driver implements
//! - [`Registry`] - capability-factory map keyed by [`Model`]
//! - [`Module`] - validates, constructs and closes configured components
//! - [`LastError`] - cached per-reading error with the reading count it occurred at
//!
//! Drivers live in their own crates and register themselves explicitly:
//!
//! ```no_run
//! use movement_sensor::{Module, Registry};
//!
//! let registry = Registry::new();
//! // some_driver::register(&registry);
//! let mut module = Module::new(registry);
//! module.start(&[])?;
//! module.close();
//! # Ok::<(), movement_sensor::ModuleError>(())
//! ```

pub mod config;
pub mod error;
pub mod last_error;
pub mod model;
pub mod module;
pub mod registry;
pub mod sensor;
pub mod types;

#[cfg(test)]
mod test_sensor;

pub use config::ComponentConfig;
pub use error::{SensorError, SensorResult};
pub use last_error::LastError;
pub use model::{Model, ModelParseError, MOVEMENT_SENSOR_API};
pub use module::{Module, ModuleError};
pub use registry::{BoxError, Registration, Registry, RegistryError};
pub use sensor::MovementSensor;
pub use types::{Accuracy, Extra, GeoPoint, Orientation, Properties, Readings, Vector3};
