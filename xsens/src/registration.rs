//! Registration of the MTi model with a host [`Registry`].

use std::sync::Arc;

use movement_sensor::{ComponentConfig, Model, MovementSensor, Registration, Registry};

use crate::config::Config;
use crate::decoder::NullDecoder;
use crate::driver::Xsens;
use crate::error::{XsensError, XsensResult};
use crate::transport::{PortOpener, SerialPortOpener};

/// Model identifier the driver registers under.
pub fn model() -> Model {
    Model::new("viam", "sensor", "mti-xsense-200")
}

/// Register the driver, opening real serial devices.
///
/// Returns `false` if the model was already registered.
pub fn register(registry: &Registry) -> bool {
    register_with_opener(registry, Arc::new(SerialPortOpener))
}

/// Register the driver with a custom [`PortOpener`].
pub fn register_with_opener(registry: &Registry, opener: Arc<dyn PortOpener>) -> bool {
    registry.register(
        model(),
        Registration::new(
            |config| Ok(native_config(config)?.validate(&config.validation_path())?),
            move |config| {
                let native = native_config(config)?;
                let sensor =
                    Xsens::with_opener(&config.name, &native, opener.as_ref(), Box::new(NullDecoder))?;
                Ok(Arc::new(sensor) as Arc<dyn MovementSensor>)
            },
        ),
    )
}

fn native_config(config: &ComponentConfig) -> XsensResult<Config> {
    config
        .native_config()
        .map_err(|source| XsensError::InvalidAttributes {
            path: config.validation_path(),
            source,
        })
}
