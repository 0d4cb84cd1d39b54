//! Component configuration handed to drivers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::Model;

/// One configured component: a name, the model that implements it and the
/// driver-specific attribute bag.
///
/// ```
/// use movement_sensor::ComponentConfig;
///
/// let config: ComponentConfig = serde_json::from_str(r#"{
///     "name": "imu",
///     "model": "viam:sensor:mti-xsense-200",
///     "attributes": { "serial_path": "/dev/ttyUSB0" }
/// }"#).unwrap();
/// assert_eq!(config.model.name, "mti-xsense-200");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub model: Model,
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl ComponentConfig {
    pub fn new(
        name: &str,
        model: Model,
        attributes: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            name: name.to_string(),
            model,
            attributes,
        }
    }

    /// Decode the attribute bag into the driver's typed configuration.
    pub fn native_config<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.attributes.clone()))
    }

    /// Path used when reporting validation errors for this component.
    pub fn validation_path(&self) -> String {
        format!("components.{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Attrs {
        port: String,
        #[serde(default)]
        rate: u32,
    }

    fn config(attributes: serde_json::Value) -> ComponentConfig {
        let serde_json::Value::Object(map) = attributes else {
            panic!("attributes must be an object");
        };
        ComponentConfig::new("imu", Model::new("a", "b", "c"), map)
    }

    #[test]
    fn test_native_config_decodes_attributes() {
        let attrs: Attrs = config(json!({"port": "/dev/ttyS0", "rate": 9}))
            .native_config()
            .unwrap();
        assert_eq!(attrs.port, "/dev/ttyS0");
        assert_eq!(attrs.rate, 9);
    }

    #[test]
    fn test_native_config_reports_type_errors() {
        let result: Result<Attrs, _> = config(json!({"port": 5})).native_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_attributes_default_to_empty() {
        let cfg: ComponentConfig =
            serde_json::from_str(r#"{"name": "imu", "model": "a:b:c"}"#).unwrap();
        assert!(cfg.attributes.is_empty());
        assert_eq!(cfg.validation_path(), "components.imu");
    }
}
