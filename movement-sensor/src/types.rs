//! Value types returned by movement sensor queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Three-component vector (body frame unless noted otherwise).
pub type Vector3 = nalgebra::Vector3<f64>;

/// Sensor orientation. The zero orientation is the identity rotation.
pub type Orientation = nalgebra::UnitQuaternion<f64>;

/// Optional, extensible parameter bag passed to every query.
pub type Extra = serde_json::Map<String, serde_json::Value>;

/// Generic key-value readings.
pub type Readings = BTreeMap<String, serde_json::Value>;

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Accuracy figures reported by a sensor.
///
/// `values` carries sensor-specific named figures; an empty map means the
/// sensor reports nothing beyond the optional compass error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Accuracy {
    pub values: BTreeMap<String, f32>,
    /// Expected compass heading error in degrees, if known.
    pub compass_degree_error: Option<f32>,
}

/// Which quantities a movement sensor can report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    pub linear_velocity_supported: bool,
    pub angular_velocity_supported: bool,
    pub orientation_supported: bool,
    pub position_supported: bool,
    pub compass_heading_supported: bool,
    pub linear_acceleration_supported: bool,
}

impl Properties {
    /// Names of the supported quantities, in a fixed order.
    pub fn supported(&self) -> Vec<&'static str> {
        [
            ("linear_velocity", self.linear_velocity_supported),
            ("angular_velocity", self.angular_velocity_supported),
            ("orientation", self.orientation_supported),
            ("position", self.position_supported),
            ("compass_heading", self.compass_heading_supported),
            ("linear_acceleration", self.linear_acceleration_supported),
        ]
        .into_iter()
        .filter_map(|(name, supported)| supported.then_some(name))
        .collect()
    }
}
