//! The movement sensor capability trait.

use crate::error::SensorResult;
use crate::last_error::LastError;
use crate::types::{Accuracy, Extra, GeoPoint, Orientation, Properties, Readings, Vector3};

/// Interface every movement sensor driver exposes to the host.
///
/// Implementations are shared between many concurrent callers, so every query
/// takes `&self` and must not block on device I/O; drivers answer from a cached
/// snapshot that a background task keeps up to date.
pub trait MovementSensor: Send + Sync {
    /// Configured component name.
    fn name(&self) -> &str;

    /// Geographic position and altitude in metres.
    fn position(&self, extra: Option<&Extra>) -> SensorResult<(GeoPoint, f64)>;

    /// Linear velocity in m/s.
    fn linear_velocity(&self, extra: Option<&Extra>) -> SensorResult<Vector3>;

    /// Angular velocity in degrees/s.
    fn angular_velocity(&self, extra: Option<&Extra>) -> SensorResult<Vector3>;

    /// Linear acceleration in m/s^2.
    fn linear_acceleration(&self, extra: Option<&Extra>) -> SensorResult<Vector3>;

    /// Compass heading in degrees, clockwise from north.
    fn compass_heading(&self, extra: Option<&Extra>) -> SensorResult<f64>;

    fn orientation(&self, extra: Option<&Extra>) -> SensorResult<Orientation>;

    /// Fixed description of what this sensor can report.
    fn properties(&self, extra: Option<&Extra>) -> SensorResult<Properties>;

    fn accuracy(&self, extra: Option<&Extra>) -> SensorResult<Accuracy>;

    /// Generic key-value readings.
    fn readings(&self, extra: Option<&Extra>) -> SensorResult<Readings>;

    /// Most recent per-reading error, if any. Still answers after [`close`].
    ///
    /// [`close`]: MovementSensor::close
    fn last_error(&self) -> Option<LastError>;

    /// Release the device. Calling it more than once is not an error.
    fn close(&self) -> SensorResult<()>;
}
