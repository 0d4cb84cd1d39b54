//! Minimal in-memory sensor used by the registry and module tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::SensorResult;
use crate::last_error::LastError;
use crate::sensor::MovementSensor;
use crate::types::{Accuracy, Extra, GeoPoint, Orientation, Properties, Readings, Vector3};

pub struct FixedSensor {
    name: String,
    closes: AtomicUsize,
}

impl FixedSensor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl MovementSensor for FixedSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self, _extra: Option<&Extra>) -> SensorResult<(GeoPoint, f64)> {
        Ok((GeoPoint::default(), 0.0))
    }

    fn linear_velocity(&self, _extra: Option<&Extra>) -> SensorResult<Vector3> {
        Ok(Vector3::zeros())
    }

    fn angular_velocity(&self, _extra: Option<&Extra>) -> SensorResult<Vector3> {
        Ok(Vector3::zeros())
    }

    fn linear_acceleration(&self, _extra: Option<&Extra>) -> SensorResult<Vector3> {
        Ok(Vector3::zeros())
    }

    fn compass_heading(&self, _extra: Option<&Extra>) -> SensorResult<f64> {
        Ok(0.0)
    }

    fn orientation(&self, _extra: Option<&Extra>) -> SensorResult<Orientation> {
        Ok(Orientation::identity())
    }

    fn properties(&self, _extra: Option<&Extra>) -> SensorResult<Properties> {
        Ok(Properties::default())
    }

    fn accuracy(&self, _extra: Option<&Extra>) -> SensorResult<Accuracy> {
        Ok(Accuracy::default())
    }

    fn readings(&self, _extra: Option<&Extra>) -> SensorResult<Readings> {
        Ok(Readings::new())
    }

    fn last_error(&self) -> Option<LastError> {
        None
    }

    fn close(&self) -> SensorResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
