//! Xsens MTi movement sensor instance.

use std::sync::{Arc, Mutex, PoisonError};

use movement_sensor::{
    Accuracy, Extra, GeoPoint, LastError, MovementSensor, Orientation, Properties, Readings,
    SensorError, SensorResult, Vector3,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_BAUD_RATE, SUPPORTED_BAUD_RATES};
use crate::decoder::{FrameDecoder, NullDecoder};
use crate::error::{XsensError, XsensResult};
use crate::reader::BackgroundReader;
use crate::state::{self, DriverState, STALE_AFTER};
use crate::transport::{PortOpener, SerialPortOpener, SerialSettings};

/// What the MTi family can report through this driver.
pub const PROPERTIES: Properties = Properties {
    linear_velocity_supported: false,
    angular_velocity_supported: false,
    orientation_supported: false,
    position_supported: false,
    compass_heading_supported: true,
    linear_acceleration_supported: false,
};

/// A live connection to one MTi sensor.
///
/// Queries never touch the serial port. They copy the cached [`DriverState`]
/// under its lock and return immediately, so any number of callers can query
/// concurrently while the background reader updates the cache.
///
/// Once [`close`](MovementSensor::close) has run, every query returns
/// [`SensorError::Closed`].
pub struct Xsens {
    name: String,
    settings: SerialSettings,
    state: Arc<Mutex<DriverState>>,
    // Held for the whole of `close` so concurrent closes wait for the first.
    reader: Mutex<Option<BackgroundReader>>,
}

impl Xsens {
    /// Open the serial device named in `config`.
    pub fn open(name: &str, config: &Config) -> XsensResult<Self> {
        Self::with_opener(name, config, &SerialPortOpener, Box::new(NullDecoder))
    }

    /// Open through `opener`, decoding incoming bytes with `decoder`.
    ///
    /// Fails with [`XsensError::TransportOpen`] if the port cannot be opened;
    /// no instance exists in that case.
    pub fn with_opener(
        name: &str,
        config: &Config,
        opener: &dyn PortOpener,
        decoder: Box<dyn FrameDecoder>,
    ) -> XsensResult<Self> {
        let baud_rate = config.configured_baud_rate().unwrap_or_else(|| {
            warn!(
                name,
                configured = ?config.serial_baud_rate,
                "no valid serial_baud_rate set, using default of {DEFAULT_BAUD_RATE}; supported rates are {SUPPORTED_BAUD_RATES:?}"
            );
            DEFAULT_BAUD_RATE
        });

        let settings = SerialSettings::new(&config.serial_path, baud_rate);
        debug!(name, ?settings, "opening serial connection");

        let transport = opener
            .open(&settings)
            .map_err(|source| XsensError::TransportOpen {
                path: settings.path.clone(),
                source,
            })?;

        let state = Arc::new(Mutex::new(DriverState::new()));
        let reader = BackgroundReader::spawn(name, transport, state.clone(), decoder, STALE_AFTER)
            .map_err(XsensError::ReaderSpawn)?;

        info!(name, path = %settings.path, baud_rate, "MTi connection open");
        Ok(Self {
            name: name.to_string(),
            settings,
            state,
            reader: Mutex::new(Some(reader)),
        })
    }

    /// Settings the serial port was opened with.
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    /// Copy of the full cached state, available even after close.
    pub fn snapshot(&self) -> DriverState {
        state::lock(&self.state).clone()
    }

    pub fn is_closed(&self) -> bool {
        state::lock(&self.state).is_closed()
    }

    /// Background readers still running (0 or 1).
    pub fn readers_in_flight(&self) -> usize {
        self.reader
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, BackgroundReader::in_flight)
    }

    // One lock acquisition per query; the guard is released before returning.
    fn open_snapshot(&self) -> SensorResult<DriverState> {
        let state = state::lock(&self.state);
        if state.is_closed() {
            return Err(SensorError::Closed {
                name: self.name.clone(),
            });
        }
        Ok(state.clone())
    }
}

impl MovementSensor for Xsens {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self, _extra: Option<&Extra>) -> SensorResult<(GeoPoint, f64)> {
        self.open_snapshot()?;
        Ok((GeoPoint::default(), 0.0))
    }

    fn linear_velocity(&self, _extra: Option<&Extra>) -> SensorResult<Vector3> {
        self.open_snapshot()?;
        Ok(Vector3::zeros())
    }

    fn angular_velocity(&self, _extra: Option<&Extra>) -> SensorResult<Vector3> {
        self.open_snapshot()?;
        Ok(Vector3::zeros())
    }

    fn linear_acceleration(&self, _extra: Option<&Extra>) -> SensorResult<Vector3> {
        self.open_snapshot()?;
        Ok(Vector3::zeros())
    }

    fn compass_heading(&self, _extra: Option<&Extra>) -> SensorResult<f64> {
        Ok(self.open_snapshot()?.compass_heading)
    }

    fn orientation(&self, _extra: Option<&Extra>) -> SensorResult<Orientation> {
        self.open_snapshot()?;
        Ok(Orientation::identity())
    }

    fn properties(&self, _extra: Option<&Extra>) -> SensorResult<Properties> {
        self.open_snapshot()?;
        Ok(PROPERTIES)
    }

    fn accuracy(&self, _extra: Option<&Extra>) -> SensorResult<Accuracy> {
        self.open_snapshot()?;
        Ok(Accuracy::default())
    }

    fn readings(&self, _extra: Option<&Extra>) -> SensorResult<Readings> {
        let snapshot = self.open_snapshot()?;
        let mut readings = Readings::new();
        readings.insert("compass".to_string(), json!(snapshot.compass_heading));
        readings.insert(
            "magnetometer".to_string(),
            json!({
                "x": snapshot.magnetometer.x,
                "y": snapshot.magnetometer.y,
                "z": snapshot.magnetometer.z,
            }),
        );
        readings.insert(
            "num_bad_readings".to_string(),
            json!(snapshot.bad_reading_count),
        );
        Ok(readings)
    }

    fn last_error(&self) -> Option<LastError> {
        state::lock(&self.state).last_error.clone()
    }

    fn close(&self) -> SensorResult<()> {
        let mut reader = self.reader.lock().unwrap_or_else(PoisonError::into_inner);
        {
            let mut state = state::lock(&self.state);
            if state.is_closed() {
                return Ok(());
            }
            state.lifecycle = state::Lifecycle::Closed;
        }

        // Join the reader before the transport goes away.
        if let Some(mut running) = reader.take() {
            drop(running.stop());
        }
        info!(name = %self.name, path = %self.settings.path, "MTi connection closed");
        Ok(())
    }
}

impl Drop for Xsens {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(name = %self.name, "error closing on drop: {e}");
        }
    }
}
