//! Cached driver state shared between the reader and the query surface.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use movement_sensor::{LastError, SensorError, Vector3};

use crate::decoder::{heading_from_magnetometer, DecodeEvent, Sample};

/// Gap after the last decoded reading beyond which the data is flagged stale.
pub const STALE_AFTER: Duration = Duration::from_secs(1);

/// Whether the instance still answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Open,
    Closed,
}

/// Snapshot of everything the driver knows about the sensor.
///
/// Lives behind a single mutex; readers copy it out whole so every query sees
/// one consistent state.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverState {
    pub magnetometer: Vector3,
    pub compass_heading: f64,
    pub bad_reading_count: u32,
    /// Number of samples decoded since the instance was opened.
    pub reading_count: u64,
    pub last_reading_at: Option<Instant>,
    pub last_error: Option<LastError>,
    /// Reading count of the gap already flagged stale.
    pub stale_flagged_at: Option<u64>,
    pub lifecycle: Lifecycle,
}

impl Default for DriverState {
    fn default() -> Self {
        Self {
            magnetometer: Vector3::zeros(),
            compass_heading: 0.0,
            bad_reading_count: 0,
            reading_count: 0,
            last_reading_at: None,
            last_error: None,
            stale_flagged_at: None,
            lifecycle: Lifecycle::Open,
        }
    }
}

impl DriverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.lifecycle == Lifecycle::Closed
    }

    pub fn apply(&mut self, event: DecodeEvent, now: Instant) {
        match event {
            DecodeEvent::Sample(sample) => self.apply_sample(sample, now),
            DecodeEvent::BadFrame(reason) => {
                self.bad_reading_count = self.bad_reading_count.saturating_add(1);
                self.record_error(SensorError::BadReading(reason));
            }
        }
    }

    fn apply_sample(&mut self, sample: Sample, now: Instant) {
        if let Some(magnetometer) = sample.magnetometer {
            self.magnetometer = magnetometer;
        }
        self.compass_heading = match (sample.compass_heading, sample.magnetometer) {
            (Some(heading), _) => heading,
            (None, Some(magnetometer)) => heading_from_magnetometer(&magnetometer),
            (None, None) => self.compass_heading,
        };
        self.reading_count += 1;
        self.last_reading_at = Some(now);
    }

    /// Cache `error` against the current reading count.
    pub fn record_error(&mut self, error: SensorError) {
        self.last_error = Some(LastError::new(error, self.reading_count));
    }

    /// Flag the data as stale if nothing has been decoded for `stale_after`.
    ///
    /// Only applies once a first reading has arrived, and flags each gap once.
    /// Returns `true` when a new stale error was recorded.
    pub fn check_staleness(&mut self, now: Instant, stale_after: Duration) -> bool {
        let Some(last_reading_at) = self.last_reading_at else {
            return false;
        };
        let age = now.saturating_duration_since(last_reading_at);
        if age <= stale_after {
            return false;
        }

        if self.stale_flagged_at == Some(self.reading_count) {
            return false;
        }

        self.stale_flagged_at = Some(self.reading_count);
        self.record_error(SensorError::StaleOrUnavailableReading { age });
        true
    }
}

/// Lock the shared state, recovering the data if a holder panicked.
pub(crate) fn lock(state: &Mutex<DriverState>) -> MutexGuard<'_, DriverState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
