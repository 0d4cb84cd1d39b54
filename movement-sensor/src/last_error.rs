//! Cached per-reading error.

use crate::error::SensorError;

/// The most recent per-reading error together with the reading count at which
/// it occurred.
///
/// Drivers cache this instead of failing every later query. A caller compares
/// `reading_count` against the driver's current count to decide whether the
/// error still describes the latest data.
#[derive(Debug, Clone, PartialEq)]
pub struct LastError {
    pub error: SensorError,
    pub reading_count: u64,
}

impl LastError {
    pub fn new(error: SensorError, reading_count: u64) -> Self {
        Self {
            error,
            reading_count,
        }
    }

    /// True if no reading has been decoded since this error was recorded.
    pub fn is_current(&self, reading_count: u64) -> bool {
        reading_count <= self.reading_count
    }
}
