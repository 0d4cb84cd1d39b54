//! Errors returned by movement sensor queries.

use std::time::Duration;

use thiserror::Error;

/// Errors a movement sensor query can return.
///
/// The type is `Clone` so drivers can cache the most recent per-reading error
/// in a [`LastError`](crate::LastError) and hand out copies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    /// The instance has been shut down and no longer answers queries.
    #[error("movement sensor {name} is closed")]
    Closed { name: String },

    /// No valid reading has been decoded recently.
    #[error("no valid reading decoded in the last {age:?}")]
    StaleOrUnavailableReading { age: Duration },

    /// A frame arrived but could not be decoded into a reading.
    #[error("bad reading: {0}")]
    BadReading(String),

    /// The underlying transport failed while reading.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for movement sensor queries.
pub type SensorResult<T> = Result<T, SensorError>;
