//! Driver configuration and construction errors.

use thiserror::Error;

/// Errors raised while validating a configuration or building a driver.
///
/// Per-reading failures are not represented here; those are cached on the
/// running instance as a [`LastError`](movement_sensor::LastError).
#[derive(Error, Debug)]
pub enum XsensError {
    /// A required attribute is empty or absent.
    #[error("{path}: {field:?} is required")]
    MissingRequiredField { path: String, field: &'static str },

    /// The configured baud rate is not one the sensor family supports.
    #[error("{path}: baud rate {rate} is not in {allowed:?}")]
    InvalidBaudRate {
        path: String,
        rate: i64,
        allowed: &'static [u32],
    },

    /// The attribute bag does not decode into a [`Config`](crate::Config).
    #[error("{path}: invalid attributes: {source}")]
    InvalidAttributes {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Opening the serial device failed (absent, permission denied, busy).
    #[error("failed to open serial port {path}: {source}")]
    TransportOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The background reader thread could not be started.
    #[error("failed to start reader thread: {0}")]
    ReaderSpawn(#[source] std::io::Error),
}

/// Result type for driver setup.
pub type XsensResult<T> = Result<T, XsensError>;
