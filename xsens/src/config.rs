//! Connection configuration and its validation.

use serde::{Deserialize, Serialize};

use crate::error::{XsensError, XsensResult};

/// Baud rates the MTi family accepts on its serial interface.
pub const SUPPORTED_BAUD_RATES: &[u32] = &[115_200];

/// Rate used when `serial_baud_rate` is absent or zero.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Attributes of one MTi component.
///
/// ```
/// use xsens::Config;
///
/// let config: Config = serde_json::from_str(r#"{"serial_path": "/dev/ttyUSB0"}"#).unwrap();
/// assert!(config.validate("components.imu").unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Device path of the serial port.
    pub serial_path: String,

    /// Optional baud rate; `0` or absent selects [`DEFAULT_BAUD_RATE`].
    ///
    /// Signed so that negative or out-of-range rates reach [`Config::validate`]
    /// and fail there as [`XsensError::InvalidBaudRate`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_baud_rate: Option<i64>,
}

fn is_supported(rate: i64) -> bool {
    u32::try_from(rate).is_ok_and(|rate| SUPPORTED_BAUD_RATES.contains(&rate))
}

impl Config {
    pub fn new(serial_path: &str, serial_baud_rate: Option<i64>) -> Self {
        Self {
            serial_path: serial_path.to_string(),
            serial_baud_rate,
        }
    }

    /// Check the configuration without touching the device.
    ///
    /// Returns the names of the components this one depends on. The MTi has
    /// none, but the list is always returned so the host can build its
    /// dependency graph.
    pub fn validate(&self, path: &str) -> XsensResult<Vec<String>> {
        if self.serial_path.is_empty() {
            return Err(XsensError::MissingRequiredField {
                path: path.to_string(),
                field: "serial_path",
            });
        }

        if let Some(rate) = self.serial_baud_rate {
            if rate != 0 && !is_supported(rate) {
                return Err(XsensError::InvalidBaudRate {
                    path: path.to_string(),
                    rate,
                    allowed: SUPPORTED_BAUD_RATES,
                });
            }
        }

        Ok(Vec::new())
    }

    /// The configured baud rate if it is set, non-zero and supported.
    pub fn configured_baud_rate(&self) -> Option<u32> {
        self.serial_baud_rate
            .filter(|rate| is_supported(*rate))
            .and_then(|rate| u32::try_from(rate).ok())
    }
}
