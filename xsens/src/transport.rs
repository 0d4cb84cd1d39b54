//! Serial transport used by the driver.
//!
//! The driver only needs a byte stream, so the transport is a trait object
//! over `Read + Write`. [`SerialPortOpener`] opens real devices through the
//! `serialport` crate; [`mock`] provides scripted stand-ins for tests.
//!
//! # Framing
//!
//! The MTi talks 8 data bits, 1 stop bit, no parity and no flow control.
//! Reads return as soon as at least [`SerialSettings::min_read_size`] byte is
//! available or the read timeout elapses, whichever comes first.

pub mod mock;

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};
use tracing::debug;

/// Upper bound on a single blocking read.
///
/// Keeps the reader responsive to cancellation and lets it notice when the
/// sensor goes quiet.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Parameters used to open the serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub path: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub min_read_size: usize,
    pub read_timeout: Duration,
}

impl SerialSettings {
    /// 8N1 settings for `path` at `baud_rate`.
    pub fn new(path: &str, baud_rate: u32) -> Self {
        Self {
            path: path.to_string(),
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            min_read_size: 1,
            read_timeout: READ_TIMEOUT,
        }
    }
}

/// An open bidirectional byte stream.
pub trait Transport: Read + Write + Send {}

impl<T: Read + Write + Send> Transport for T {}

/// Opens a [`Transport`] for a set of [`SerialSettings`].
pub trait PortOpener: Send + Sync {
    fn open(&self, settings: &SerialSettings) -> io::Result<Box<dyn Transport>>;
}

/// Opens real serial devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialPortOpener;

impl PortOpener for SerialPortOpener {
    fn open(&self, settings: &SerialSettings) -> io::Result<Box<dyn Transport>> {
        let data_bits = match settings.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            8 => DataBits::Eight,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unsupported data bits: {other}"),
                ))
            }
        };
        let stop_bits = match settings.stop_bits {
            1 => StopBits::One,
            2 => StopBits::Two,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unsupported stop bits: {other}"),
                ))
            }
        };

        let port = serialport::new(settings.path.as_str(), settings.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(io::Error::from)?;

        debug!(path = %settings.path, baud_rate = settings.baud_rate, "serial port open");
        Ok(Box::new(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_to_8n1() {
        let settings = SerialSettings::new("/dev/ttyUSB0", 115_200);
        assert_eq!(settings.data_bits, 8);
        assert_eq!(settings.stop_bits, 1);
        assert_eq!(settings.min_read_size, 1);
        assert_eq!(settings.read_timeout, READ_TIMEOUT);
    }

    #[test]
    fn test_open_missing_device_fails() {
        let settings = SerialSettings::new("/dev/does-not-exist-xsens", 115_200);
        assert!(SerialPortOpener.open(&settings).is_err());
    }

    #[test]
    fn test_open_rejects_unsupported_framing() {
        let mut settings = SerialSettings::new("/dev/does-not-exist-xsens", 115_200);
        settings.data_bits = 9;
        let err = SerialPortOpener.open(&settings).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
