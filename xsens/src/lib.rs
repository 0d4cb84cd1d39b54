//! Xsens MTi serial inertial/compass sensor driver.
//!
//! Exposes an MTi as a [`MovementSensor`](movement_sensor::MovementSensor).
//! The driver owns the serial port, runs a background reader that publishes
//! into a mutex-guarded [`DriverState`], and answers every query from that
//! cache without touching the device.
//!
//! # Registration
//!
//! The driver is made available to a host by calling [`register`] once during
//! startup:
//!
//! ```no_run
//! use movement_sensor::{ComponentConfig, Module, Registry};
//!
//! let registry = Registry::new();
//! xsens::register(&registry);
//!
//! let config: ComponentConfig = serde_json::from_str(r#"{
//!     "name": "imu",
//!     "model": "viam:sensor:mti-xsense-200",
//!     "attributes": { "serial_path": "/dev/ttyUSB0", "serial_baud_rate": 115200 }
//! }"#)?;
//!
//! let mut module = Module::new(registry);
//! module.start(&[config])?;
//! let heading = module.get("imu").unwrap().compass_heading(None)?;
//! println!("heading: {heading}");
//! module.close();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod reader;
pub mod registration;
pub mod state;
pub mod transport;

pub use config::{Config, DEFAULT_BAUD_RATE, SUPPORTED_BAUD_RATES};
pub use decoder::{DecodeEvent, FrameDecoder, NullDecoder, Sample};
pub use driver::{Xsens, PROPERTIES};
pub use error::{XsensError, XsensResult};
pub use registration::{model, register, register_with_opener};
pub use state::{DriverState, Lifecycle, STALE_AFTER};
pub use transport::{PortOpener, SerialPortOpener, SerialSettings, Transport, READ_TIMEOUT};
