//! Decoding raw serial bytes into readings.
//!
//! The MTi binary message format is not decoded here. [`FrameDecoder`] is the
//! seam a protocol decoder plugs into; the driver ships with [`NullDecoder`],
//! which discards input so every reading stays at zero.

use movement_sensor::Vector3;

/// One decoded measurement. Fields the frame did not carry are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub magnetometer: Option<Vector3>,
    /// Heading in degrees. Derived from the magnetometer when absent.
    pub compass_heading: Option<f64>,
}

/// Output of feeding bytes to a decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    Sample(Sample),
    /// A frame was recognised but rejected (bad checksum, truncated payload).
    BadFrame(String),
}

/// Turns a stream of bytes into decode events.
///
/// Decoders are fed whatever each read returns, so they must buffer partial
/// frames across calls.
pub trait FrameDecoder: Send {
    fn push(&mut self, bytes: &[u8]) -> Vec<DecodeEvent>;
}

/// Decoder that ignores all input.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDecoder;

impl FrameDecoder for NullDecoder {
    fn push(&mut self, _bytes: &[u8]) -> Vec<DecodeEvent> {
        Vec::new()
    }
}

/// Heading in degrees `[0, 360)` from the horizontal magnetometer components.
pub fn heading_from_magnetometer(magnetometer: &Vector3) -> f64 {
    let heading = magnetometer.y.atan2(magnetometer.x).to_degrees();
    if heading < 0.0 {
        heading + 360.0
    } else {
        heading
    }
}
