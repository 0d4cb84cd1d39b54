//! Background reader thread.
//!
//! The reader owns the transport while it runs: it reads with a timeout,
//! feeds the decoder and publishes results into the shared [`DriverState`].
//! Stopping it sets a cancellation flag and joins the thread, which hands the
//! transport back. The transport therefore can only be closed after the
//! reader has exited.

use std::io::{self, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use movement_sensor::SensorError;
use tracing::{debug, error, warn};

use crate::decoder::FrameDecoder;
use crate::state::{self, DriverState};
use crate::transport::Transport;

const READ_BUFFER_SIZE: usize = 256;

/// Pause after a zero-length read so an idle stream does not spin.
const IDLE_BACKOFF: Duration = Duration::from_millis(5);

/// Handle to a running reader thread.
pub struct BackgroundReader {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<Box<dyn Transport>>>,
}

impl BackgroundReader {
    /// Start reading from `transport` on a new thread named after `name`.
    pub fn spawn(
        name: &str,
        transport: Box<dyn Transport>,
        state: Arc<Mutex<DriverState>>,
        decoder: Box<dyn FrameDecoder>,
        stale_after: Duration,
    ) -> io::Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let worker = ReadLoop {
            name: name.to_string(),
            transport,
            state,
            decoder,
            cancel: cancel.clone(),
            stale_after,
        };

        let handle = thread::Builder::new()
            .name(format!("{name}-reader"))
            .spawn(move || worker.run())?;

        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    /// Number of reader threads that have not exited yet (0 or 1).
    pub fn in_flight(&self) -> usize {
        self.handle
            .as_ref()
            .map_or(0, |handle| usize::from(!handle.is_finished()))
    }

    /// Signal the thread to stop and wait for it.
    ///
    /// Returns the transport, or `None` if the reader was already stopped or
    /// the thread panicked (in which case the transport was dropped during
    /// unwinding).
    pub fn stop(&mut self) -> Option<Box<dyn Transport>> {
        self.cancel.store(true, Ordering::Release);
        let handle = self.handle.take()?;
        match handle.join() {
            Ok(transport) => Some(transport),
            Err(_) => {
                error!("reader thread panicked");
                None
            }
        }
    }
}

impl Drop for BackgroundReader {
    fn drop(&mut self) {
        drop(self.stop());
    }
}

struct ReadLoop {
    name: String,
    transport: Box<dyn Transport>,
    state: Arc<Mutex<DriverState>>,
    decoder: Box<dyn FrameDecoder>,
    cancel: Arc<AtomicBool>,
    stale_after: Duration,
}

impl ReadLoop {
    fn run(mut self) -> Box<dyn Transport> {
        debug!(name = %self.name, "reader started");
        let mut buf = [0u8; READ_BUFFER_SIZE];

        while !self.cancel.load(Ordering::Acquire) {
            match self.transport.read(&mut buf) {
                Ok(0) => thread::sleep(IDLE_BACKOFF),
                Ok(n) => {
                    // Decode before locking; the lock only covers the publish.
                    let events = self.decoder.push(&buf[..n]);
                    if !events.is_empty() {
                        let now = Instant::now();
                        let mut state = state::lock(&self.state);
                        for event in events {
                            state.apply(event, now);
                        }
                    }
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                    ) => {}
                Err(e) => {
                    error!(name = %self.name, "serial read failed, reader stopping: {e}");
                    state::lock(&self.state).record_error(SensorError::Transport(e.to_string()));
                    break;
                }
            }

            let stale = state::lock(&self.state).check_staleness(Instant::now(), self.stale_after);
            if stale {
                warn!(name = %self.name, "no reading decoded for over {:?}", self.stale_after);
            }
        }

        debug!(name = %self.name, "reader stopped");
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{DecodeEvent, NullDecoder, Sample};
    use crate::transport::mock::MockTransport;
    use movement_sensor::{LastError, Vector3};

    /// Emits one sample per byte received, using the byte as the x component.
    struct ByteDecoder;

    impl FrameDecoder for ByteDecoder {
        fn push(&mut self, bytes: &[u8]) -> Vec<DecodeEvent> {
            bytes
                .iter()
                .map(|&b| {
                    if b == 0xFF {
                        DecodeEvent::BadFrame("marker".into())
                    } else {
                        DecodeEvent::Sample(Sample {
                            magnetometer: Some(Vector3::new(f64::from(b), 0.0, 0.0)),
                            compass_heading: None,
                        })
                    }
                })
                .collect()
        }
    }

    fn wait_for(state: &Mutex<DriverState>, pred: impl Fn(&DriverState) -> bool) -> DriverState {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let snapshot = state::lock(state).clone();
            if pred(&snapshot) || Instant::now() > deadline {
                return snapshot;
            }
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_publishes_decoded_samples() {
        let state = Arc::new(Mutex::new(DriverState::new()));
        let transport = MockTransport::new(vec![vec![1, 2], vec![3]]);
        let mut reader = BackgroundReader::spawn(
            "imu",
            Box::new(transport),
            state.clone(),
            Box::new(ByteDecoder),
            Duration::from_secs(60),
        )
        .unwrap();

        let snapshot = wait_for(&state, |s| s.reading_count == 3);
        assert_eq!(snapshot.reading_count, 3);
        assert_eq!(snapshot.magnetometer, Vector3::new(3.0, 0.0, 0.0));
        assert!(reader.stop().is_some());
    }

    #[test]
    fn test_bad_frames_counted() {
        let state = Arc::new(Mutex::new(DriverState::new()));
        let transport = MockTransport::new(vec![vec![7, 0xFF]]);
        let mut reader = BackgroundReader::spawn(
            "imu",
            Box::new(transport),
            state.clone(),
            Box::new(ByteDecoder),
            Duration::from_secs(60),
        )
        .unwrap();

        let snapshot = wait_for(&state, |s| s.bad_reading_count == 1);
        assert_eq!(snapshot.bad_reading_count, 1);
        assert_eq!(
            snapshot.last_error,
            Some(LastError::new(SensorError::BadReading("marker".into()), 1))
        );
        reader.stop();
    }

    #[test]
    fn test_fatal_read_error_cached_and_reader_exits() {
        let state = Arc::new(Mutex::new(DriverState::new()));
        let transport = MockTransport::new(Vec::new()).with_read_error(ErrorKind::BrokenPipe);
        let closed = transport.closed_flag();
        let mut reader = BackgroundReader::spawn(
            "imu",
            Box::new(transport),
            state.clone(),
            Box::new(NullDecoder),
            Duration::from_secs(60),
        )
        .unwrap();

        let snapshot = wait_for(&state, |s| s.last_error.is_some());
        assert!(matches!(
            snapshot.last_error,
            Some(LastError {
                error: SensorError::Transport(_),
                reading_count: 0
            })
        ));

        let deadline = Instant::now() + Duration::from_secs(5);
        while reader.in_flight() > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        assert_eq!(reader.in_flight(), 0);

        // The transport is still owned until the reader is stopped.
        assert!(!closed.load(Ordering::SeqCst));
        drop(reader.stop());
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_stop_returns_transport_and_is_idempotent() {
        let state = Arc::new(Mutex::new(DriverState::new()));
        let transport = MockTransport::new(Vec::new());
        let closed = transport.closed_flag();
        let mut reader = BackgroundReader::spawn(
            "imu",
            Box::new(transport),
            state,
            Box::new(NullDecoder),
            Duration::from_secs(60),
        )
        .unwrap();
        assert_eq!(reader.in_flight(), 1);

        let transport = reader.stop();
        assert!(transport.is_some());
        assert_eq!(reader.in_flight(), 0);
        assert!(!closed.load(Ordering::SeqCst));

        drop(transport);
        assert!(closed.load(Ordering::SeqCst));
        assert!(reader.stop().is_none());
    }

    #[test]
    fn test_quiet_sensor_flagged_stale() {
        let state = Arc::new(Mutex::new(DriverState::new()));
        let transport = MockTransport::new(vec![vec![5]]);
        let mut reader = BackgroundReader::spawn(
            "imu",
            Box::new(transport),
            state.clone(),
            Box::new(ByteDecoder),
            Duration::from_millis(20),
        )
        .unwrap();

        let snapshot = wait_for(&state, |s| s.last_error.is_some());
        assert!(matches!(
            snapshot.last_error,
            Some(LastError {
                error: SensorError::StaleOrUnavailableReading { .. },
                reading_count: 1
            })
        ));
        // Stale data is flagged, not discarded.
        assert_eq!(snapshot.magnetometer, Vector3::new(5.0, 0.0, 0.0));
        reader.stop();
    }

    #[test]
    fn test_null_decoder_never_flags_stale() {
        let state = Arc::new(Mutex::new(DriverState::new()));
        let mut reader = BackgroundReader::spawn(
            "imu",
            Box::new(MockTransport::new(vec![vec![1, 2, 3]])),
            state.clone(),
            Box::new(NullDecoder),
            Duration::from_millis(1),
        )
        .unwrap();

        thread::sleep(Duration::from_millis(30));
        reader.stop();
        let snapshot = state::lock(&state).clone();
        assert_eq!(snapshot.reading_count, 0);
        assert!(snapshot.last_error.is_none());
    }
}
