//! Scripted transports for exercising the driver without hardware.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use super::{PortOpener, SerialSettings, Transport};

/// How long a mock read blocks before reporting a timeout.
const MOCK_READ_TIMEOUT: Duration = Duration::from_millis(2);

/// Byte stream that replays scripted chunks, then times out (or fails).
pub struct MockTransport {
    chunks: VecDeque<Vec<u8>>,
    read_error: Option<io::ErrorKind>,
    written: Arc<Mutex<Vec<u8>>>,
    closed: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            read_error: None,
            written: Arc::default(),
            closed: Arc::default(),
        }
    }

    /// Fail with `kind` once the scripted chunks are exhausted.
    pub fn with_read_error(mut self, kind: io::ErrorKind) -> Self {
        self.read_error = Some(kind);
        self
    }

    /// Flag that becomes true when the transport is dropped.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }

    /// Bytes written so far.
    pub fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        self.written.clone()
    }
}

impl Read for MockTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(mut chunk) = self.chunks.pop_front() {
            let n = chunk.len().min(buf.len());
            buf[..n].copy_from_slice(&chunk[..n]);
            if n < chunk.len() {
                self.chunks.push_front(chunk.split_off(n));
            }
            return Ok(n);
        }

        if let Some(kind) = self.read_error.take() {
            return Err(io::Error::new(kind, "mock read failure"));
        }

        thread::sleep(MOCK_READ_TIMEOUT);
        Err(io::Error::new(io::ErrorKind::TimedOut, "mock read timeout"))
    }
}

impl Write for MockTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// [`PortOpener`] that hands out [`MockTransport`]s or a scripted open failure.
///
/// Every transport it opens shares one closed flag and one open counter, so a
/// test can check that the driver released the port.
#[derive(Default)]
pub struct MockPortOpener {
    chunks: Vec<Vec<u8>>,
    read_error: Option<io::ErrorKind>,
    open_error: Option<io::ErrorKind>,
    opened: Mutex<Vec<SerialSettings>>,
    open_count: Arc<AtomicUsize>,
    closed_count: Arc<AtomicUsize>,
}

impl MockPortOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes each opened transport will return, one chunk per read.
    pub fn with_chunks(mut self, chunks: Vec<Vec<u8>>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Make each opened transport fail reads with `kind` after its chunks.
    pub fn with_read_error(mut self, kind: io::ErrorKind) -> Self {
        self.read_error = Some(kind);
        self
    }

    /// Make `open` fail with `kind`.
    pub fn failing(kind: io::ErrorKind) -> Self {
        Self {
            open_error: Some(kind),
            ..Self::default()
        }
    }

    /// Settings passed to every `open` call, including failed ones.
    pub fn opened(&self) -> Vec<SerialSettings> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of transports currently open.
    pub fn open_transports(&self) -> usize {
        self.open_count.load(Ordering::SeqCst) - self.closed_count.load(Ordering::SeqCst)
    }
}

/// Wrapper that counts drops for [`MockPortOpener::open_transports`].
struct CountedTransport {
    inner: MockTransport,
    closed_count: Arc<AtomicUsize>,
}

impl Read for CountedTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for CountedTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl Drop for CountedTransport {
    fn drop(&mut self) {
        self.closed_count.fetch_add(1, Ordering::SeqCst);
    }
}

impl PortOpener for MockPortOpener {
    fn open(&self, settings: &SerialSettings) -> io::Result<Box<dyn Transport>> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(settings.clone());

        if let Some(kind) = self.open_error {
            return Err(io::Error::new(kind, "mock open failure"));
        }

        let mut inner = MockTransport::new(self.chunks.clone());
        inner.read_error = self.read_error;
        self.open_count.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountedTransport {
            inner,
            closed_count: self.closed_count.clone(),
        }))
    }
}
