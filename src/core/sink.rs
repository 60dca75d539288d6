//! Output sinks and the injectable adapter that feeds them.
//!
//! An [`OutputSink`] is the test runner's per-test output channel. The
//! [`InjectableSink`] adapter is constructed first and bound to a sink
//! afterwards; the logging pipeline writes formatted bytes to the adapter,
//! which splits them into lines and forwards each complete line.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

use crate::error::{FixtureError, Result};

/// A per-test channel that receives formatted log lines.
pub trait OutputSink: Send + Sync + fmt::Debug {
    /// Receive one line, without its trailing newline.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Whether the sink can still receive lines.
    fn is_open(&self) -> bool {
        true
    }

    /// Release the sink. Called at most once by the adapter.
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Built-in sinks
// =============================================================================

/// Writes lines with `println!`, which libtest captures per test and only
/// shows for failing tests (or with `--nocapture`).
#[derive(Debug, Default, Clone, Copy)]
pub struct TestOutput;

impl OutputSink for TestOutput {
    fn write_line(&self, line: &str) -> io::Result<()> {
        println!("{line}");
        Ok(())
    }
}

/// In-memory sink for asserting on log output.
#[derive(Debug, Default)]
pub struct CapturedOutput {
    lines: Mutex<Vec<String>>,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl CapturedOutput {
    /// Create an empty, open capture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a capture that reports itself closed; binding to it fails.
    #[must_use]
    pub fn closed() -> Self {
        let capture = Self::default();
        capture.closed.store(true, Ordering::SeqCst);
        capture
    }

    /// All captured lines in arrival order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of captured lines containing `needle`.
    #[must_use]
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    /// Whether any captured line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.count_containing(needle) > 0
    }

    /// How many times [`OutputSink::close`] was called.
    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Assert a line was captured containing the given substring.
    ///
    /// # Panics
    ///
    /// Panics with the captured lines if no line matches.
    pub fn assert_logged(&self, needle: &str) {
        let lines = self.lines();
        assert!(
            lines.iter().any(|line| line.contains(needle)),
            "Expected output containing '{needle}'. Captured: {lines:#?}"
        );
    }

    /// Assert no captured line contains the given substring.
    ///
    /// # Panics
    ///
    /// Panics with the offending lines if any line matches.
    pub fn assert_not_logged(&self, needle: &str) {
        let lines = self.lines();
        let hits: Vec<_> = lines.iter().filter(|line| line.contains(needle)).collect();
        assert!(
            hits.is_empty(),
            "Unexpected output containing '{needle}': {hits:#?}"
        );
    }
}

impl OutputSink for CapturedOutput {
    fn write_line(&self, line: &str) -> io::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "captured output is closed",
            ));
        }
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    fn close(&self) -> io::Result<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// Injectable adapter
// =============================================================================

/// Adapter between the formatting pipeline and a late-bound output sink.
///
/// States: unbound, bound, released. Binding is single-shot and release
/// happens at most once.
#[derive(Default)]
pub struct InjectableSink {
    target: OnceLock<Arc<dyn OutputSink>>,
    pending: Mutex<Vec<u8>>,
    released: AtomicBool,
}

impl InjectableSink {
    /// Create an unbound adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the adapter to the test's output sink.
    ///
    /// Fails if the sink is closed or the adapter is already bound.
    pub fn inject(&self, sink: Arc<dyn OutputSink>) -> Result<()> {
        if !sink.is_open() {
            return Err(FixtureError::InvalidSink {
                reason: format!("{sink:?} is closed"),
            });
        }
        self.target
            .set(sink)
            .map_err(|_| FixtureError::SinkAlreadyBound)
    }

    /// Whether a sink has been injected.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.target.get().is_some()
    }

    /// Whether [`InjectableSink::dispose`] has run.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Writer handle for the formatting layer.
    #[must_use]
    pub fn writer(self: &Arc<Self>) -> AdapterWriter {
        AdapterWriter {
            adapter: Arc::clone(self),
        }
    }

    /// Accept formatted bytes, forwarding every complete line.
    fn accept(&self, buf: &[u8]) -> io::Result<()> {
        if self.is_released() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "output adapter has been released",
            ));
        }
        let Some(target) = self.target.get() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "output adapter is not bound to a sink",
            ));
        };

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.extend_from_slice(buf);
        while let Some(newline) = pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = pending.drain(..=newline).collect();
            let text = String::from_utf8_lossy(&line[..newline]);
            target.write_line(text.trim_end_matches('\r'))?;
        }
        Ok(())
    }

    fn flush_and_close(&self) -> Result<()> {
        let Some(target) = self.target.get() else {
            return Ok(());
        };

        let rest = std::mem::take(&mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner));
        let flushed = if rest.is_empty() {
            Ok(())
        } else {
            target.write_line(&String::from_utf8_lossy(&rest))
        };
        let closed = target.close();

        flushed?;
        closed?;
        Ok(())
    }

    /// Flush any buffered partial line and close the sink.
    ///
    /// Inside a Tokio runtime the release runs on the blocking pool; under
    /// any other executor it runs inline. Calls after the first are no-ops.
    pub async fn dispose(self: &Arc<Self>) -> Result<()> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return self.flush_and_close();
        };
        let adapter = Arc::clone(self);
        handle
            .spawn_blocking(move || adapter.flush_and_close())
            .await
            .map_err(|e| FixtureError::Io(format!("output adapter release task failed: {e}")))?
    }
}

impl fmt::Debug for InjectableSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectableSink")
            .field("bound", &self.is_bound())
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

/// `io::Write` handle over an [`InjectableSink`], handed to `tracing-subscriber`.
#[derive(Debug, Clone)]
pub struct AdapterWriter {
    adapter: Arc<InjectableSink>,
}

impl io::Write for AdapterWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.adapter.accept(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for AdapterWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
