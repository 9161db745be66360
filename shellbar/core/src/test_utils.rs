//! Test Utilities
//!
//! In-memory sinks for exercising renderers without a terminal.
//!
//! # Usage
//!
//! ```ignore
//! use shellbar_core::test_utils::CaptureSink;
//!
//! let sink = CaptureSink::new();
//! let manager = SessionManager::with_sink_factory(config, sink.factory());
//!
//! manager.create_session("Loading").await?;
//! sink.wait_for("] 2.0%").await;
//! ```

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::io::AsyncWrite;
use tokio::sync::Notify;

use crate::screen::BoxedSink;

/// Sink that records everything written to it
///
/// Clones share the same buffer, so a test can keep one handle while the
/// renderer owns another.
#[derive(Clone, Default)]
pub struct CaptureSink {
    bytes: Arc<Mutex<Vec<u8>>>,
    written: Arc<Notify>,
}

impl CaptureSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes.lock()).into_owned()
    }

    /// Number of times `needle` occurs in the output
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.contents().matches(needle).count()
    }

    /// Wait until the output contains `needle`
    ///
    /// Never returns if the text never shows up; wrap it in a timeout.
    pub async fn wait_for(&self, needle: &str) {
        self.wait_until(|output| output.contains(needle)).await;
    }

    /// Wait until `check` accepts the output written so far
    ///
    /// Re-checks after every write. Never returns if `check` never passes.
    pub async fn wait_until<F>(&self, check: F)
    where
        F: Fn(&str) -> bool,
    {
        loop {
            let notified = self.written.notified();
            if check(&self.contents()) {
                return;
            }
            notified.await;
        }
    }

    /// Factory handing out clones of this sink, one per session
    #[must_use]
    pub fn factory(&self) -> impl Fn() -> BoxedSink + Send + Sync + 'static {
        let sink = self.clone();
        move || Box::new(sink.clone()) as BoxedSink
    }
}

impl AsyncWrite for CaptureSink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.bytes.lock().extend_from_slice(buf);
        self.written.notify_waiters();
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Sink that accepts a fixed number of writes and then fails
#[derive(Debug)]
pub struct FailingSink {
    remaining: usize,
}

impl FailingSink {
    /// Fail every write after the first `writes` succeed
    #[must_use]
    pub fn after(writes: usize) -> Self {
        Self { remaining: writes }
    }
}

impl AsyncWrite for FailingSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.remaining == 0 {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "terminal went away",
            )));
        }
        self.remaining -= 1;
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
