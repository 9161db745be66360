//! Terminal Screen
//!
//! Owns the output sink of one render session. Every redraw clears the whole
//! screen with an ANSI control sequence and reprints everything; there is no
//! partial-line diffing.

use std::fmt;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::terminal::{Clear, ClearType};
use crossterm::Command;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::RenderError;

/// Output sink a renderer draws into
pub type BoxedSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Encode "clear entire screen" followed by "cursor to top-left"
///
/// # Errors
///
/// Only fails if the underlying formatter fails.
pub fn clear_sequence() -> Result<String, fmt::Error> {
    let mut seq = String::new();
    Clear(ClearType::All).write_ansi(&mut seq)?;
    MoveTo(0, 0).write_ansi(&mut seq)?;
    Ok(seq)
}

/// Screen state for one session
pub struct Screen {
    sink: BoxedSink,
    /// Scratch buffer the next write is assembled in
    buffer: String,
    /// Cached clear sequence (encoded on first redraw)
    clear: String,
    hide_cursor: bool,
    cursor_hidden: bool,
    released: bool,
}

impl Screen {
    /// Wrap a sink
    pub fn new(sink: BoxedSink, hide_cursor: bool) -> Self {
        Self {
            sink,
            buffer: String::new(),
            clear: String::new(),
            hide_cursor,
            cursor_hidden: false,
            released: false,
        }
    }

    /// Clear the screen, then print `header` followed by `body`
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the sink rejects the write.
    pub async fn redraw(&mut self, header: &str, body: &str) -> Result<(), RenderError> {
        if self.clear.is_empty() {
            self.clear = clear_sequence()?;
        }

        self.buffer.clear();
        if self.hide_cursor && !self.cursor_hidden {
            Hide.write_ansi(&mut self.buffer)?;
            self.cursor_hidden = true;
        }
        self.buffer.push_str(&self.clear);
        self.buffer.push_str(header);
        self.buffer.push_str(body);

        self.sink.write_all(self.buffer.as_bytes()).await?;
        self.sink.flush().await?;
        Ok(())
    }

    /// Append text without clearing
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the sink rejects the write.
    pub async fn write(&mut self, text: &str) -> Result<(), RenderError> {
        self.sink.write_all(text.as_bytes()).await?;
        self.sink.flush().await?;
        Ok(())
    }

    /// Restore the cursor and drop the frame buffers
    ///
    /// Safe to call more than once; only the first call touches the sink.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if restoring the cursor fails. The buffers
    /// are released either way.
    pub async fn release(&mut self) -> Result<(), RenderError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.buffer = String::new();
        self.clear = String::new();

        if self.cursor_hidden {
            self.cursor_hidden = false;
            let mut show = String::new();
            Show.write_ansi(&mut show)?;
            self.sink.write_all(show.as_bytes()).await?;
        }
        self.sink.flush().await?;
        Ok(())
    }

    /// Whether [`release`](Self::release) has run
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }
}
