//! Error Types
//!
//! Two layers of failure exist and they are kept apart:
//!
//! - [`SessionError`]: misuse of the session controller (creating twice,
//!   finishing when idle). These are recoverable and returned directly.
//! - [`RenderError`]: failures inside the render task. These end the session
//!   and travel through the task's own result channel.

use std::time::Duration;

use thiserror::Error;

/// Failures of the background render task
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing to the terminal sink failed
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),

    /// A terminal control sequence could not be encoded
    #[error("failed to encode terminal control sequence")]
    Format(#[from] std::fmt::Error),

    /// The render loop was cancelled before a stop request arrived
    #[error("render loop was cancelled")]
    Cancelled,

    /// The render task panicked or was cancelled before finishing
    #[error("render task terminated abnormally: {0}")]
    TaskFailed(String),

    /// The renderer did not publish its result within the allowed time
    #[error("renderer did not finish within {0:?}")]
    TimedOut(Duration),

    /// The result of this renderer was already taken
    #[error("render result was already consumed")]
    ResultConsumed,
}

impl From<tokio::task::JoinError> for RenderError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            Self::TaskFailed("cancelled".to_string())
        } else {
            Self::TaskFailed(format!("panicked: {err}"))
        }
    }
}

/// Errors returned by the [`SessionManager`](crate::session::SessionManager)
#[derive(Debug, Error)]
pub enum SessionError {
    /// A progress bar session is already active
    #[error("a progress bar session is already running")]
    AlreadyRunning,

    /// No progress bar session is active
    #[error("no progress bar session is running")]
    NotRunning,

    /// The renderer failed; the session has been torn down
    #[error("progress bar renderer failed: {0}")]
    Render(#[from] RenderError),
}

impl SessionError {
    /// Whether the caller may simply retry with a different call sequence
    #[must_use]
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::NotRunning)
    }
}
