//! Session Management
//!
//! A session is one create-to-finish lifecycle of a progress bar. The
//! [`SessionManager`] admits at most one at a time and bridges the driver's
//! calls to the [`Renderer`].
//!
//! # Design Philosophy
//!
//! The manager is a plain object the entry point owns and passes around;
//! there is no process-wide global. Both operations hold the same async lock
//! for their whole duration, so two creates can never both see an empty slot
//! and a create cannot slip in while a finish is still waiting.
//!
//! ```ignore
//! let manager = SessionManager::new(ShellbarConfig::default());
//!
//! manager.create_session("Copying files").await?;
//! copy_everything().await;
//! let summary = manager.finish_session("Copied").await?;
//!
//! // Chain the summary into the next bar
//! manager.create_session(&format!("{summary}\nIndexing")).await?;
//! ```

use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::ShellbarConfig;
use crate::error::{RenderError, SessionError};
use crate::renderer::Renderer;
use crate::screen::BoxedSink;

/// Produces the output sink for each new session
pub type SinkFactory = Box<dyn Fn() -> BoxedSink + Send + Sync>;

/// Single-session progress bar controller
pub struct SessionManager {
    slot: Mutex<Option<Renderer>>,
    config: ShellbarConfig,
    make_sink: SinkFactory,
}

impl SessionManager {
    /// Create a manager drawing to standard output
    #[must_use]
    pub fn new(config: ShellbarConfig) -> Self {
        Self::with_sink_factory(config, || Box::new(tokio::io::stdout()) as BoxedSink)
    }

    /// Create a manager drawing to sinks produced by `make_sink`
    #[must_use]
    pub fn with_sink_factory<F>(config: ShellbarConfig, make_sink: F) -> Self
    where
        F: Fn() -> BoxedSink + Send + Sync + 'static,
    {
        Self {
            slot: Mutex::new(None),
            config,
            make_sink: Box::new(make_sink),
        }
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &ShellbarConfig {
        &self.config
    }

    /// Whether a session currently occupies the slot
    pub async fn is_active(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Start a new progress bar with `message` as its header
    ///
    /// An empty message falls back to the configured default header. The
    /// animation begins immediately in the background.
    ///
    /// If the previous renderer died on its own (say the terminal went away),
    /// its failure is reported here once and the slot is cleared, so the next
    /// call starts a fresh bar.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyRunning`] if a live session exists
    /// - [`SessionError::Render`] with the failure of a renderer that died
    ///   before it was finished
    pub async fn create_session(&self, message: &str) -> Result<(), SessionError> {
        let mut slot = self.slot.lock().await;

        if slot.as_ref().is_some_and(|existing| !existing.is_finished()) {
            return Err(SessionError::AlreadyRunning);
        }
        if let Some(mut dead) = slot.take() {
            let err = match dead.await_result().await {
                Err(err) => err,
                Ok(_) => RenderError::TaskFailed(
                    "renderer exited without a stop request".to_string(),
                ),
            };
            warn!(error = %err, "Previous renderer terminated without finishing");
            return Err(err.into());
        }

        let text = if message.is_empty() {
            self.config.default_header.as_str()
        } else {
            message
        };
        let header = format!("{text}\n");

        let renderer = Renderer::start(header, (self.make_sink)(), self.config.render);
        *slot = Some(renderer);

        info!(header = %text.trim_end(), "Progress bar session started");
        Ok(())
    }

    /// Stop the active progress bar and return its completion text
    ///
    /// An empty message falls back to the configured default footer. Waits
    /// until the renderer has drawn its final frame (bounded by the configured
    /// finish timeout, if any). The slot is empty afterwards whether or not
    /// the renderer succeeded.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotRunning`] if no session is active
    /// - [`SessionError::Render`] if the renderer failed or timed out
    pub async fn finish_session(&self, message: &str) -> Result<String, SessionError> {
        let mut slot = self.slot.lock().await;
        let mut renderer = slot.take().ok_or(SessionError::NotRunning)?;

        let footer = if message.is_empty() {
            self.config.default_footer.as_str()
        } else {
            message
        };
        renderer.request_stop(footer);

        let outcome = match self.config.finish_timeout {
            Some(limit) => renderer.await_result_timeout(limit).await,
            None => renderer.await_result().await,
        };
        drop(slot);

        match outcome {
            Ok(result) => {
                info!("Progress bar session finished");
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "Progress bar session ended with a render failure");
                Err(err.into())
            }
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
