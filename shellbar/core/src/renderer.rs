//! Background Renderer
//!
//! The renderer owns the animation loop and the only mutable progress state.
//! It runs as its own tokio task; the driver talks to it through three calls:
//!
//! - [`Renderer::start`] spawns the loop
//! - [`Renderer::request_stop`] flips `running` off and stores the footer
//! - [`Renderer::await_result`] waits for the completion string
//!
//! # Handshake
//!
//! ```text
//!  driver                         render task
//!    |  start(header) ------------> clear + header
//!    |                              loop: frame, tick, frame, tick ...
//!    |  request_stop(footer) -----> running = false (wakes the tick wait)
//!    |  await_result() ...          completion frame + footer
//!    |  <----------- oneshot ------ publish result
//!    |  <----------- join --------- release screen
//! ```
//!
//! `running`, `position` and `footer` are only touched under one lock. The
//! result travels over a oneshot channel, written once by the task. If the
//! task dies before publishing, `await_result` reports the task's failure
//! instead of waiting forever.
//!
//! Cancellation (timeout, drop) is cooperative: the loop is woken, skips the
//! completion frame and still restores the terminal before exiting.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::config::RenderOptions;
use crate::error::RenderError;
use crate::frame::{Frame, TRACK_WIDTH};
use crate::screen::{BoxedSink, Screen};

/// Progress state shared by the driver and the render loop
#[derive(Debug)]
struct RenderState {
    running: bool,
    /// Set when the handle gives up on the result; no completion frame is drawn
    cancelled: bool,
    /// Filled slots of the frame drawn last, in `0..=TRACK_WIDTH`
    position: usize,
    footer: String,
}

impl RenderState {
    fn new() -> Self {
        Self {
            running: true,
            cancelled: false,
            position: 0,
            footer: String::new(),
        }
    }

    /// Move one tick forward and return the frame to draw
    ///
    /// A full track stays visible for one whole tick; the tick after that
    /// draws an empty track and the count starts over.
    fn advance(&mut self) -> Frame {
        if self.position >= TRACK_WIDTH {
            self.position = 0;
            Frame::empty()
        } else {
            self.position += 1;
            Frame::at(self.position)
        }
    }
}

struct Shared {
    header: String,
    state: Mutex<RenderState>,
    stop: Notify,
}

/// Handle to a running progress bar animation
pub struct Renderer {
    shared: Arc<Shared>,
    result: Option<oneshot::Receiver<String>>,
    published: Option<String>,
    task: Option<JoinHandle<Result<(), RenderError>>>,
}

impl Renderer {
    /// Spawn the render loop
    ///
    /// `header` is printed verbatim above the track on every frame. Must be
    /// called from within a tokio runtime.
    pub fn start(header: impl Into<String>, sink: BoxedSink, options: RenderOptions) -> Self {
        let shared = Arc::new(Shared {
            header: header.into(),
            state: Mutex::new(RenderState::new()),
            stop: Notify::new(),
        });
        let (result_tx, result_rx) = oneshot::channel();
        let screen = Screen::new(sink, options.hide_cursor);

        debug!(
            tick_interval = ?options.tick_interval,
            hide_cursor = options.hide_cursor,
            "Starting render loop"
        );
        let task = tokio::spawn(run(
            Arc::clone(&shared),
            screen,
            options.tick_interval,
            result_tx,
        ));

        Self {
            shared,
            result: Some(result_rx),
            published: None,
            task: Some(task),
        }
    }

    /// Header printed above the track
    #[must_use]
    pub fn header(&self) -> &str {
        &self.shared.header
    }

    /// Filled slots of the most recent frame
    #[must_use]
    pub fn position(&self) -> usize {
        self.shared.state.lock().position
    }

    /// Whether no stop has been requested yet
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Whether the render task has terminated (cleanly or not)
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Ask the loop to stop and finish with `footer`
    ///
    /// Returns immediately. Only the first call has any effect; it returns
    /// `true`, every later call returns `false` and keeps the first footer.
    pub fn request_stop(&self, footer: impl Into<String>) -> bool {
        let accepted = {
            let mut state = self.shared.state.lock();
            if state.running {
                state.running = false;
                state.footer = footer.into();
                true
            } else {
                false
            }
        };

        if accepted {
            self.shared.stop.notify_one();
            debug!("Stop requested");
        } else {
            debug!("Stop already requested, ignoring");
        }
        accepted
    }

    /// Wait for the completion string
    ///
    /// Resolves once the loop has drawn its completion frame, published the
    /// result and released the screen. The result is
    /// `header + completion frame + "\n" + footer`.
    ///
    /// Cancel safe: dropping the future early keeps the result available for
    /// the next call.
    ///
    /// # Errors
    ///
    /// - the render task's own error if it failed before or after publishing
    /// - [`RenderError::ResultConsumed`] if the result was already returned
    pub async fn await_result(&mut self) -> Result<String, RenderError> {
        if let Some(rx) = self.result.as_mut() {
            let published = rx.await;
            self.result = None;
            self.published = published.ok();
        } else if self.published.is_none() && self.task.is_none() {
            return Err(RenderError::ResultConsumed);
        }

        self.join().await?;
        self.published.take().ok_or_else(|| {
            RenderError::TaskFailed("renderer exited without publishing a result".to_string())
        })
    }

    /// [`await_result`](Self::await_result) with an upper bound
    ///
    /// On expiry the render task is cancelled and given the same bound again
    /// to restore the terminal. Only a task stuck in a write past that is
    /// aborted outright.
    ///
    /// # Errors
    ///
    /// [`RenderError::TimedOut`] on expiry, otherwise as `await_result`.
    pub async fn await_result_timeout(&mut self, limit: Duration) -> Result<String, RenderError> {
        if let Ok(result) = tokio::time::timeout(limit, self.await_result()).await {
            return result;
        }

        self.cancel();
        self.result = None;
        if let Some(task) = self.task.as_mut() {
            if tokio::time::timeout(limit, &mut *task).await.is_err() {
                warn!("Render task ignored cancellation, aborting it");
                task.abort();
            }
        }
        self.task = None;
        Err(RenderError::TimedOut(limit))
    }

    /// Stop the render loop without drawing a completion frame
    ///
    /// Returns immediately. The task still releases the screen before it
    /// exits; no result is published.
    pub fn cancel(&self) {
        {
            let mut state = self.shared.state.lock();
            state.cancelled = true;
            state.running = false;
        }
        self.shared.stop.notify_one();
    }

    async fn join(&mut self) -> Result<(), RenderError> {
        if let Some(task) = self.task.as_mut() {
            let outcome = task.await;
            self.task = None;
            outcome??;
        }
        Ok(())
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            if !task.is_finished() {
                debug!("Renderer dropped while running, cancelling render task");
                self.cancel();
            }
        }
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("header", &self.shared.header)
            .field("state", &*self.shared.state.lock())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Body of the render task
///
/// The screen is released on every exit path. The loop's own error wins
/// over a release error.
async fn run(
    shared: Arc<Shared>,
    mut screen: Screen,
    tick: Duration,
    result_tx: oneshot::Sender<String>,
) -> Result<(), RenderError> {
    let outcome = match animate(&shared, &mut screen, tick).await {
        Ok(()) => conclude(&shared, &mut screen, result_tx).await,
        Err(err) => Err(err),
    };
    let released = screen.release().await;

    match outcome {
        Ok(()) => {
            debug!("Render loop finished");
            released
        }
        Err(RenderError::Cancelled) => {
            debug!("Render loop cancelled");
            released.and(Err(RenderError::Cancelled))
        }
        Err(err) => {
            error!(error = %err, "Render loop aborted");
            Err(err)
        }
    }
}

async fn animate(shared: &Shared, screen: &mut Screen, tick: Duration) -> Result<(), RenderError> {
    screen.redraw(&shared.header, "").await?;

    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        let frame = {
            let mut state = shared.state.lock();
            if state.cancelled {
                return Err(RenderError::Cancelled);
            }
            if !state.running {
                break;
            }
            state.advance()
        };
        if frame == Frame::empty() {
            debug!("Track full, wrapping around");
        }

        screen.redraw(&shared.header, &format!("{frame}\n")).await?;

        tokio::select! {
            _ = ticker.tick() => {}
            () = shared.stop.notified() => {}
        }
    }
    Ok(())
}

async fn conclude(
    shared: &Shared,
    screen: &mut Screen,
    result_tx: oneshot::Sender<String>,
) -> Result<(), RenderError> {
    let footer = {
        let mut state = shared.state.lock();
        state.position = TRACK_WIDTH;
        state.footer.clone()
    };
    let frame = Frame::complete();

    screen
        .redraw(&shared.header, &format!("{frame}\n{footer}\n"))
        .await?;
    screen.write("\n").await?;

    let result = format!("{}{frame}\n{footer}", shared.header);
    if result_tx.send(result).is_err() {
        debug!("Result receiver gone before completion");
    }
    Ok(())
}
