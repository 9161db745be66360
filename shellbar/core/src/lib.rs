//! Shellbar Core - Background-Rendered Terminal Progress Bar
//!
//! Draws an animated progress bar while the caller does some long-running
//! work, then finishes it on request and hands back a summary string.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   create / finish    ┌──────────────────┐
//! │    Driver    │ ───────────────────▶ │  SessionManager  │
//! │ (your code)  │ ◀─────────────────── │   (one slot)     │
//! └──────────────┘   completion text    └────────┬─────────┘
//!                                                │ start / request_stop
//!                                                │ await_result
//!                                       ┌────────▼─────────┐
//!                                       │     Renderer     │
//!                                       │  (tokio task)    │
//!                                       └────────┬─────────┘
//!                                                │ clear + header + frame
//!                                       ┌────────▼─────────┐
//!                                       │      Screen      │
//!                                       │ (terminal sink)  │
//!                                       └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use shellbar_core::{SessionManager, ShellbarConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manager = SessionManager::new(ShellbarConfig::default());
//!
//!     manager.create_session("Downloading").await?;
//!     download().await;
//!     let summary = manager.finish_session("Downloaded").await?;
//!
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`frame`]: track layout, glyphs and percent labels
//! - [`screen`]: terminal sink with full-screen redraws
//! - [`renderer`]: the animation loop and completion handshake
//! - [`session`]: single-session controller
//! - [`config`]: TOML configuration and CLI overrides
//! - [`error`]: session and render error types
//! - [`test_utils`]: in-memory sinks for tests

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod frame;
pub mod renderer;
pub mod screen;
pub mod session;
pub mod test_utils;

pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, RenderOptions, ShellbarConfig, ShellbarToml,
};
pub use error::{RenderError, SessionError};
pub use frame::{Frame, TRACK_WIDTH};
pub use renderer::Renderer;
pub use screen::{BoxedSink, Screen};
pub use session::{SessionManager, SinkFactory};
