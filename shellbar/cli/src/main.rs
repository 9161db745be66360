//! Shellbar - Interactive Progress Bar Smoke Test
//!
//! Starts a progress bar, waits for one line of input, then finishes the bar
//! and exits. Useful for eyeballing the animation in a real terminal.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults, press Enter to finish
//! shellbar
//!
//! # Custom messages and a faster tick
//! shellbar --message "Building" --finish-message "Built" --tick-ms 30
//!
//! # With config file
//! shellbar --config ~/.config/shellbar/shellbar.toml
//!
//! # Verbose logging (goes to stderr)
//! RUST_LOG=debug shellbar 2>shellbar.log
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use shellbar_core::{
    default_config_path, load_config_from_path, ConfigOverrides, SessionManager, ShellbarConfig,
};

/// Footer used when the bar is interrupted with Ctrl-C
const INTERRUPTED_FOOTER: &str = "Interrupted";

/// Shellbar - terminal progress bar smoke test
#[derive(Parser, Debug)]
#[command(name = "shellbar")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Header printed above the bar
    #[arg(short = 'm', long, default_value = "Execute test")]
    message: String,

    /// Footer printed once the bar finishes
    #[arg(short = 'f', long, default_value = "Finished test")]
    finish_message: String,

    /// Milliseconds between frames
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so they never interleave with the bar on stdout.
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("shellbar={level},shellbar_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(())
}

/// Resolve configuration from file and flags
fn resolve_config(args: &Args) -> Result<ShellbarConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ms) = args.tick_ms {
        overrides = overrides.with_tick_interval_ms(ms);
    }
    overrides
        .apply(&mut config)
        .context("Invalid command-line option")?;

    info!(
        source = %config.source(),
        tick_interval = ?config.render.tick_interval,
        "Configuration resolved"
    );
    Ok(config)
}

/// Print the input prompt
async fn prompt() -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"> ").await?;
    stdout.flush().await
}

/// Wait for a line of input or Ctrl-C and pick the footer
async fn wait_for_input(args: &Args) -> Result<&str> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tokio::select! {
        line = lines.next_line() => {
            let line = line.context("Failed to read input")?;
            debug!(eof = line.is_none(), "Input received, finishing");
            Ok(args.finish_message.as_str())
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Received Ctrl-C, finishing early");
            Ok(INTERRUPTED_FOOTER)
        }
    }
}

/// Run one progress bar session driven by stdin
///
/// Once the bar is up it is always finished, even when reading input fails,
/// so the terminal is restored before any error is reported.
async fn run(manager: &SessionManager, args: &Args) -> Result<()> {
    manager
        .create_session(&args.message)
        .await
        .context("Failed to start progress bar")?;

    let input = match prompt().await {
        Ok(()) => wait_for_input(args).await,
        Err(e) => Err(anyhow::Error::new(e).context("Failed to write prompt")),
    };

    let footer = input.as_ref().map_or(INTERRUPTED_FOOTER, |footer| *footer);
    let summary = manager
        .finish_session(footer)
        .await
        .context("Progress bar failed")?;
    debug!(summary_bytes = summary.len(), "Session summary published");

    input.map(|_| ())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = resolve_config(&args)?;
    let manager = SessionManager::new(config);

    run(&manager, &args).await
}
