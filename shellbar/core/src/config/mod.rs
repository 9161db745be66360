//! TOML Configuration File Support
//!
//! Loads shellbar settings from `~/.config/shellbar/shellbar.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. TOML configuration file
//! 3. Default values
//!
//! The track width and glyphs are fixed and cannot be configured.
//!
//! # Example Configuration
//!
//! ```toml
//! [render]
//! tick_interval_ms = 100
//! hide_cursor = true
//!
//! [session]
//! default_header = "It's executing:\n"
//! default_footer = "Terminated:\n\n"
//! finish_timeout_ms = 0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default pause between two frames
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Longest tick interval accepted from configuration
pub const MAX_TICK_INTERVAL_MS: u64 = 10_000;

/// Header message used when a session is created without one
pub const DEFAULT_HEADER: &str = "It's executing:\n";

/// Footer used when a session is finished without one
pub const DEFAULT_FOOTER: &str = "Terminated:\n\n";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Render section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderToml {
    /// Milliseconds between two frames
    pub tick_interval_ms: Option<u64>,

    /// Hide the terminal cursor while animating
    pub hide_cursor: Option<bool>,
}

/// Session section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Header message used when none is given
    pub default_header: Option<String>,

    /// Footer used when none is given
    pub default_footer: Option<String>,

    /// Maximum time to wait for the renderer on finish (0 = forever)
    pub finish_timeout_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellbarToml {
    /// Render configuration section
    pub render: RenderToml,

    /// Session configuration section
    pub session: SessionToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Settings the render loop itself needs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Pause between two frames
    pub tick_interval: Duration,

    /// Hide the cursor while animating
    pub hide_cursor: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            hide_cursor: true,
        }
    }
}

/// Resolved shellbar configuration
///
/// Use [`load_config`] to build one with proper priority handling.
#[derive(Clone, Debug)]
pub struct ShellbarConfig {
    /// Render loop settings
    pub render: RenderOptions,

    /// Header message used when a session is created without one
    pub default_header: String,

    /// Footer used when a session is finished without one
    pub default_footer: String,

    /// Upper bound on waiting for the renderer (`None` waits forever)
    pub finish_timeout: Option<Duration>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    source: ConfigSource,
}

impl Default for ShellbarConfig {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            default_header: DEFAULT_HEADER.to_string(),
            default_footer: DEFAULT_FOOTER.to_string(),
            finish_timeout: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ShellbarConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the tick interval
    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.render.tick_interval = interval;
        self
    }

    /// Set the finish timeout
    #[must_use]
    pub fn with_finish_timeout(mut self, timeout: Duration) -> Self {
        self.finish_timeout = Some(timeout);
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a zero or oversized tick.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tick_ms = self.render.tick_interval.as_millis();
        if tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if tick_ms > u128::from(MAX_TICK_INTERVAL_MS) {
            return Err(ConfigError::ValidationError(format!(
                "tick_interval_ms must be at most {MAX_TICK_INTERVAL_MS}, got {tick_ms}"
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/shellbar/shellbar.toml` or
/// `~/.config/shellbar/shellbar.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("shellbar").join("shellbar.toml"))
}

/// Load configuration from the default path
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<ShellbarConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ShellbarConfig, ConfigError> {
    let mut config = ShellbarConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ShellbarToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ShellbarConfig, toml: &ShellbarToml) {
    if let Some(ms) = toml.render.tick_interval_ms {
        config.render.tick_interval = Duration::from_millis(ms);
    }
    if let Some(hide) = toml.render.hide_cursor {
        config.render.hide_cursor = hide;
    }

    if let Some(ref header) = toml.session.default_header {
        config.default_header.clone_from(header);
    }
    if let Some(ref footer) = toml.session.default_footer {
        config.default_footer.clone_from(footer);
    }
    if let Some(ms) = toml.session.finish_timeout_ms {
        config.finish_timeout = (ms > 0).then(|| Duration::from_millis(ms));
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Tick interval override (milliseconds)
    pub tick_interval_ms: Option<u64>,

    /// Cursor hiding override
    pub hide_cursor: Option<bool>,

    /// Finish timeout override (milliseconds, 0 = forever)
    pub finish_timeout_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set tick interval override
    #[must_use]
    pub fn with_tick_interval_ms(mut self, ms: u64) -> Self {
        self.tick_interval_ms = Some(ms);
        self
    }

    /// Set cursor hiding override
    #[must_use]
    pub fn with_hide_cursor(mut self, hide: bool) -> Self {
        self.hide_cursor = Some(hide);
        self
    }

    /// Set finish timeout override
    #[must_use]
    pub fn with_finish_timeout_ms(mut self, ms: u64) -> Self {
        self.finish_timeout_ms = Some(ms);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if an override is out of range.
    pub fn apply(&self, config: &mut ShellbarConfig) -> Result<(), ConfigError> {
        if self.tick_interval_ms.is_some()
            || self.hide_cursor.is_some()
            || self.finish_timeout_ms.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ms) = self.tick_interval_ms {
            config.render.tick_interval = Duration::from_millis(ms);
        }
        if let Some(hide) = self.hide_cursor {
            config.render.hide_cursor = hide;
        }
        if let Some(ms) = self.finish_timeout_ms {
            config.finish_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
