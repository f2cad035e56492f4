//! Log output for hosts and clients embedding the protocol layer.
//!
//! Everything in this crate logs through `tracing`; this module only
//! installs a `tracing-subscriber` formatter. `RUST_LOG` takes precedence
//! over the configured level.

use std::str::FromStr;

use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::{ProtocolError, Result};

/// How log records are filtered and formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Level used when `RUST_LOG` is unset
    pub level: Level,
    /// One JSON object per record on stdout
    pub json: bool,
    /// Include source file and line
    pub file_info: bool,
    /// Name reported in the startup record
    pub app_name: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(Level::INFO, "remoting")
    }
}

impl LoggingConfig {
    pub fn new(level: Level, app_name: impl Into<String>) -> Self {
        Self {
            level,
            json: false,
            file_info: false,
            app_name: app_name.into(),
        }
    }

    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(self.level).into())
            .from_env_lossy()
    }
}

/// Install `config` as the global subscriber.
///
/// Only one subscriber can be installed per process; later calls return
/// [`ProtocolError::Config`].
pub fn setup_logging(config: &LoggingConfig) -> Result<()> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(config.env_filter())
        .with_file(config.file_info)
        .with_line_number(config.file_info);

    let installed = if config.json {
        builder.with_writer(std::io::stdout).json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| ProtocolError::config(format!("logger already installed: {}", e)))?;

    tracing::info!(app = %config.app_name, version = crate::VERSION, "Logging initialised");
    Ok(())
}

/// Parse a level name such as `"debug"` (case-insensitive)
pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|_| ProtocolError::config(format!("unknown log level '{}'", level)))
}
