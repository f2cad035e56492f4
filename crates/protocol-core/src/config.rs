//! Configuration for the session description layer
//!
//! Controls what a peer offers and how it logs. Loaded from TOML or JSON:
//!
//! ```toml
//! [candidates]
//! enable_audio = false
//! video_codecs = ["vp8"]
//! stream_version = 2
//!
//! [logging]
//! level = "debug"
//! json = false
//! file_info = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateSessionConfig;
use crate::channel::{ChannelConfig, ChannelRole, Codec, DEFAULT_STREAM_VERSION};
use crate::error::{ProtocolError, Result};
use crate::logging::{LoggingConfig, parse_log_level, setup_logging};

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// What to put in the outgoing offer
    pub candidates: CandidateOptions,
    /// Log output settings
    pub logging: LogOptions,
}

/// Options narrowing the default offer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateOptions {
    /// Offer an audio channel (a disabled audio channel is always offered)
    pub enable_audio: bool,
    /// Video codecs in preference order
    pub video_codecs: Vec<Codec>,
    /// Protocol version advertised on every stream channel
    pub stream_version: u32,
}

impl Default for CandidateOptions {
    fn default() -> Self {
        Self {
            enable_audio: true,
            video_codecs: vec![Codec::Vp8, Codec::Verbatim],
            stream_version: DEFAULT_STREAM_VERSION,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    pub level: String,
    pub json: bool,
    pub file_info: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_info: false,
        }
    }
}

impl ProtocolConfig {
    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ProtocolError::config(e.to_string()))
    }

    /// Parse a JSON document
    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| ProtocolError::config(e.to_string()))
    }

    /// Load configuration from a file, picking the format by extension
    /// (`.json`, otherwise TOML)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    /// Build the offer described by `[candidates]`.
    ///
    /// With default options this is exactly
    /// [`CandidateSessionConfig::create_default`].
    pub fn candidate_config(&self) -> Result<CandidateSessionConfig> {
        let options = &self.candidates;

        if options.stream_version == 0 {
            return Err(ProtocolError::config("stream_version must be positive"));
        }
        if options.video_codecs.is_empty() {
            return Err(ProtocolError::config("at least one video codec is required"));
        }
        if let Some(codec) = options
            .video_codecs
            .iter()
            .find(|codec| !codec.is_known() || **codec == Codec::Undefined)
        {
            return Err(ProtocolError::config(format!("unsupported video codec: {}", codec)));
        }

        let version = options.stream_version;
        let mut config = CandidateSessionConfig::create_empty();

        for role in [ChannelRole::Control, ChannelRole::Event] {
            config
                .configs_mut(role)
                .push(ChannelConfig::stream(version, Codec::Undefined));
        }

        config.video_configs_mut().extend(
            options
                .video_codecs
                .iter()
                .map(|codec| ChannelConfig::stream(version, codec.clone())),
        );

        if options.enable_audio {
            config
                .audio_configs_mut()
                .push(ChannelConfig::stream(version, Codec::Undefined));
        }
        config.audio_configs_mut().push(ChannelConfig::none());

        Ok(config)
    }

    /// Logging configuration described by `[logging]`
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        let level = parse_log_level(&self.logging.level)?;
        let mut config = LoggingConfig::new(level, "remoting");
        config.json = self.logging.json;
        config.file_info = self.logging.file_info;
        Ok(config)
    }

    /// Install the global log subscriber described by `[logging]`
    pub fn init_logging(&self) -> Result<()> {
        setup_logging(&self.logging_config()?)
    }
}
