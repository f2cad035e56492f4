//! Error types for session description handling
//!
//! Only structural problems surface as errors. Channel elements that cannot
//! be understood are skipped by the parser and never reach this type.

use thiserror::Error;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while building, parsing or configuring session descriptions
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The document is not well-formed XML
    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    /// The root element is not the expected session description element
    #[error("Unexpected root element: expected {expected}, found {found}")]
    UnexpectedRoot { expected: String, found: String },

    /// Writing an element tree failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration value or unreadable configuration document
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O failure while loading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Create a new malformed XML error
    pub fn malformed_xml(details: impl Into<String>) -> Self {
        Self::MalformedXml(details.into())
    }

    /// Create a new configuration error
    pub fn config(details: impl Into<String>) -> Self {
        Self::Config(details.into())
    }

    /// Whether the error came from the shape of a received document
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MalformedXml(_) | Self::UnexpectedRoot { .. })
    }
}
