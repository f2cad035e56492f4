//! # remoting-protocol-core
//!
//! Session description and channel negotiation for remote desktop
//! connections.
//!
//! When a connection is set up each peer sends a session description: the
//! channel configurations it accepts for each channel role (control, event,
//! video, audio), in preference order, together with the current message of
//! the authentication handshake. The receiving peer parses the description,
//! tolerating options it does not know, and picks one configuration per role.
//!
//! ## Overview
//!
//! - [`ChannelConfig`]: one acceptable transport/version/codec combination
//! - [`CandidateSessionConfig`]: per-role ordered lists of channel configs,
//!   plus negotiation helpers producing a [`SessionConfig`]
//! - [`ContentDescription`]: an offer plus an [`AuthenticatorMessage`],
//!   serialized to and parsed from XML
//! - [`xml`]: the element tree the description is built on
//! - [`config`] and [`logging`]: configuration loading and log setup
//!
//! ## Quick start
//!
//! ```rust
//! use remoting_protocol_core::{AuthenticatorMessage, CandidateSessionConfig, ContentDescription};
//!
//! let offer = ContentDescription::new(
//!     CandidateSessionConfig::create_default(),
//!     Some(AuthenticatorMessage::empty()),
//! );
//! let wire = offer.to_xml_string()?;
//!
//! let received = ContentDescription::parse_str(&wire)?;
//! assert_eq!(received.config(), offer.config());
//!
//! let session = CandidateSessionConfig::create_default()
//!     .select(received.config())
//!     .expect("default offers are compatible");
//! assert!(session.is_audio_enabled());
//! # Ok::<(), remoting_protocol_core::ProtocolError>(())
//! ```

#![warn(rust_2018_idioms)]

pub mod candidate;
pub mod channel;
pub mod config;
pub mod description;
pub mod error;
pub mod logging;
pub mod session;
pub mod xml;

pub use candidate::{CandidateSessionConfig, ChannelConfigsMut};
pub use channel::{ChannelConfig, ChannelRole, Codec, DEFAULT_STREAM_VERSION, TransportType};
pub use config::ProtocolConfig;
pub use description::{AuthenticatorMessage, ContentDescription, REMOTING_NAMESPACE};
pub use error::{ProtocolError, Result};
pub use session::SessionConfig;
pub use xml::XmlElement;

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
