//! # Session descriptions
//!
//! A [`ContentDescription`] is what one peer sends the other when a session
//! is set up: its [`CandidateSessionConfig`] offer plus the current message
//! of the authentication handshake.
//!
//! ## Wire format
//!
//! ```xml
//! <description xmlns="google:remoting">
//!   <control transport="stream" version="2"/>
//!   <event transport="stream" version="2"/>
//!   <video transport="stream" version="2" codec="vp8"/>
//!   <audio transport="stream" version="2"/>
//!   <authentication/>
//! </description>
//! ```
//!
//! ## Compatibility rules
//!
//! Only the shape of the document can make parsing fail: it must be
//! well-formed XML with a `{google:remoting}description` root. Inside it,
//! anything not understood is skipped:
//!
//! - child elements with an unknown tag or in another namespace are ignored
//! - channel elements whose `version` is missing, zero or not plain decimal
//!   digits are dropped
//! - channel elements whose transport (or, for video, codec) is unknown are
//!   dropped by [`ContentDescription::from_xml`], and kept as `Unknown` values
//!   by [`ContentDescription::from_xml_lenient`]
//!
//! This lets a peer advertise transports newer than the receiver knows about
//! and still have the rest of its offer understood.

use tracing::{debug, trace};

use crate::candidate::CandidateSessionConfig;
use crate::channel::{ChannelConfig, ChannelRole, Codec, TransportType};
use crate::error::{ProtocolError, Result};
use crate::xml::XmlElement;

/// Namespace of every element in a session description
pub const REMOTING_NAMESPACE: &str = "google:remoting";

const DESCRIPTION_TAG: &str = "description";
const AUTHENTICATION_TAG: &str = "authentication";

const TRANSPORT_ATTR: &str = "transport";
const VERSION_ATTR: &str = "version";
const CODEC_ATTR: &str = "codec";

/// How a known child element of `<description>` is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildDecoder {
    Channel(ChannelRole),
    Authentication,
}

const CHILD_DECODERS: &[(&str, ChildDecoder)] = &[
    ("control", ChildDecoder::Channel(ChannelRole::Control)),
    ("event", ChildDecoder::Channel(ChannelRole::Event)),
    ("video", ChildDecoder::Channel(ChannelRole::Video)),
    ("audio", ChildDecoder::Channel(ChannelRole::Audio)),
    (AUTHENTICATION_TAG, ChildDecoder::Authentication),
];

fn decoder_for(tag: &str) -> Option<ChildDecoder> {
    CHILD_DECODERS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, decoder)| *decoder)
}

/// Opaque message of the authentication handshake.
///
/// Wraps the `<authentication>` element itself. Its attributes and content
/// belong to the authenticator and are passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorMessage {
    element: XmlElement,
}

impl AuthenticatorMessage {
    /// A present but empty message (`<authentication/>`)
    pub fn empty() -> Self {
        Self {
            element: XmlElement::namespaced(REMOTING_NAMESPACE, AUTHENTICATION_TAG),
        }
    }

    /// Add an attribute to the message element
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.element.set_attribute(key, value);
        self
    }

    /// Add a child element to the message
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.element.add_child(child);
        self
    }

    /// Add text content to the message
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.element.add_text(text);
        self
    }

    /// The `<authentication>` element
    pub fn element(&self) -> &XmlElement {
        &self.element
    }

    /// True for `<authentication/>`
    pub fn is_empty(&self) -> bool {
        self.element.is_empty()
    }

    fn from_element(element: &XmlElement) -> Self {
        Self {
            element: element.clone(),
        }
    }
}

/// A candidate offer plus the authenticator message, as exchanged on session
/// setup. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescription {
    config: CandidateSessionConfig,
    authenticator_message: Option<AuthenticatorMessage>,
}

impl ContentDescription {
    pub fn new(
        config: CandidateSessionConfig,
        authenticator_message: Option<AuthenticatorMessage>,
    ) -> Self {
        Self {
            config,
            authenticator_message,
        }
    }

    /// The offered channel configs
    pub fn config(&self) -> &CandidateSessionConfig {
        &self.config
    }

    /// The authenticator message, `None` when the peer sent no
    /// `<authentication>` element
    pub fn authenticator_message(&self) -> Option<&AuthenticatorMessage> {
        self.authenticator_message.as_ref()
    }

    /// Split into the offer and the message
    pub fn into_parts(self) -> (CandidateSessionConfig, Option<AuthenticatorMessage>) {
        (self.config, self.authenticator_message)
    }

    /// Build the `<description>` element.
    ///
    /// Channel elements come in role order (control, event, video, audio),
    /// each role in preference order, followed by the authentication element.
    pub fn to_xml(&self) -> XmlElement {
        let mut root = XmlElement::namespaced(REMOTING_NAMESPACE, DESCRIPTION_TAG);

        for role in ChannelRole::ALL {
            for config in self.config.configs(role) {
                root.add_child(encode_channel(role, config));
            }
        }

        if let Some(message) = &self.authenticator_message {
            root.add_child(message.element().clone());
        }

        trace!(channels = root.children().count(), "Formatted session description");
        root
    }

    /// Serialize to text
    pub fn to_xml_string(&self) -> Result<String> {
        self.to_xml().to_xml_string()
    }

    /// Parse a `<description>` element, keeping only channel configs this
    /// implementation can act on.
    pub fn from_xml(element: &XmlElement) -> Result<Self> {
        let mut description = Self::from_xml_lenient(element)?;
        description.config.retain_known();
        Ok(description)
    }

    /// Parse a `<description>` element, keeping channel configs with unknown
    /// transports or codecs as `Unknown` values.
    pub fn from_xml_lenient(element: &XmlElement) -> Result<Self> {
        if !element.is(REMOTING_NAMESPACE, DESCRIPTION_TAG) {
            return Err(ProtocolError::UnexpectedRoot {
                expected: format!("{{{}}}{}", REMOTING_NAMESPACE, DESCRIPTION_TAG),
                found: element.qualified_name(),
            });
        }

        let mut config = CandidateSessionConfig::create_empty();
        let mut authenticator_message = None;

        for child in element.children() {
            if child.namespace() != Some(REMOTING_NAMESPACE) {
                debug!(element = %child.qualified_name(), "Ignoring element from foreign namespace");
                continue;
            }

            match decoder_for(child.name()) {
                Some(ChildDecoder::Channel(role)) => {
                    if let Some(channel) = decode_channel(role, child) {
                        config.configs_mut(role).push(channel);
                    }
                }
                Some(ChildDecoder::Authentication) => {
                    if authenticator_message.is_none() {
                        authenticator_message = Some(AuthenticatorMessage::from_element(child));
                    } else {
                        debug!("Ignoring repeated authentication element");
                    }
                }
                None => {
                    debug!(tag = child.name(), "Ignoring unknown description element");
                }
            }
        }

        Ok(Self::new(config, authenticator_message))
    }

    /// Parse a document from text; see [`from_xml`](Self::from_xml)
    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::from_xml(&XmlElement::parse(xml)?)
    }
}

fn encode_channel(role: ChannelRole, config: &ChannelConfig) -> XmlElement {
    let mut element = XmlElement::namespaced(REMOTING_NAMESPACE, role.tag())
        .with_attribute(TRANSPORT_ATTR, config.transport().as_str())
        .with_attribute(VERSION_ATTR, config.version().to_string());

    if role.carries_codec() {
        element.set_attribute(CODEC_ATTR, config.codec().as_str());
    }
    element
}

/// Decode one channel element; `None` means the element is dropped.
fn decode_channel(role: ChannelRole, element: &XmlElement) -> Option<ChannelConfig> {
    let Some(transport) = element.attribute(TRANSPORT_ATTR).map(TransportType::from) else {
        debug!(role = %role, "Skipping channel element without transport");
        return None;
    };

    if transport == TransportType::None {
        return Some(ChannelConfig::none());
    }

    let version = element
        .attribute(VERSION_ATTR)
        .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0);
    let Some(version) = version else {
        debug!(
            role = %role,
            transport = %transport,
            version = ?element.attribute(VERSION_ATTR),
            "Skipping channel element with invalid version"
        );
        return None;
    };

    let codec = if role.carries_codec() {
        element
            .attribute(CODEC_ATTR)
            .map(Codec::from)
            .unwrap_or(Codec::Undefined)
    } else {
        Codec::Undefined
    };

    Some(ChannelConfig::new(transport, version, codec))
}
