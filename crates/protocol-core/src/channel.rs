//! Channel configuration values
//!
//! A [`ChannelConfig`] is one acceptable way of running a channel: which
//! transport carries it, the protocol version spoken on it and, for video,
//! the codec. Transport and codec are open enumerations: values this
//! implementation does not recognise are kept verbatim as `Unknown` so they
//! can be inspected, logged or filtered instead of being lost at parse time.

use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Protocol version advertised for stream channels
pub const DEFAULT_STREAM_VERSION: u32 = 2;

/// Logical stream types within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    /// Control messages between client and host
    Control,
    /// Input events from client to host
    Event,
    /// Encoded video frames from host to client
    Video,
    /// Audio packets from host to client
    Audio,
}

impl ChannelRole {
    /// All roles in the order they appear in a session description
    pub const ALL: [ChannelRole; 4] = [
        ChannelRole::Control,
        ChannelRole::Event,
        ChannelRole::Video,
        ChannelRole::Audio,
    ];

    /// Element name used for this role in a session description
    pub fn tag(self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Event => "event",
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }

    /// Only video channels carry a codec on the wire
    pub fn carries_codec(self) -> bool {
        matches!(self, Self::Video)
    }
}

impl fmt::Display for ChannelRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Delivery mechanism for a channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportType {
    /// Channel disabled
    None,
    /// Reliable ordered stream
    Stream,
    /// Unreliable datagrams
    Datagram,
    /// A transport this implementation does not know, kept verbatim.
    ///
    /// Always built through `From<&str>`, which never wraps a known name.
    Unknown(String),
}

impl TransportType {
    /// Wire name of the transport
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::Stream => "stream",
            Self::Datagram => "datagram",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether this is one of the transports we can act on
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for TransportType {
    fn from(value: &str) -> Self {
        match value {
            "none" => Self::None,
            "stream" => Self::Stream,
            "datagram" => Self::Datagram,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for TransportType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<TransportType> for String {
    fn from(value: TransportType) -> Self {
        match value {
            TransportType::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for TransportType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload encoding for a channel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Codec {
    /// No codec negotiated for this channel
    Undefined,
    /// Raw, uncompressed payload
    Verbatim,
    /// Zlib-compressed payload
    Zip,
    /// VP8 video
    Vp8,
    /// Speex audio
    Speex,
    /// A codec this implementation does not know, kept verbatim
    Unknown(String),
}

impl Codec {
    /// Wire name of the codec
    pub fn as_str(&self) -> &str {
        match self {
            Self::Undefined => "undefined",
            Self::Verbatim => "verbatim",
            Self::Zip => "zip",
            Self::Vp8 => "vp8",
            Self::Speex => "speex",
            Self::Unknown(raw) => raw,
        }
    }

    /// Whether this is one of the codecs we can act on
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for Codec {
    fn from(value: &str) -> Self {
        match value {
            "undefined" => Self::Undefined,
            "verbatim" => Self::Verbatim,
            "zip" => Self::Zip,
            "vp8" => Self::Vp8,
            "speex" => Self::Speex,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Codec {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Codec> for String {
    fn from(value: Codec) -> Self {
        match value {
            Codec::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Codec {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One acceptable way to run a channel.
///
/// Equality is structural, except that two disabled configs (transport
/// [`TransportType::None`]) are always equal whatever their version and
/// codec say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    transport: TransportType,
    version: u32,
    codec: Codec,
}

impl ChannelConfig {
    /// Create a channel config. No validation is done; unknown transports
    /// and codecs are stored as given.
    pub fn new(transport: TransportType, version: u32, codec: Codec) -> Self {
        Self {
            transport,
            version,
            codec,
        }
    }

    /// The "channel disabled" config
    pub fn none() -> Self {
        Self::new(TransportType::None, 0, Codec::Undefined)
    }

    /// A stream channel at the given version
    pub fn stream(version: u32, codec: Codec) -> Self {
        Self::new(TransportType::Stream, version, codec)
    }

    pub fn transport(&self) -> &TransportType {
        &self.transport
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// True for the "channel disabled" config
    pub fn is_disabled(&self) -> bool {
        self.transport == TransportType::None
    }

    /// True when both transport and codec are values we recognise
    pub fn is_known(&self) -> bool {
        self.transport.is_known() && self.codec.is_known()
    }

    /// Drop the codec when `role` does not carry one on the wire
    pub(crate) fn normalize_for(&mut self, role: ChannelRole) {
        if !role.carries_codec() {
            self.codec = Codec::Undefined;
        }
    }
}

impl PartialEq for ChannelConfig {
    fn eq(&self, other: &Self) -> bool {
        if self.is_disabled() || other.is_disabled() {
            return self.is_disabled() && other.is_disabled();
        }
        self.transport == other.transport
            && self.version == other.version
            && self.codec == other.codec
    }
}

impl Eq for ChannelConfig {}

impl Hash for ChannelConfig {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.transport.hash(state);
        if !self.is_disabled() {
            self.version.hash(state);
            self.codec.hash(state);
        }
    }
}

impl fmt::Display for ChannelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_disabled() {
            return f.write_str("none");
        }
        write!(f, "{}/v{}", self.transport, self.version)?;
        if self.codec != Codec::Undefined {
            write!(f, "/{}", self.codec)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_transport_names() {
        assert_eq!(TransportType::from("stream"), TransportType::Stream);
        assert_eq!(TransportType::from("datagram"), TransportType::Datagram);
        assert_eq!(TransportType::from("none"), TransportType::None);
        assert_eq!(TransportType::Stream.to_string(), "stream");

        let unknown: TransportType = "new_awesome_transport".parse().unwrap();
        assert_eq!(unknown, TransportType::Unknown("new_awesome_transport".to_string()));
        assert_eq!(unknown.as_str(), "new_awesome_transport");
        assert!(!unknown.is_known());
    }

    #[test]
    fn test_transport_names_are_case_sensitive() {
        assert!(!TransportType::from("Stream").is_known());
    }

    #[test]
    fn test_codec_names() {
        for codec in [Codec::Undefined, Codec::Verbatim, Codec::Zip, Codec::Vp8, Codec::Speex] {
            assert_eq!(Codec::from(codec.as_str()), codec);
            assert!(codec.is_known());
        }
        assert_eq!(Codec::from("vp9"), Codec::Unknown("vp9".to_string()));
    }

    #[test]
    fn test_structural_equality() {
        let a = ChannelConfig::stream(2, Codec::Vp8);
        assert_eq!(a, ChannelConfig::new(TransportType::Stream, 2, Codec::Vp8));
        assert_ne!(a, ChannelConfig::stream(3, Codec::Vp8));
        assert_ne!(a, ChannelConfig::stream(2, Codec::Verbatim));
        assert_ne!(a, ChannelConfig::new(TransportType::Datagram, 2, Codec::Vp8));
    }

    #[test]
    fn test_unknown_transport_never_equals_known() {
        let unknown = ChannelConfig::new(TransportType::from("quic"), 2, Codec::Undefined);
        assert_ne!(unknown, ChannelConfig::stream(2, Codec::Undefined));
        assert_ne!(unknown, ChannelConfig::none());
        assert!(!unknown.is_known());
    }

    #[test]
    fn test_disabled_ignores_version_and_codec() {
        let a = ChannelConfig::new(TransportType::None, 2, Codec::Vp8);
        let b = ChannelConfig::new(TransportType::None, 7, Codec::Undefined);
        assert_eq!(a, b);
        assert_eq!(a, ChannelConfig::none());

        let set: HashSet<ChannelConfig> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(ChannelConfig::stream(2, Codec::Vp8).to_string(), "stream/v2/vp8");
        assert_eq!(ChannelConfig::stream(2, Codec::Undefined).to_string(), "stream/v2");
        assert_eq!(ChannelConfig::none().to_string(), "none");
    }

    #[test]
    fn test_role_tags() {
        let tags: Vec<_> = ChannelRole::ALL.iter().map(|r| r.tag()).collect();
        assert_eq!(tags, ["control", "event", "video", "audio"]);
        assert!(ChannelRole::Video.carries_codec());
        assert!(!ChannelRole::Control.carries_codec());
    }

    #[test]
    fn test_normalize_clears_codec_outside_video() {
        let mut audio = ChannelConfig::stream(2, Codec::Speex);
        audio.normalize_for(ChannelRole::Audio);
        assert_eq!(audio, ChannelConfig::stream(2, Codec::Undefined));

        let mut video = ChannelConfig::stream(2, Codec::Vp8);
        video.normalize_for(ChannelRole::Video);
        assert_eq!(video.codec(), &Codec::Vp8);
    }
}
