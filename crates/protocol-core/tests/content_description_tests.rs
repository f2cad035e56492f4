//! Format/parse behaviour of session descriptions

use pretty_assertions::assert_eq;
use remoting_protocol_core::{
    AuthenticatorMessage, CandidateSessionConfig, ChannelConfig, Codec, ContentDescription,
    DEFAULT_STREAM_VERSION, ProtocolError, TransportType, XmlElement,
};

const UNKNOWN_TRANSPORT_DESCRIPTION: &str = r#"<description xmlns="google:remoting">
  <control transport="stream" version="2"/>
  <event transport="stream" version="2"/>
  <event transport="new_awesome_transport" version="3"/>
  <video transport="stream" version="2" codec="vp8"/>
  <authentication/>
</description>"#;

fn spake_message() -> AuthenticatorMessage {
    AuthenticatorMessage::empty()
        .with_attribute("method", "spake2_hmac")
        .with_child(
            XmlElement::namespaced("google:remoting", "spake-message").with_text("aGVsbG8gd29ybGQ="),
        )
}

#[test]
fn test_format_and_parse() {
    let description = ContentDescription::new(
        CandidateSessionConfig::create_default(),
        Some(spake_message()),
    );

    let xml = description.to_xml();
    let parsed = ContentDescription::from_xml(&xml).unwrap();

    assert_eq!(parsed.config().control_configs(), description.config().control_configs());
    assert_eq!(parsed.config().event_configs(), description.config().event_configs());
    assert_eq!(parsed.config().video_configs(), description.config().video_configs());
    assert_eq!(parsed.config().audio_configs(), description.config().audio_configs());
    assert_eq!(parsed.authenticator_message(), Some(&spake_message()));
    assert_eq!(parsed, description);
}

#[test]
fn test_format_and_parse_through_text() {
    let description = ContentDescription::new(
        CandidateSessionConfig::create_default(),
        Some(spake_message()),
    );

    let text = description.to_xml_string().unwrap();
    assert!(text.starts_with(r#"<description xmlns="google:remoting">"#));
    assert!(text.contains(r#"<video transport="stream" version="2" codec="vp8"/>"#));
    assert!(text.contains(r#"<audio transport="none" version="0"/>"#));

    let parsed = ContentDescription::parse_str(&text).unwrap();
    assert_eq!(parsed, description);
}

#[test]
fn test_parse_unknown_transport() {
    let parsed = ContentDescription::parse_str(UNKNOWN_TRANSPORT_DESCRIPTION).unwrap();

    assert_eq!(parsed.config().event_configs().len(), 1);
    assert_eq!(
        parsed.config().event_configs()[0],
        ChannelConfig::new(TransportType::Stream, DEFAULT_STREAM_VERSION, Codec::Undefined)
    );
    assert_eq!(parsed.config().control_configs().len(), 1);
    assert_eq!(
        parsed.config().video_configs(),
        &[ChannelConfig::stream(2, Codec::Vp8)]
    );
    assert!(parsed.config().audio_configs().is_empty());
}

#[test]
fn test_lenient_parse_keeps_unknown_transport() {
    let root = XmlElement::parse(UNKNOWN_TRANSPORT_DESCRIPTION).unwrap();
    let parsed = ContentDescription::from_xml_lenient(&root).unwrap();

    let events = parsed.config().event_configs();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1].transport(),
        &TransportType::Unknown("new_awesome_transport".to_string())
    );

    // Filtering the lenient result gives the strict result
    let (mut config, message) = parsed.into_parts();
    assert_eq!(config.retain_known(), 1);
    assert_eq!(
        ContentDescription::new(config, message),
        ContentDescription::from_xml(&root).unwrap()
    );
}

#[test]
fn test_unknown_video_codec_dropped() {
    let parsed = ContentDescription::parse_str(
        r#"<description xmlns="google:remoting">
             <video transport="stream" version="2" codec="av1"/>
             <video transport="stream" version="2" codec="vp8"/>
           </description>"#,
    )
    .unwrap();

    assert_eq!(parsed.config().video_configs(), &[ChannelConfig::stream(2, Codec::Vp8)]);
}

#[test]
fn test_wrong_root_is_rejected() {
    let err = ContentDescription::parse_str(
        r#"<session xmlns="google:remoting"><control transport="stream" version="2"/></session>"#,
    )
    .unwrap_err();
    assert!(matches!(err, ProtocolError::UnexpectedRoot { .. }));

    let err = ContentDescription::parse_str(r#"<description><authentication/></description>"#)
        .unwrap_err();
    match err {
        ProtocolError::UnexpectedRoot { expected, found } => {
            assert_eq!(expected, "{google:remoting}description");
            assert_eq!(found, "description");
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = ContentDescription::parse_str(r#"<description xmlns="urn:other"/>"#).unwrap_err();
    assert!(err.is_structural());
}

#[test]
fn test_malformed_xml_is_rejected() {
    for document in [
        "",
        r#"<description xmlns="google:remoting">"#,
        r#"<description xmlns="google:remoting"><control transport="stream" version="2"></description>"#,
        r#"<description xmlns="google:remoting"><control transport="stream" transport="stream"/></description>"#,
        "not xml at all",
    ] {
        let err = ContentDescription::parse_str(document).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedXml(_)), "{document:?} gave {err:?}");
    }
}

#[test]
fn test_empty_and_absent_authentication() {
    let empty = ContentDescription::parse_str(
        r#"<description xmlns="google:remoting"><control transport="stream" version="2"/><authentication/></description>"#,
    )
    .unwrap();
    let message = empty.authenticator_message().unwrap();
    assert!(message.is_empty());
    assert_eq!(message, &AuthenticatorMessage::empty());

    let absent = ContentDescription::parse_str(
        r#"<description xmlns="google:remoting"><control transport="stream" version="2"/></description>"#,
    )
    .unwrap();
    assert!(absent.authenticator_message().is_none());

    assert_eq!(empty.config(), absent.config());
    assert_ne!(empty, absent);
}

#[test]
fn test_absent_authentication_round_trips() {
    let description = ContentDescription::new(CandidateSessionConfig::create_default(), None);
    let parsed = ContentDescription::from_xml(&description.to_xml()).unwrap();
    assert!(parsed.authenticator_message().is_none());
    assert_eq!(parsed, description);
}

#[test]
fn test_control_codec_is_ignored() {
    let parsed = ContentDescription::parse_str(
        r#"<description xmlns="google:remoting">
             <control transport="stream" version="2" codec="vp8"/>
           </description>"#,
    )
    .unwrap();

    assert_eq!(
        parsed.config().control_configs(),
        &[ChannelConfig::stream(2, Codec::Undefined)]
    );
}

#[test]
fn test_unknown_elements_are_ignored() {
    let parsed = ContentDescription::parse_str(
        r#"<description xmlns="google:remoting" xmlns:x="urn:extension">
             <initial-resolution width="1024" height="768"/>
             <control transport="stream" version="2"/>
             <x:control transport="stream" version="9"/>
             <clipboard transport="stream" version="1"/>
             <event transport="stream" version="two"/>
             <event transport="stream" version="2"/>
           </description>"#,
    )
    .unwrap();

    assert_eq!(parsed.config().control_configs(), &[ChannelConfig::stream(2, Codec::Undefined)]);
    assert_eq!(parsed.config().event_configs(), &[ChannelConfig::stream(2, Codec::Undefined)]);
    assert!(parsed.authenticator_message().is_none());
}

#[test]
fn test_preference_order_preserved() {
    let mut config = CandidateSessionConfig::create_default();
    config.video_configs_mut().reverse();

    let description = ContentDescription::new(config.clone(), None);
    let parsed = ContentDescription::parse_str(&description.to_xml_string().unwrap()).unwrap();

    assert_eq!(parsed.config(), &config);
    assert_ne!(parsed.config(), &CandidateSessionConfig::create_default());
}

#[test]
fn test_authenticator_whitespace_preserved() {
    let certificate = AuthenticatorMessage::empty()
        .with_child(XmlElement::namespaced("google:remoting", "certificate").with_text("  QUJD\n"));
    let whitespace_only = AuthenticatorMessage::empty().with_text(" ");
    let mixed = AuthenticatorMessage::empty()
        .with_text("\n  ")
        .with_child(XmlElement::namespaced("google:remoting", "certificate"))
        .with_text("\t");

    for message in [certificate, whitespace_only, mixed] {
        let description =
            ContentDescription::new(CandidateSessionConfig::create_default(), Some(message.clone()));
        let parsed = ContentDescription::parse_str(&description.to_xml_string().unwrap()).unwrap();

        let received = parsed.authenticator_message().unwrap();
        assert_eq!(received, &message);
        assert_eq!(received.is_empty(), message.is_empty());
    }
}

#[test]
fn test_authenticator_kept_verbatim_in_indented_document() {
    let parsed = ContentDescription::parse_str(
        "<description xmlns=\"google:remoting\">\n  <control transport=\"stream\" version=\"2\"/>\n  <authentication> \n</authentication>\n</description>",
    )
    .unwrap();

    assert_eq!(
        parsed.config().control_configs(),
        &[ChannelConfig::stream(2, Codec::Undefined)]
    );
    let message = parsed.authenticator_message().unwrap();
    assert!(!message.is_empty());
    assert_eq!(message.element().text(), " \n");
}

#[test]
fn test_codec_outside_video_round_trips() {
    let mut config = CandidateSessionConfig::create_empty();
    config.audio_configs_mut().push(ChannelConfig::stream(2, Codec::Speex));
    config.video_configs_mut().push(ChannelConfig::stream(2, Codec::Speex));
    assert_eq!(config.audio_configs(), &[ChannelConfig::stream(2, Codec::Undefined)]);

    let description = ContentDescription::new(config, None);
    let parsed = ContentDescription::parse_str(&description.to_xml_string().unwrap()).unwrap();
    assert_eq!(parsed.config(), description.config());
    assert_eq!(parsed.config().video_configs(), &[ChannelConfig::stream(2, Codec::Speex)]);
}
