#![allow(clippy::unwrap_used, clippy::expect_used)]

use rustyjsep::sdp::addr_type::AddrType;
use rustyjsep::sdp::encoder::{Encoder, encode_to_vec};
use rustyjsep::sdp::time_desc::TypedTime;
use rustyjsep::sdp::{AttributeList, Decoder, LineError, MediaKind, SdpError, Session};
use std::fs;

/// Reads a fixture from tests/sdp_test_files.
fn load_sdp_file(file_name: &str) -> String {
    let path = format!(
        "{}/tests/sdp_test_files/{}",
        env!("CARGO_MANIFEST_DIR"),
        file_name
    );
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

fn round_trip(file_name: &str) {
    let text = load_sdp_file(file_name);
    let session: Session = text.parse().expect("fixture should decode");
    assert_eq!(session.to_string(), text, "{file_name} did not round-trip");
    assert_eq!(encode_to_vec(&session).unwrap(), text.as_bytes());
}

#[test]
fn rfc4566_example_round_trips() {
    round_trip("rfc4566_example.sdp");
}

#[test]
fn bundled_offer_round_trips() {
    round_trip("bundled_offer.sdp");
}

#[test]
fn typed_time_suffixes_round_trip() {
    round_trip("typed_times.sdp");
}

#[test]
fn minimal_round_trips() {
    round_trip("minimal.sdp");
}

#[test]
fn rfc4566_example_fields() {
    let s: Session = load_sdp_file("rfc4566_example.sdp").parse().unwrap();
    assert_eq!(s.origin.username(), "jdoe");
    assert_eq!(s.origin.session_id(), 2_890_844_526);
    assert_eq!(s.session_name, "SDP Seminar");
    assert_eq!(s.emails, vec!["j.doe@example.com (Jane Doe)"]);
    assert_eq!(s.phones, vec!["+1 617 555-6011"]);

    let c = s.connection.as_ref().unwrap();
    assert_eq!(c.addr_type(), AddrType::IP4);
    assert_eq!((c.ttl(), c.addresses_num()), (127, 1));

    assert_eq!(s.bandwidths[0].bwtype, "AS");
    assert_eq!(s.bandwidths[0].bandwidth, 2000);
    let offsets: Vec<i64> = s.timings[0].repeat_times[0]
        .offsets
        .iter()
        .map(TypedTime::seconds)
        .collect();
    assert_eq!(offsets, vec![0, 90_000]);
    assert_eq!(s.time_zones.len(), 2);
    assert_eq!(s.time_zones[0].offset.seconds(), -3_600);
    assert!(s.attributes[0].is_flag());

    assert_eq!(s.media.len(), 2);
    assert_eq!(s.media[1].kind, MediaKind::Video);
    assert_eq!(s.media[1].port.ports_num(), 1);
    assert_eq!(s.media[1].formats, vec!["99", "100"]);
    assert_eq!(s.media[1].attributes_named("rtcp-fb").count(), 3);
}

#[test]
fn bundled_offer_groups_and_fingerprint() {
    let s: Session = load_sdp_file("bundled_offer.sdp").parse().unwrap();
    assert_eq!(s.groups("BUNDLE"), vec![vec!["0", "1", "2"]]);
    assert_eq!(s.groups("LS"), vec![vec!["0", "1"]]);
    let video = s.media_by_mid("1").unwrap();
    assert_eq!(video.port.base(), 0);
    assert!(video.has_attribute("bundle-only"));
    let fp = s.media[0].attribute_value("fingerprint").unwrap();
    assert!(fp.starts_with("sha-256 AB:CD:"));
}

#[test]
fn typed_time_fields_keep_units_and_seconds() {
    let s: Session = load_sdp_file("typed_times.sdp").parse().unwrap();
    let repeats = &s.timings[0].repeat_times;
    assert_eq!(repeats.len(), 2);
    assert_eq!(repeats[0].interval, TypedTime::with_unit(7, 'd'));
    assert_eq!(repeats[0].interval.seconds(), repeats[1].interval.seconds());
    assert_eq!(repeats[0].offsets[1].seconds(), 90_000);
    assert_eq!(s.time_zones[0].offset.seconds(), -3_600);
    assert_eq!(s.time_zones[0].offset.to_string(), "-1h");
}

#[test]
fn unknown_parameter_is_reported_at_line_three() {
    let text = load_sdp_file("unknown_parameter.sdp");
    let err = text.parse::<Session>().unwrap_err();
    assert_eq!(err.line(), Some(3));
    assert!(matches!(
        err,
        SdpError::Line {
            cause: LineError::UnknownParameter('x'),
            ..
        }
    ));
    assert!(err.to_string().contains("unknown parameter type"));
}

#[test]
fn missing_origin_and_connection() {
    let err = load_sdp_file("missing_origin.sdp").parse::<Session>().unwrap_err();
    assert!(matches!(err, SdpError::MissingRequiredFields));
    assert_eq!(err.to_string(), "not all required fields are set");

    let err = load_sdp_file("missing_connection.sdp")
        .parse::<Session>()
        .unwrap_err();
    assert!(matches!(err, SdpError::MissingConnection));
}

#[test]
fn streaming_decoder_and_encoder_agree() {
    let text = load_sdp_file("bundled_offer.sdp");
    let session = Decoder::new(text.as_bytes()).decode().unwrap();
    let mut encoder = Encoder::new(Vec::new());
    encoder.encode(&session).unwrap();
    assert_eq!(encoder.into_inner(), text.into_bytes());
}
