//! Answer construction against a remote offer.

use super::bundle::BundleTracker;
use super::certificate::DtlsFingerprint;
use super::configuration::BundlePolicy;
use super::constants::{H264_CODEC, H264_MAX_PTIME, H264_NAME, ICE_OPTIONS, OPUS_NAME, RTP_PROTOS};
use super::offer::{add_transport_attributes, lip_sync_groups, session_skeleton, unspecified_connection};
use super::random::TransportCredentials;
use super::rtc_error::RtcError;
use super::rtp_map::RtpMap;
use super::transceiver::{RtpTransceiverDirection, Transceiver};
use crate::sdp::attribute::AttributeList;
use crate::sdp::media::{MediaDescription, MediaKind};
use crate::sdp::origin::Origin;
use crate::sdp::port_spec::PortSpec;
use crate::sdp::session::Session;
use rand::Rng;
use std::collections::HashMap;

pub(crate) struct AnswerContext<'a> {
    pub policy: BundlePolicy,
    /// Transceivers already associated with the remote mids.
    pub transceivers: &'a [Transceiver],
    pub remote: &'a Session,
    pub fingerprints: &'a [DtlsFingerprint],
    pub origin: Origin,
}

/// Why a remote section was answered with a zero-port stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectReason {
    NoMid,
    NoCommonCodec,
    UnsupportedKind,
    NoTransceiver,
    InactiveTransceiver,
    NotBundleable,
    BundleMismatch,
}

impl RejectReason {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::NoMid => "section has no mid",
            Self::NoCommonCodec => "no supported codec offered",
            Self::UnsupportedKind => "media kind not supported",
            Self::NoTransceiver => "no transceiver for mid",
            Self::InactiveTransceiver => "transceiver is stopped",
            Self::NotBundleable => "bundle policy requires a bundle the offer does not provide",
            Self::BundleMismatch => "offer bundles the section with port 0 but local policy does not",
        }
    }
}

#[derive(Debug)]
pub(crate) struct Rejection {
    pub index: usize,
    pub mid: Option<String>,
    pub reason: RejectReason,
}

#[derive(Debug)]
pub(crate) struct BuiltAnswer {
    pub session: Session,
    pub rejected: Vec<Rejection>,
}

/// `m=<kind> 0 UDP/TLS/RTP/SAVPF` with a placeholder connection.
fn rejected_section(kind: MediaKind) -> MediaDescription {
    let mut media = MediaDescription::new(kind, PortSpec::single(0), &RTP_PROTOS, Vec::new());
    media.connections.push(unspecified_connection());
    media
}

/// Answerer `setup` role for the offered one.
pub(crate) fn setup_complement(offered: &str) -> &'static str {
    match offered {
        "actpass" | "passive" => "active",
        _ => "passive",
    }
}

/// Formats of `remote` whose rtpmap names one of `codecs`, with their rtpmap lines.
///
/// # Errors
/// [`RtcError::RtpMap`] when an rtpmap line for one of the formats is malformed.
fn matching_formats<'a>(
    remote: &'a MediaDescription,
    codecs: &[&str],
) -> Result<Vec<(&'a str, &'a str)>, RtcError> {
    let mut matched = Vec::new();
    for format in &remote.formats {
        for value in remote.attributes_named("rtpmap").filter_map(|a| a.value()) {
            if value.split_whitespace().next() != Some(format.as_str()) {
                continue;
            }
            let rtpmap: RtpMap = value.parse()?;
            if codecs.iter().any(|c| rtpmap.encoding_name.eq_ignore_ascii_case(c)) {
                matched.push((format.as_str(), value));
            }
        }
    }
    Ok(matched)
}

/// Looks `name` up in the section, then in the section tagging its bundle, then at session level.
fn remote_attribute<'a>(
    remote: &'a Session,
    media: &'a MediaDescription,
    mid: &str,
    name: &'static str,
) -> Result<&'a str, RtcError> {
    let from_tag = || {
        let tag = remote.bundle_group_of(mid)?.first().copied()?;
        remote.media_by_mid(tag)?.attribute_value(name)
    };
    media
        .attribute_value(name)
        .or_else(from_tag)
        .or_else(|| remote.attribute_value(name))
        .ok_or_else(|| RtcError::MissingAttribute {
            mid: mid.to_string(),
            name,
        })
}

/// Whether some section of the remote BUNDLE group containing `mid` has a usable port.
fn bundled_with_transport(remote: &Session, mid: &str) -> bool {
    remote.bundle_group_of(mid).is_some_and(|group| {
        group
            .iter()
            .filter_map(|m| remote.media_by_mid(m))
            .any(|m| m.port.base() != 0)
    })
}

struct Accepted<'a> {
    mid: &'a str,
    formats: Vec<(&'a str, &'a str)>,
    transceiver: Option<&'a Transceiver>,
}

/// Runs the rejection checks on one remote section.
fn screen<'a>(
    ctx: &AnswerContext<'a>,
    remote: &'a MediaDescription,
    tracker: &mut BundleTracker,
) -> Result<Result<Accepted<'a>, RejectReason>, RtcError> {
    let Some(mid) = remote.mid() else {
        return Ok(Err(RejectReason::NoMid));
    };
    let codecs: &[&str] = match remote.kind {
        MediaKind::Audio => &[OPUS_NAME],
        MediaKind::Video => &[H264_CODEC, H264_NAME],
        MediaKind::Application => {
            return Ok(Ok(Accepted {
                mid,
                formats: Vec::new(),
                transceiver: None,
            }));
        }
        MediaKind::Text | MediaKind::Message => return Ok(Err(RejectReason::UnsupportedKind)),
    };
    let formats = matching_formats(remote, codecs)?;
    if formats.is_empty() {
        return Ok(Err(RejectReason::NoCommonCodec));
    }
    let Some(transceiver) = ctx.transceivers.iter().find(|t| t.mid() == Some(mid)) else {
        return Ok(Err(RejectReason::NoTransceiver));
    };
    if !transceiver.is_active() {
        return Ok(Err(RejectReason::InactiveTransceiver));
    }

    let bundle_only = tracker.is_bundle_only(remote.kind);
    if bundle_only && !bundled_with_transport(ctx.remote, mid) {
        return Ok(Err(RejectReason::NotBundleable));
    }
    let remote_bundle_only = remote.port.base() == 0 && ctx.remote.bundle_group_of(mid).is_some();
    if remote_bundle_only && !bundle_only {
        return Ok(Err(RejectReason::BundleMismatch));
    }
    Ok(Ok(Accepted {
        mid,
        formats,
        transceiver: Some(transceiver),
    }))
}

/// Builds the answer section for an accepted remote section.
fn accepted_section(
    ctx: &AnswerContext<'_>,
    remote: &MediaDescription,
    accepted: &Accepted<'_>,
    credentials: &TransportCredentials,
) -> Result<MediaDescription, RtcError> {
    let mid = accepted.mid;
    let setup = remote_attribute(ctx.remote, remote, mid, "setup")?;
    remote_attribute(ctx.remote, remote, mid, "ice-ufrag")?;
    remote_attribute(ctx.remote, remote, mid, "ice-pwd")?;

    let protos: Vec<&str> = remote.protos.iter().map(String::as_str).collect();
    let mut media = MediaDescription::new(remote.kind, PortSpec::single(9), &protos, Vec::new());
    media.connections.push(unspecified_connection());

    if remote.kind == MediaKind::Application {
        media.formats.clone_from(&remote.formats);
        if let Some(port) = remote.attribute_value("sctp-port") {
            media.add_attribute("sctp-port", port);
        }
    } else {
        for (format, rtpmap) in &accepted.formats {
            media.formats.push((*format).to_string());
            media.add_attribute("rtpmap", *rtpmap);
            let fmtp = remote
                .attributes_named("fmtp")
                .filter_map(|a| a.value())
                .filter(|v| v.split_whitespace().next() == Some(*format));
            for value in fmtp {
                media.add_attribute("fmtp", value);
            }
        }
        if remote.kind == MediaKind::Video {
            media.add_attribute("maxptime", H264_MAX_PTIME);
        }
    }

    add_transport_attributes(&mut media, setup_complement(setup), credentials, ctx.fingerprints);
    if !remote.has_attribute("rtcp-rsize") {
        media.remove_attributes("rtcp-rsize");
    }

    if let Some(transceiver) = accepted.transceiver {
        for stream_id in &transceiver.sender().associated_media_stream_ids {
            media.add_attribute("msid", stream_id.as_str());
        }
    }
    media.add_attribute("mid", mid);
    if accepted.transceiver.is_some() {
        let direction = RtpTransceiverDirection::from_media(remote).complement();
        media.add_flag(direction.as_str());
    }
    Ok(media)
}

/// Builds an answer to `ctx.remote`, section by section in remote order.
///
/// # Errors
/// [`RtcError::MissingAttribute`] when an accepted section has no `setup`,
/// `ice-ufrag` or `ice-pwd` anywhere, [`RtcError::RtpMap`] for a malformed
/// rtpmap on an offered format.
pub(crate) fn build_answer<R: Rng>(ctx: &AnswerContext<'_>, rng: &mut R) -> Result<BuiltAnswer, RtcError> {
    let mut session = session_skeleton(ctx.origin.clone());
    if ctx.remote.attribute_value("ice-options") != Some(ICE_OPTIONS) {
        session.remove_attributes("ice-options");
    }

    let mut tracker = BundleTracker::new(ctx.policy);
    let mut group_credentials: HashMap<String, TransportCredentials> = HashMap::new();
    let mut accepted_mids: Vec<&str> = Vec::new();
    let mut streams: Vec<(&[String], &str)> = Vec::new();
    let mut rejected = Vec::new();

    for (index, remote) in ctx.remote.media.iter().enumerate() {
        let accepted = match screen(ctx, remote, &mut tracker)? {
            Ok(accepted) => accepted,
            Err(reason) => {
                rejected.push(Rejection {
                    index,
                    mid: remote.mid().map(str::to_string),
                    reason,
                });
                session.media.push(rejected_section(remote.kind));
                continue;
            }
        };

        // Sections of one remote bundle share the transport of the first accepted one.
        let credentials = match ctx.remote.bundle_group_of(accepted.mid) {
            Some(group) => {
                let key = group.join(" ");
                group_credentials
                    .entry(key)
                    .or_insert_with(|| TransportCredentials::generate(rng))
                    .clone()
            }
            None => TransportCredentials::generate(rng),
        };
        session.media.push(accepted_section(ctx, remote, &accepted, &credentials)?);

        if let Some(transceiver) = accepted.transceiver {
            streams.push((transceiver.sender().associated_media_stream_ids.as_slice(), accepted.mid));
        }
        accepted_mids.push(accepted.mid);
    }

    for group in ctx.remote.groups("BUNDLE") {
        let mids: Vec<&str> = group.into_iter().filter(|m| accepted_mids.contains(m)).collect();
        if !mids.is_empty() {
            session.add_attribute("group", format!("BUNDLE {}", mids.join(" ")));
        }
    }
    for group in lip_sync_groups(streams) {
        session.add_attribute("group", format!("LS {}", group.join(" ")));
    }

    Ok(BuiltAnswer { session, rejected })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const REMOTE: &str = "v=0\n\
o=- 7 0 IN IP4 0.0.0.0\n\
s=-\n\
t=0 0\n\
a=ice-options:trickle ice2\n\
a=group:BUNDLE 0 1 2\n\
m=audio 9 UDP/TLS/RTP/SAVPF 35 0\n\
c=IN IP4 0.0.0.0\n\
a=rtpmap:35 OPUS/48000\n\
a=fmtp:35 useinbandfec=1\n\
a=rtpmap:0 PCMU/8000\n\
a=rtcp-rsize\n\
a=setup:actpass\n\
a=ice-ufrag:abcd\n\
a=ice-pwd:0123456789012345678901\n\
a=mid:0\n\
a=sendonly\n\
m=video 0 UDP/TLS/RTP/SAVPF 36\n\
c=IN IP4 0.0.0.0\n\
a=rtpmap:36 H264 AVC/90000\n\
a=bundle-only\n\
a=mid:1\n\
a=sendrecv\n\
m=application 9 UDP/DTLS/SCTP webrtc-datachannel\n\
c=IN IP4 0.0.0.0\n\
a=sctp-port:5000\n\
a=setup:passive\n\
a=ice-ufrag:efgh\n\
a=ice-pwd:0123456789012345678901\n\
a=mid:2\n";

    fn transceiver(kind: MediaKind, mid: &str) -> Transceiver {
        let mut t = Transceiver::new(kind, RtpTransceiverDirection::Sendrecv);
        t.set_mid(Some(mid.into()));
        t
    }

    fn answer(policy: BundlePolicy, remote: &Session, transceivers: &[Transceiver]) -> BuiltAnswer {
        let ctx = AnswerContext {
            policy,
            transceivers,
            remote,
            fingerprints: &[],
            origin: Origin::new_local(9, 0),
        };
        build_answer(&ctx, &mut StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn accepts_codecs_and_complements_roles() {
        let remote: Session = REMOTE.parse().unwrap();
        let ts = [transceiver(MediaKind::Audio, "0"), transceiver(MediaKind::Video, "1")];
        let built = answer(BundlePolicy::MaxBundle, &remote, &ts);
        assert!(built.rejected.is_empty(), "{:?}", built.rejected);

        let audio = &built.session.media[0];
        assert_eq!(audio.formats, vec!["35"]);
        assert_eq!(audio.attribute_value("rtpmap"), Some("35 OPUS/48000"));
        assert_eq!(audio.attribute_value("fmtp"), Some("35 useinbandfec=1"));
        assert_eq!(audio.attribute_value("setup"), Some("active"));
        assert!(audio.has_attribute("recvonly"));
        assert!(audio.has_attribute("rtcp-rsize"));

        let video = &built.session.media[1];
        assert_eq!(video.port.base(), 9);
        assert_eq!(video.attribute_value("setup"), Some("active"));
        assert_eq!(video.attribute_value("ice-ufrag"), audio.attribute_value("ice-ufrag"));
        assert!(!video.has_attribute("rtcp-rsize"));

        let data = &built.session.media[2];
        assert_eq!(data.attribute_value("setup"), Some("active"));
        assert_eq!(data.attribute_value("sctp-port"), Some("5000"));
        assert!(!data.has_attribute("sendrecv"));

        assert_eq!(built.session.groups("BUNDLE"), vec![vec!["0", "1", "2"]]);
        assert_eq!(built.session.attribute_value("ice-options"), Some("trickle ice2"));
    }

    #[test]
    fn missing_codec_yields_zero_port_stub() {
        let text = REMOTE.replace("a=rtpmap:36 H264 AVC/90000\n", "a=rtpmap:36 VP8/90000\n");
        let remote: Session = text.parse().unwrap();
        let ts = [transceiver(MediaKind::Audio, "0"), transceiver(MediaKind::Video, "1")];
        let built = answer(BundlePolicy::MaxBundle, &remote, &ts);

        assert_eq!(built.rejected.len(), 1);
        assert_eq!(built.rejected[0].reason, RejectReason::NoCommonCodec);
        let stub = &built.session.media[1];
        assert_eq!(stub.kind, MediaKind::Video);
        assert_eq!(stub.port.base(), 0);
        assert_eq!(stub.proto(), "UDP/TLS/RTP/SAVPF");
        assert!(stub.formats.is_empty());
        assert!(stub.attributes.is_empty());
        assert_eq!(built.session.groups("BUNDLE"), vec![vec!["0", "2"]]);
        // Stubs still decode.
        let again: Session = built.session.to_string().parse().unwrap();
        assert!(again.media[1].is_rejected());
    }

    #[test]
    fn plain_h264_rtpmap_is_accepted() {
        let remote: Session = "v=0\n\
o=- 7 0 IN IP4 0.0.0.0\n\
s=-\n\
t=0 0\n\
m=video 9 UDP/TLS/RTP/SAVPF 96 97\n\
c=IN IP4 0.0.0.0\n\
a=rtpmap:96 H264/90000\n\
a=fmtp:96 profile-level-id=42e01f\n\
a=rtpmap:97 VP8/90000\n\
a=setup:actpass\n\
a=ice-ufrag:abcd\n\
a=ice-pwd:0123456789012345678901\n\
a=mid:0\n\
a=sendrecv\n"
            .parse()
            .unwrap();
        let ts = [transceiver(MediaKind::Video, "0")];
        let built = answer(BundlePolicy::MaxCompat, &remote, &ts);
        assert!(built.rejected.is_empty(), "{:?}", built.rejected);

        let video = &built.session.media[0];
        assert_eq!(video.port.base(), 9);
        assert_eq!(video.formats, vec!["96"]);
        assert_eq!(video.attribute_value("rtpmap"), Some("96 H264/90000"));
        assert_eq!(video.attribute_value("fmtp"), Some("96 profile-level-id=42e01f"));
        assert_eq!(video.attribute_value("maxptime"), Some("120"));
        assert!(video.has_attribute("sendrecv"));
    }

    #[test]
    fn lip_sync_groups_follow_local_streams() {
        let text = REMOTE.replace("a=group:BUNDLE 0 1 2\n", "a=group:BUNDLE 0 1 2\na=group:LS 1 2\n");
        let remote: Session = text.parse().unwrap();
        assert_eq!(remote.groups("LS"), vec![vec!["1", "2"]]);

        let mut audio = transceiver(MediaKind::Audio, "0");
        audio.set_stream_ids(vec!["local-stream".into()]);
        let mut video = transceiver(MediaKind::Video, "1");
        video.set_stream_ids(vec!["local-stream".into()]);
        let built = answer(BundlePolicy::MaxBundle, &remote, &[audio, video]);
        assert!(built.rejected.is_empty(), "{:?}", built.rejected);
        assert_eq!(built.session.groups("LS"), vec![vec!["0", "1"]]);
        assert_eq!(built.session.media[0].attribute_value("msid"), Some("local-stream"));

        let mut audio = transceiver(MediaKind::Audio, "0");
        audio.set_stream_ids(vec!["a".into()]);
        let mut video = transceiver(MediaKind::Video, "1");
        video.set_stream_ids(vec!["b".into()]);
        let built = answer(BundlePolicy::MaxBundle, &remote, &[audio, video]);
        assert!(built.session.groups("LS").is_empty());
    }

    #[test]
    fn bundle_disagreement_rejects() {
        let remote: Session = REMOTE.parse().unwrap();
        let ts = [transceiver(MediaKind::Audio, "0"), transceiver(MediaKind::Video, "1")];
        let built = answer(BundlePolicy::Balanced, &remote, &ts);
        assert_eq!(built.rejected.len(), 1);
        assert_eq!(built.rejected[0].mid.as_deref(), Some("1"));
        assert_eq!(built.rejected[0].reason, RejectReason::BundleMismatch);
    }

    #[test]
    fn stopped_or_missing_transceivers_reject() {
        let remote: Session = REMOTE.parse().unwrap();
        let mut stopped = transceiver(MediaKind::Audio, "0");
        stopped.stop();
        let built = answer(BundlePolicy::MaxBundle, &remote, &[stopped]);
        let reasons: Vec<_> = built.rejected.iter().map(|r| r.reason).collect();
        assert_eq!(reasons, vec![RejectReason::InactiveTransceiver, RejectReason::NoTransceiver]);
    }

    #[test]
    fn missing_setup_is_a_policy_error() {
        let text = REMOTE.replace("a=setup:actpass\n", "");
        let remote: Session = text.parse().unwrap();
        let ts = [transceiver(MediaKind::Audio, "0")];
        let ctx = AnswerContext {
            policy: BundlePolicy::MaxCompat,
            transceivers: &ts,
            remote: &remote,
            fingerprints: &[],
            origin: Origin::new_local(9, 0),
        };
        let err = build_answer(&ctx, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, RtcError::MissingAttribute { name: "setup", .. }));
    }

    #[test]
    fn malformed_rtpmap_aborts() {
        let text = REMOTE.replace("a=rtpmap:0 PCMU/8000\n", "a=rtpmap:0 PCMU/fast\n");
        let remote: Session = text.parse().unwrap();
        let ts = [transceiver(MediaKind::Audio, "0")];
        let ctx = AnswerContext {
            policy: BundlePolicy::MaxBundle,
            transceivers: &ts,
            remote: &remote,
            fingerprints: &[],
            origin: Origin::new_local(9, 0),
        };
        assert!(matches!(
            build_answer(&ctx, &mut StdRng::seed_from_u64(1)),
            Err(RtcError::RtpMap(_))
        ));
    }

    #[test]
    fn ice_options_kept_only_when_identical() {
        let text = REMOTE.replace("a=ice-options:trickle ice2\n", "a=ice-options:trickle\n");
        let remote: Session = text.parse().unwrap();
        let built = answer(BundlePolicy::MaxBundle, &remote, &[]);
        assert!(!built.session.has_attribute("ice-options"));
    }

    #[test]
    fn setup_roles() {
        assert_eq!(setup_complement("actpass"), "active");
        assert_eq!(setup_complement("passive"), "active");
        assert_eq!(setup_complement("active"), "passive");
    }
}
