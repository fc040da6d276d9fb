//! Offer construction.
//!
//! Building is pure: the caller gets the session plus the mid bookkeeping it
//! implies, and commits both only after the whole description was built.

use super::bundle::BundleTracker;
use super::certificate::DtlsFingerprint;
use super::configuration::BundlePolicy;
use super::constants::{
    DATA_CHANNEL_FORMAT, DATA_PROTOS, DEFAULT_ADDR_TYPE, DEFAULT_CONN_ADDR, DEFAULT_NET_TYPE,
    DEFAULT_PORT, H264_CLOCK_RATE, H264_MAX_PTIME, H264_NAME, H264_PAYLOAD_TYPE, ICE_OPTIONS,
    OPUS_CLOCK_RATE, OPUS_FMTP, OPUS_NAME, OPUS_PAYLOAD_TYPE, RTP_PROTOS, SCTP_PORT, SESSION_NAME,
};
use super::random::TransportCredentials;
use super::rtp_map::RtpMap;
use super::transceiver::{Transceiver, TransceiverId};
use crate::sdp::attribute::AttributeList;
use crate::sdp::connection::Connection;
use crate::sdp::media::{MediaDescription, MediaKind};
use crate::sdp::origin::Origin;
use crate::sdp::port_spec::PortSpec;
use crate::sdp::session::Session;
use crate::sdp::time_desc::Timing;

/// Everything an offer is built from.
pub(crate) struct OfferContext<'a> {
    pub policy: BundlePolicy,
    pub transceivers: &'a [Transceiver],
    pub credentials: &'a TransportCredentials,
    pub fingerprints: &'a [DtlsFingerprint],
    pub origin: Origin,
    /// Next numeric mid to hand out.
    pub mid_counter: u64,
    pub data_channel_mid: Option<&'a str>,
}

/// A built offer and the state changes to commit with it.
#[derive(Debug)]
pub(crate) struct BuiltOffer {
    pub session: Session,
    pub mid_updates: Vec<(TransceiverId, String)>,
    pub data_channel_mid: String,
    pub mid_counter: u64,
}

pub(crate) fn unspecified_connection() -> Connection {
    Connection::new(DEFAULT_NET_TYPE, DEFAULT_ADDR_TYPE, DEFAULT_CONN_ADDR)
}

/// `o=`, `s=`, `t=` and the ICE options every generated description starts with.
pub(crate) fn session_skeleton(origin: Origin) -> Session {
    let mut session = Session::new(origin, SESSION_NAME);
    session.timings.push(Timing::unbounded());
    session.add_attribute("ice-options", ICE_OPTIONS);
    session
}

/// Adds `rtcp-rsize`, `setup`, the ICE credentials and one line per fingerprint.
pub(crate) fn add_transport_attributes(
    media: &mut MediaDescription,
    setup: &str,
    credentials: &TransportCredentials,
    fingerprints: &[DtlsFingerprint],
) {
    media.add_flag("rtcp-rsize");
    media.add_attribute("setup", setup);
    media.add_attribute("tls-id", credentials.tls_id.as_str());
    media.add_attribute("ice-ufrag", credentials.ice_ufrag.as_str());
    media.add_attribute("ice-pwd", credentials.ice_pwd.as_str());
    for fp in fingerprints {
        media.add_attribute("fingerprint", fp.to_string());
    }
}

/// Sets the fixed codec of `kind` on `media`.
fn add_codecs(media: &mut MediaDescription, kind: MediaKind) {
    match kind {
        MediaKind::Audio => {
            media.formats = vec![OPUS_PAYLOAD_TYPE.to_string()];
            let rtpmap = RtpMap::new(OPUS_PAYLOAD_TYPE, OPUS_NAME, OPUS_CLOCK_RATE);
            media.add_attribute("rtpmap", rtpmap.to_string());
            media.add_attribute("fmtp", format!("{OPUS_PAYLOAD_TYPE} {OPUS_FMTP}"));
        }
        MediaKind::Video => {
            media.formats = vec![H264_PAYLOAD_TYPE.to_string()];
            let rtpmap = RtpMap::new(H264_PAYLOAD_TYPE, H264_NAME, H264_CLOCK_RATE);
            media.add_attribute("rtpmap", rtpmap.to_string());
            media.add_attribute("maxptime", H264_MAX_PTIME);
        }
        MediaKind::Text | MediaKind::Application | MediaKind::Message => {}
    }
}

/// LS groups: one per stream id shared by more than one mid, in first-seen order.
pub(crate) fn lip_sync_groups<'a>(
    entries: impl IntoIterator<Item = (&'a [String], &'a str)>,
) -> Vec<Vec<&'a str>> {
    let mut by_stream: Vec<(&str, Vec<&str>)> = Vec::new();
    for (stream_ids, mid) in entries {
        for stream_id in stream_ids {
            match by_stream.iter_mut().find(|(id, _)| id == stream_id) {
                Some((_, mids)) => mids.push(mid),
                None => by_stream.push((stream_id.as_str(), vec![mid])),
            }
        }
    }
    by_stream
        .into_iter()
        .filter(|(_, mids)| mids.len() > 1)
        .map(|(_, mids)| mids)
        .collect()
}

fn rtp_section(
    transceiver: &Transceiver,
    mid: &str,
    bundle_only: bool,
    ctx: &OfferContext<'_>,
) -> MediaDescription {
    let kind = transceiver.kind();
    let port = if bundle_only { 0 } else { DEFAULT_PORT };
    let mut media = MediaDescription::new(kind, PortSpec::single(port), &RTP_PROTOS, Vec::new());
    media.connections.push(unspecified_connection());
    add_codecs(&mut media, kind);

    if bundle_only {
        media.add_flag("bundle-only");
    } else {
        add_transport_attributes(&mut media, "actpass", ctx.credentials, ctx.fingerprints);
    }
    for stream_id in &transceiver.sender().associated_media_stream_ids {
        media.add_attribute("msid", stream_id.as_str());
    }
    media.add_attribute("mid", mid);
    media.add_flag(transceiver.direction().as_str());
    media
}

fn data_section(mid: &str, ctx: &OfferContext<'_>) -> MediaDescription {
    let mut media = MediaDescription::new(
        MediaKind::Application,
        PortSpec::single(DEFAULT_PORT),
        &DATA_PROTOS,
        vec![DATA_CHANNEL_FORMAT.to_string()],
    );
    media.connections.push(unspecified_connection());
    media.add_attribute("sctp-port", SCTP_PORT);
    add_transport_attributes(&mut media, "actpass", ctx.credentials, ctx.fingerprints);
    media.add_attribute("mid", mid);
    media
}

fn next_mid(counter: &mut u64) -> String {
    let mid = counter.to_string();
    *counter += 1;
    mid
}

/// Builds a full offer: one section per active transceiver, then the data channel.
pub(crate) fn build_offer(ctx: &OfferContext<'_>) -> BuiltOffer {
    let mut session = session_skeleton(ctx.origin.clone());
    let mut tracker = BundleTracker::new(ctx.policy);
    let mut counter = ctx.mid_counter;

    let mut mid_updates = Vec::new();
    let mut mids: Vec<String> = Vec::new();
    let mut streams: Vec<(&[String], String)> = Vec::new();

    for (idx, transceiver) in ctx.transceivers.iter().enumerate() {
        if !transceiver.is_active() {
            continue;
        }
        let mid = match transceiver.mid() {
            Some(mid) => mid.to_string(),
            None => {
                let mid = next_mid(&mut counter);
                mid_updates.push((TransceiverId(idx), mid.clone()));
                mid
            }
        };
        let bundle_only = tracker.is_bundle_only(transceiver.kind());
        session.media.push(rtp_section(transceiver, &mid, bundle_only, ctx));
        streams.push((transceiver.sender().associated_media_stream_ids.as_slice(), mid.clone()));
        mids.push(mid);
    }

    let data_channel_mid = match ctx.data_channel_mid {
        Some(mid) => mid.to_string(),
        None => next_mid(&mut counter),
    };
    session.media.push(data_section(&data_channel_mid, ctx));
    mids.push(data_channel_mid.clone());

    session.add_attribute("group", format!("BUNDLE {}", mids.join(" ")));
    let groups = lip_sync_groups(streams.iter().map(|(ids, mid)| (*ids, mid.as_str())));
    for group in groups {
        session.add_attribute("group", format!("LS {}", group.join(" ")));
    }

    BuiltOffer {
        session,
        mid_updates,
        data_channel_mid,
        mid_counter: counter,
    }
}
