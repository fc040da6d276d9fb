use crate::sdp::attribute::AttributeList;
use crate::sdp::media::{MediaDescription, MediaKind};
use std::fmt;
use std::str::FromStr;

/// Handle to a transceiver owned by a `PeerConnection`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransceiverId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RtpTransceiverDirection {
    #[default]
    Sendrecv,
    Sendonly,
    Recvonly,
    Inactive,
    Stopped,
}

impl RtpTransceiverDirection {
    /// Directions that may appear as an SDP flag attribute.
    pub const SDP_DIRECTIONS: [Self; 4] = [Self::Sendrecv, Self::Sendonly, Self::Recvonly, Self::Inactive];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sendrecv => "sendrecv",
            Self::Sendonly => "sendonly",
            Self::Recvonly => "recvonly",
            Self::Inactive => "inactive",
            Self::Stopped => "stopped",
        }
    }

    /// Direction the answerer uses for an offered direction.
    #[must_use]
    pub const fn complement(self) -> Self {
        match self {
            Self::Sendonly => Self::Recvonly,
            Self::Recvonly => Self::Sendonly,
            other => other,
        }
    }

    /// Direction flag of a media section; `sendrecv` when none is present.
    #[must_use]
    pub fn from_media(media: &MediaDescription) -> Self {
        Self::SDP_DIRECTIONS
            .into_iter()
            .find(|d| media.has_attribute(d.as_str()))
            .unwrap_or_default()
    }
}

impl fmt::Display for RtpTransceiverDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RtpTransceiverDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sendrecv" => Ok(Self::Sendrecv),
            "sendonly" => Ok(Self::Sendonly),
            "recvonly" => Ok(Self::Recvonly),
            "inactive" => Ok(Self::Inactive),
            "stopped" => Ok(Self::Stopped),
            other => Err(format!("unknown direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaStreamTrackState {
    #[default]
    Live,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaStreamTrack {
    pub kind: MediaKind,
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub muted: bool,
    pub ready_state: MediaStreamTrackState,
}

impl MediaStreamTrack {
    pub fn new(kind: MediaKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            label: String::new(),
            enabled: true,
            muted: false,
            ready_state: MediaStreamTrackState::Live,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpCodecParameters {
    pub mime_type: String,
    pub payload_type: u8,
    pub clock_rate: u32,
    pub channels: u16,
    pub sdp_fmtp_line: String,
}

impl RtpCodecParameters {
    /// The single codec offered for `kind`; empty for non-RTP kinds.
    #[must_use]
    pub fn defaults_for(kind: MediaKind) -> Vec<Self> {
        match kind {
            MediaKind::Audio => vec![Self {
                mime_type: "audio/opus".into(),
                payload_type: super::constants::OPUS_PAYLOAD_TYPE,
                clock_rate: super::constants::OPUS_CLOCK_RATE,
                channels: 0,
                sdp_fmtp_line: super::constants::OPUS_FMTP.into(),
            }],
            MediaKind::Video => vec![Self {
                mime_type: "video/H264".into(),
                payload_type: super::constants::H264_PAYLOAD_TYPE,
                clock_rate: super::constants::H264_CLOCK_RATE,
                channels: 0,
                sdp_fmtp_line: String::new(),
            }],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtpSender {
    pub track: Option<MediaStreamTrack>,
    /// Media stream ids advertised with `a=msid` and used for LS groups.
    pub associated_media_stream_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpReceiver {
    pub track: MediaStreamTrack,
}

/// One sender/receiver pair negotiated as a single media section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transceiver {
    mid: Option<String>,
    kind: MediaKind,
    sender: RtpSender,
    receiver: RtpReceiver,
    direction: RtpTransceiverDirection,
    current_direction: Option<RtpTransceiverDirection>,
    stopped: bool,
    stopping: bool,
    codecs: Vec<RtpCodecParameters>,
}

impl Transceiver {
    pub fn new(kind: MediaKind, direction: RtpTransceiverDirection) -> Self {
        Self {
            mid: None,
            kind,
            sender: RtpSender::default(),
            receiver: RtpReceiver {
                track: MediaStreamTrack::new(kind, String::new()),
            },
            direction,
            current_direction: None,
            stopped: false,
            stopping: false,
            codecs: RtpCodecParameters::defaults_for(kind),
        }
    }

    /// Attaches a local track and the streams it belongs to.
    #[must_use]
    pub fn with_track(mut self, track: MediaStreamTrack, stream_ids: Vec<String>) -> Self {
        self.sender.track = Some(track);
        self.sender.associated_media_stream_ids = stream_ids;
        self
    }

    // --- GETTERS ---

    #[must_use]
    pub fn mid(&self) -> Option<&str> {
        self.mid.as_deref()
    }

    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.kind
    }

    #[must_use]
    pub const fn sender(&self) -> &RtpSender {
        &self.sender
    }

    #[must_use]
    pub const fn receiver(&self) -> &RtpReceiver {
        &self.receiver
    }

    #[must_use]
    pub const fn direction(&self) -> RtpTransceiverDirection {
        self.direction
    }

    /// Direction agreed in the last applied answer.
    #[must_use]
    pub const fn current_direction(&self) -> Option<RtpTransceiverDirection> {
        self.current_direction
    }

    #[must_use]
    pub const fn stopped(&self) -> bool {
        self.stopped
    }

    #[must_use]
    pub const fn stopping(&self) -> bool {
        self.stopping
    }

    /// Neither stopped nor stopping, so it gets a section in new offers.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.stopped && !self.stopping
    }

    #[must_use]
    pub fn codecs(&self) -> &[RtpCodecParameters] {
        &self.codecs
    }

    // --- SETTERS ---

    pub const fn set_direction(&mut self, direction: RtpTransceiverDirection) {
        self.direction = direction;
    }

    pub fn set_stream_ids(&mut self, stream_ids: Vec<String>) {
        self.sender.associated_media_stream_ids = stream_ids;
    }

    /// Requests the transceiver to stop; it is fully stopped once an answer is applied.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopping = true;
            self.direction = RtpTransceiverDirection::Stopped;
        }
    }

    pub(crate) fn set_mid(&mut self, mid: Option<String>) {
        self.mid = mid;
    }

    pub(crate) const fn set_current_direction(&mut self, d: Option<RtpTransceiverDirection>) {
        self.current_direction = d;
    }

    pub(crate) fn mark_stopped(&mut self) {
        self.stopping = false;
        self.stopped = true;
        self.direction = RtpTransceiverDirection::Stopped;
        self.current_direction = Some(RtpTransceiverDirection::Stopped);
        self.receiver.track.ready_state = MediaStreamTrackState::Ended;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::sdp::port_spec::PortSpec;

    #[test]
    fn complement_swaps_send_and_recv_only() {
        use RtpTransceiverDirection::*;
        assert_eq!(Sendonly.complement(), Recvonly);
        assert_eq!(Recvonly.complement(), Sendonly);
        assert_eq!(Sendrecv.complement(), Sendrecv);
        assert_eq!(Inactive.complement(), Inactive);
    }

    #[test]
    fn direction_read_from_section_flags() {
        let mut m = MediaDescription::new(MediaKind::Audio, PortSpec::single(9), &["RTP", "AVP"], vec![]);
        assert_eq!(RtpTransceiverDirection::from_media(&m), RtpTransceiverDirection::Sendrecv);
        m.add_flag("recvonly");
        assert_eq!(RtpTransceiverDirection::from_media(&m), RtpTransceiverDirection::Recvonly);
    }

    #[test]
    fn new_transceiver_carries_default_codec() {
        let t = Transceiver::new(MediaKind::Audio, RtpTransceiverDirection::Sendrecv);
        assert_eq!(t.mid(), None);
        assert!(t.is_active());
        assert_eq!(t.codecs()[0].mime_type, "audio/opus");
        assert_eq!(t.codecs()[0].payload_type, 35);
        assert!(Transceiver::new(MediaKind::Text, RtpTransceiverDirection::Inactive)
            .codecs()
            .is_empty());
    }

    #[test]
    fn stop_then_mark_stopped() {
        let mut t = Transceiver::new(MediaKind::Video, RtpTransceiverDirection::Sendonly)
            .with_track(MediaStreamTrack::new(MediaKind::Video, "cam"), vec!["s0".into()]);
        t.stop();
        assert!(t.stopping());
        assert!(!t.is_active());
        t.mark_stopped();
        assert!(t.stopped());
        assert!(!t.stopping());
        assert_eq!(t.receiver().track.ready_state, MediaStreamTrackState::Ended);
        assert_eq!(t.sender().associated_media_stream_ids, vec!["s0"]);
    }
}
