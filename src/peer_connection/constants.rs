use crate::sdp::addr_type::AddrType;

pub(super) const DEFAULT_PORT: u16 = 9;
pub(super) const RTP_PROTOS: [&str; 4] = ["UDP", "TLS", "RTP", "SAVPF"];
pub(super) const DATA_PROTOS: [&str; 3] = ["UDP", "DTLS", "SCTP"];
pub(super) const DEFAULT_NET_TYPE: &str = "IN";
pub(super) const DEFAULT_ADDR_TYPE: AddrType = AddrType::IP4;
pub(super) const DEFAULT_CONN_ADDR: &str = "0.0.0.0";
pub(super) const SESSION_NAME: &str = "-";

pub(crate) const OPUS_PAYLOAD_TYPE: u8 = 35;
pub(crate) const OPUS_CLOCK_RATE: u32 = 48_000;
pub(crate) const OPUS_FMTP: &str = "useinbandfec=1";
pub(super) const OPUS_NAME: &str = "opus";

pub(crate) const H264_PAYLOAD_TYPE: u8 = 36;
pub(crate) const H264_CLOCK_RATE: u32 = 90_000;
/// Label advertised in our own rtpmap lines.
pub(super) const H264_NAME: &str = "H264 AVC";
/// Codec name as other endpoints usually write it.
pub(super) const H264_CODEC: &str = "H264";
pub(super) const H264_MAX_PTIME: &str = "120";

pub(super) const DATA_CHANNEL_FORMAT: &str = "webrtc-datachannel";
pub(super) const SCTP_PORT: &str = "5000";

pub(super) const ICE_OPTIONS: &str = "trickle ice2";

pub(super) const TLS_ID_LEN: usize = 120;
pub(super) const ICE_UFRAG_LEN: usize = 4;
pub(super) const ICE_PWD_LEN: usize = 22;
