//! JSEP negotiation: offer/answer generation and the signaling state machine.

mod answer;
mod bundle;
mod constants;
mod offer;

pub mod certificate;
pub mod configuration;
pub mod peer_connection;
pub mod random;
pub mod rtc_error;
pub mod rtp_map;
pub mod sdp_type;
pub mod session_description;
pub mod signaling_state;
pub mod states;
pub mod transceiver;

pub use certificate::{CertificatePublisher, DtlsFingerprint, RtcCertificate};
pub use configuration::{BundlePolicy, IceServer, IceTransportPolicy, RtcConfiguration, RtcpMuxPolicy};
pub use peer_connection::PeerConnection;
pub use rtc_error::RtcError;
pub use sdp_type::SdpType;
pub use session_description::SessionDescription;
pub use signaling_state::SignalingState;
pub use transceiver::{MediaStreamTrack, RtpTransceiverDirection, Transceiver, TransceiverId};
