use super::rtp_map::RtpMapParseError;
use crate::sdp::sdp_error::SdpError;
use std::fmt;

/// Errors surfaced by the negotiation engine. None of them are retried internally.
#[derive(Debug)]
pub enum RtcError {
    /// Operation not allowed in the current signaling or connection state.
    InvalidState(String),
    /// Description text differs from the one last produced by this connection.
    InvalidModification(String),
    /// Description text could not be decoded.
    Sdp(SdpError),
    /// A matched remote section lacks an attribute the answer needs.
    MissingAttribute { mid: String, name: &'static str },
    RtpMap(RtpMapParseError),
    /// The certificate provider failed to produce fingerprints.
    Certificate(String),
    /// Transceiver id does not belong to this connection.
    UnknownTransceiver,
}

impl RtcError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub(crate) fn invalid_modification(msg: impl Into<String>) -> Self {
        Self::InvalidModification(msg.into())
    }
}

impl fmt::Display for RtcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidState(msg) => write!(f, "InvalidStateError: {msg}"),
            Self::InvalidModification(msg) => write!(f, "InvalidModificationError: {msg}"),
            Self::Sdp(e) => write!(f, "SDP error: {e}"),
            Self::MissingAttribute { mid, name } => {
                write!(f, "remote media section '{mid}' has no {name} attribute")
            }
            Self::RtpMap(e) => write!(f, "malformed rtpmap: {e}"),
            Self::Certificate(msg) => write!(f, "certificate error: {msg}"),
            Self::UnknownTransceiver => write!(f, "unknown transceiver"),
        }
    }
}

impl std::error::Error for RtcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sdp(e) => Some(e),
            Self::RtpMap(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SdpError> for RtcError {
    fn from(e: SdpError) -> Self {
        Self::Sdp(e)
    }
}

impl From<RtpMapParseError> for RtcError {
    fn from(e: RtpMapParseError) -> Self {
        Self::RtpMap(e)
    }
}
