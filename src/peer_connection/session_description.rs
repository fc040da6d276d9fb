use super::sdp_type::SdpType;
use crate::sdp::sdp_error::SdpError;
use crate::sdp::session::Session;

/// A typed description as exchanged with the remote peer.
///
/// `sdp` is the wire text. `session` is its decoded form when available;
/// descriptions built from raw text are decoded lazily by [`Self::to_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: String,
    session: Option<Session>,
}

impl SessionDescription {
    /// Wraps wire text received from elsewhere.
    pub fn new(sdp_type: SdpType, sdp: impl Into<String>) -> Self {
        Self {
            sdp_type,
            sdp: sdp.into(),
            session: None,
        }
    }

    /// Encodes `session` and keeps both forms.
    #[must_use]
    pub fn from_session(sdp_type: SdpType, session: Session) -> Self {
        Self {
            sdp_type,
            sdp: session.to_string(),
            session: Some(session),
        }
    }

    #[must_use]
    pub fn rollback() -> Self {
        Self::new(SdpType::Rollback, String::new())
    }

    /// Decoded session, if it was attached or already decoded.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Decoded session, decoding `sdp` when needed.
    ///
    /// # Errors
    /// Any [`SdpError`] produced while decoding the text.
    pub fn to_session(&self) -> Result<Session, SdpError> {
        match &self.session {
            Some(s) => Ok(s.clone()),
            None => self.sdp.parse(),
        }
    }

    /// Ensures the decoded form is attached.
    ///
    /// # Errors
    /// Any [`SdpError`] produced while decoding the text.
    pub fn decoded(mut self) -> Result<Self, SdpError> {
        if self.session.is_none() {
            self.session = Some(self.sdp.parse()?);
        }
        Ok(self)
    }
}
