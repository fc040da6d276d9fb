use std::fmt;
use std::str::FromStr;

/// JSEP signaling state of a peer connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalingState {
    #[default]
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalPranswer,
    HaveRemotePranswer,
    Closed,
}

impl SignalingState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::HaveLocalOffer => "have-local-offer",
            Self::HaveRemoteOffer => "have-remote-offer",
            Self::HaveLocalPranswer => "have-local-pranswer",
            Self::HaveRemotePranswer => "have-remote-pranswer",
            Self::Closed => "closed",
        }
    }

    /// States from which a rollback is accepted.
    #[must_use]
    pub const fn can_rollback(self) -> bool {
        matches!(self, Self::HaveLocalOffer | Self::HaveRemoteOffer)
    }
}

impl fmt::Display for SignalingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "stable" => Self::Stable,
            "have-local-offer" => Self::HaveLocalOffer,
            "have-remote-offer" => Self::HaveRemoteOffer,
            "have-local-pranswer" => Self::HaveLocalPranswer,
            "have-remote-pranswer" => Self::HaveRemotePranswer,
            "closed" => Self::Closed,
            other => return Err(format!("unknown signaling state '{other}'")),
        })
    }
}
