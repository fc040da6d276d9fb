use super::certificate::RtcCertificate;
use crate::config::{Config, ConfigError};
use std::fmt;
use std::str::FromStr;

pub const NEGOTIATION_SECTION: &str = "Negotiation";
pub const ICE_SECTION: &str = "ICE";

/// How media sections are grouped onto shared transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundlePolicy {
    /// One transport per media kind.
    #[default]
    Balanced,
    /// One transport per media section.
    MaxCompat,
    /// One transport for everything.
    MaxBundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RtcpMuxPolicy {
    #[default]
    Require,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IceTransportPolicy {
    Relay,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IceCredentialType {
    #[default]
    Password,
}

/// A STUN/TURN server entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IceServer {
    pub urls: Vec<String>,
    pub username: String,
    pub credential: String,
    pub credential_type: IceCredentialType,
}

macro_rules! policy_names {
    ($ty:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ConfigError::InvalidValue {
                        section: NEGOTIATION_SECTION,
                        key: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

policy_names!(BundlePolicy, "bundle_policy" {
    Balanced => "balanced",
    MaxCompat => "max-compat",
    MaxBundle => "max-bundle",
});

policy_names!(RtcpMuxPolicy, "rtcp_mux_policy" {
    Require => "require",
});

policy_names!(IceTransportPolicy, "ice_transport_policy" {
    Relay => "relay",
    All => "all",
});

/// Settings a peer connection is created with.
#[derive(Debug, Clone, Default)]
pub struct RtcConfiguration {
    pub ice_servers: Vec<IceServer>,
    pub ice_transport_policy: IceTransportPolicy,
    pub bundle_policy: BundlePolicy,
    pub rtcp_mux_policy: RtcpMuxPolicy,
    /// Certificates available up front. More can be published later.
    pub certificates: Vec<RtcCertificate>,
    pub ice_candidate_pool_size: u8,
}

impl RtcConfiguration {
    /// Builds a configuration from the `[Negotiation]` and `[ICE]` sections.
    ///
    /// Missing or empty keys keep their defaults.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] for an unknown policy name or a pool size
    /// that does not fit in a `u8`.
    pub fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let mut rtc = Self::default();

        if let Some(v) = cfg.get_non_empty(NEGOTIATION_SECTION, "bundle_policy") {
            rtc.bundle_policy = v.parse()?;
        }
        if let Some(v) = cfg.get_non_empty(NEGOTIATION_SECTION, "rtcp_mux_policy") {
            rtc.rtcp_mux_policy = v.parse()?;
        }
        if let Some(v) = cfg.get_non_empty(NEGOTIATION_SECTION, "ice_transport_policy") {
            rtc.ice_transport_policy = v.parse()?;
        }
        if let Some(v) = cfg.get_non_empty(NEGOTIATION_SECTION, "ice_candidate_pool_size") {
            rtc.ice_candidate_pool_size = v.parse().map_err(|_| ConfigError::InvalidValue {
                section: NEGOTIATION_SECTION,
                key: "ice_candidate_pool_size",
                value: v.to_string(),
            })?;
        }

        if let Some(servers) = cfg.get_non_empty(ICE_SECTION, "servers") {
            let urls: Vec<String> = servers
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !urls.is_empty() {
                rtc.ice_servers.push(IceServer {
                    urls,
                    username: cfg.get_or_default(ICE_SECTION, "username", "").to_string(),
                    credential: cfg.get_or_default(ICE_SECTION, "credential", "").to_string(),
                    credential_type: IceCredentialType::Password,
                });
            }
        }
        Ok(rtc)
    }
}
