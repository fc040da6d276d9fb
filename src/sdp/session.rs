use crate::sdp::attribute::{Attribute, AttributeList};
use crate::sdp::bandwidth::Bandwidth;
use crate::sdp::connection::Connection;
use crate::sdp::decoder;
use crate::sdp::encoder;
use crate::sdp::encryption_key::EncryptionKey;
use crate::sdp::media::MediaDescription;
use crate::sdp::origin::Origin;
use crate::sdp::sdp_error::SdpError;
use crate::sdp::time_desc::{TimeZone, Timing};
use std::{fmt, str::FromStr};

/// A complete session description.
///
/// Fields are public so that sessions can be built and inspected directly.
/// A decoded `Session` always has its required fields set and passes
/// [`Session::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub version: u8,                          // v= (always 0)
    pub origin: Origin,                       // o=
    pub session_name: String,                 // s=
    pub information: Option<String>,          // i=
    pub uri: Option<String>,                  // u=
    pub emails: Vec<String>,                  // e=*
    pub phones: Vec<String>,                  // p=*
    pub connection: Option<Connection>,       // c=
    pub bandwidths: Vec<Bandwidth>,           // b=*
    pub timings: Vec<Timing>,                 // t= (+ r=*)
    pub time_zones: Vec<TimeZone>,            // z=
    pub encryption_keys: Vec<EncryptionKey>,  // k=*
    pub attributes: Vec<Attribute>,          // a=*
    pub media: Vec<MediaDescription>,         // m=*
}

impl Session {
    /// Session with the given origin and name, version 0, and nothing else.
    pub fn new(origin: Origin, session_name: impl Into<String>) -> Self {
        Self {
            version: 0,
            origin,
            session_name: session_name.into(),
            information: None,
            uri: None,
            emails: Vec::new(),
            phones: Vec::new(),
            connection: None,
            bandwidths: Vec::new(),
            timings: Vec::new(),
            time_zones: Vec::new(),
            encryption_keys: Vec::new(),
            attributes: Vec::new(),
            media: Vec::new(),
        }
    }

    /// Checks the cross-field rules the decoder enforces at end of input.
    ///
    /// # Errors
    /// [`SdpError::MissingRequiredFields`] for a non-zero version or an empty
    /// session name, [`SdpError::MissingConnection`] when a media section has
    /// no connection and none is set at session level.
    pub fn validate(&self) -> Result<(), SdpError> {
        if self.version != 0 || self.session_name.is_empty() {
            return Err(SdpError::MissingRequiredFields);
        }
        if self.connection.is_none() && self.media.iter().any(|m| m.connections.is_empty()) {
            return Err(SdpError::MissingConnection);
        }
        Ok(())
    }

    #[must_use]
    pub fn media_by_mid(&self, mid: &str) -> Option<&MediaDescription> {
        self.media.iter().find(|m| m.mid() == Some(mid))
    }

    /// Mids of every section, in section order. Sections without a mid are skipped.
    pub fn mids(&self) -> impl Iterator<Item = &str> {
        self.media.iter().filter_map(MediaDescription::mid)
    }

    /// Every `a=group:<semantics> <mid>...` line, as mid lists.
    #[must_use]
    pub fn groups(&self, semantics: &str) -> Vec<Vec<&str>> {
        self.attributes_named("group")
            .filter_map(Attribute::value)
            .filter_map(|v| {
                let mut tokens = v.split(' ').filter(|t| !t.is_empty());
                (tokens.next() == Some(semantics)).then(|| tokens.collect())
            })
            .collect()
    }

    /// The `BUNDLE` group containing `mid`, if any.
    #[must_use]
    pub fn bundle_group_of(&self, mid: &str) -> Option<Vec<&str>> {
        self.groups("BUNDLE").into_iter().find(|g| g.contains(&mid))
    }
}

impl AttributeList for Session {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}

impl FromStr for Session {
    type Err = SdpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decoder::decode_str(s)
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        encoder::write_session(self, f)
    }
}
