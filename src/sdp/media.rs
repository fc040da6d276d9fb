use crate::sdp::attribute::{Attribute, AttributeList};
use crate::sdp::bandwidth::Bandwidth;
use crate::sdp::connection::Connection;
use crate::sdp::encryption_key::EncryptionKey;
use crate::sdp::port_spec::PortSpec;
use crate::sdp::sdp_error::LineError;
use std::{fmt, str::FromStr};

/// Protocol tokens accepted in the `/`-separated proto field of `m=`.
pub const KNOWN_PROTOS: [&str; 11] = [
    "UDP", "RTP", "AVP", "SAVP", "SAVPF", "TLS", "DTLS", "SCTP", "AVPF", "TCP", "MSRP",
];

/// Media type of an `m=` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaKind {
    Audio,
    Video,
    Text,
    Application,
    Message,
}

impl MediaKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Text => "text",
            Self::Application => "application",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "text" => Ok(Self::Text),
            "application" => Ok(Self::Application),
            "message" => Ok(Self::Message),
            other => Err(LineError::invalid("media type", format!("'{other}'"))),
        }
    }
}

/// One `m=` section and the lines that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescription {
    pub kind: MediaKind,
    pub port: PortSpec,
    /// Protocol stack, e.g. `["UDP", "TLS", "RTP", "SAVPF"]`.
    pub protos: Vec<String>,
    pub formats: Vec<String>,
    pub information: Option<String>,
    pub connections: Vec<Connection>,
    pub bandwidths: Vec<Bandwidth>,
    pub encryption_keys: Vec<EncryptionKey>,
    pub attributes: Vec<Attribute>,
}

impl MediaDescription {
    /// Section with the given header and nothing else.
    pub fn new(kind: MediaKind, port: PortSpec, protos: &[&str], formats: Vec<String>) -> Self {
        Self {
            kind,
            port,
            protos: protos.iter().map(|p| (*p).to_owned()).collect(),
            formats,
            information: None,
            connections: Vec::new(),
            bandwidths: Vec::new(),
            encryption_keys: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// The `mid` identifying this section, if any.
    #[must_use]
    pub fn mid(&self) -> Option<&str> {
        self.attribute_value("mid")
    }

    /// Proto field as written on the `m=` line.
    #[must_use]
    pub fn proto(&self) -> String {
        self.protos.join("/")
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.port.base() == 0 && !self.has_attribute("bundle-only")
    }

    /// Writes `<media> <port> <proto> <fmt>...`, the value of the `m=` line.
    pub(crate) fn write_header(&self, out: &mut impl fmt::Write) -> fmt::Result {
        write!(out, "{} {} {}", self.kind, self.port, self.proto())?;
        for format in &self.formats {
            write!(out, " {format}")?;
        }
        Ok(())
    }
}

impl AttributeList for MediaDescription {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
        &mut self.attributes
    }
}

// Parses only the `m=` header. The i=/c=/b=/k=/a= lines are added by the decoder.
impl FromStr for MediaDescription {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(' ').collect();
        if fields.len() < 3 {
            return Err(LineError::invalid(
                "media description",
                "expected '<media> <port> <proto> <fmt>...'",
            ));
        }
        let kind: MediaKind = fields[0].parse()?;
        let port: PortSpec = fields[1].parse()?;

        let mut protos = Vec::new();
        for proto in fields[2].split('/') {
            if !KNOWN_PROTOS.contains(&proto) {
                return Err(LineError::invalid("media proto", format!("'{proto}'")));
            }
            protos.push(proto.to_owned());
        }

        let mut media = Self::new(kind, port, &[], Vec::new());
        media.protos = protos;
        media.formats = fields[3..].iter().map(|f| (*f).to_owned()).collect();
        Ok(media)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn header(m: &MediaDescription) -> String {
        let mut out = String::new();
        m.write_header(&mut out).unwrap();
        out
    }

    #[test]
    fn media_kind_is_case_sensitive() {
        assert_eq!("audio".parse::<MediaKind>().unwrap(), MediaKind::Audio);
        assert_eq!("message".parse::<MediaKind>().unwrap(), MediaKind::Message);
        assert!("Audio".parse::<MediaKind>().is_err());
        assert!("data".parse::<MediaKind>().is_err());
        assert_eq!(MediaKind::Application.to_string(), "application");
    }

    #[test]
    fn parses_full_header() {
        let m: MediaDescription = "video 51372/2 RTP/AVP 99 100".parse().unwrap();
        assert_eq!(m.kind, MediaKind::Video);
        assert_eq!(m.port, PortSpec::new(51372, Some(2)));
        assert_eq!(m.protos, vec!["RTP", "AVP"]);
        assert_eq!(m.formats, vec!["99", "100"]);
        assert_eq!(header(&m), "video 51372/2 RTP/AVP 99 100");
    }

    #[test]
    fn header_without_formats_has_no_trailing_space() {
        let m: MediaDescription = "audio 0 UDP/TLS/RTP/SAVPF".parse().unwrap();
        assert!(m.formats.is_empty());
        assert!(m.is_rejected());
        assert_eq!(header(&m), "audio 0 UDP/TLS/RTP/SAVPF");
    }

    #[test]
    fn rejects_unknown_proto_and_short_lines() {
        assert!("audio 9 UDP/QUIC 0".parse::<MediaDescription>().is_err());
        assert!("audio 9".parse::<MediaDescription>().is_err());
        assert!("audio 1/2/3 RTP/AVP 0".parse::<MediaDescription>().is_err());
    }

    #[test]
    fn mid_comes_from_attributes() {
        let mut m = MediaDescription::new(
            MediaKind::Application,
            PortSpec::single(9),
            &["UDP", "DTLS", "SCTP"],
            vec!["webrtc-datachannel".into()],
        );
        assert_eq!(m.mid(), None);
        m.add_attribute("mid", "2");
        assert_eq!(m.mid(), Some("2"));
        assert_eq!(m.proto(), "UDP/DTLS/SCTP");
    }
}
