use std::fmt;
use std::str::FromStr;

/// Parsed value of an `a=rtpmap:` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpMap {
    pub payload_type: u8,
    pub encoding_name: String, // leave as-is; case-insensitive in SDP, may contain spaces
    pub clock_rate: u32,
    pub encoding_params: Option<u16>, // usually channels for audio
}

impl RtpMap {
    pub fn new(payload_type: u8, encoding_name: impl Into<String>, clock_rate: u32) -> Self {
        Self {
            payload_type,
            encoding_name: encoding_name.into(),
            clock_rate,
            encoding_params: None,
        }
    }

    /// True when the leading token of the rtpmap names `format`.
    #[must_use]
    pub fn matches_format(&self, format: &str) -> bool {
        format.parse::<u8>().is_ok_and(|pt| pt == self.payload_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtpMapParseError {
    MissingParts,
    InvalidPayloadType,
    InvalidClockRate,
    InvalidEncodingParams,
    PayloadTypeOutOfRange,
}

impl fmt::Display for RtpMapParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParts => write!(f, "Missing required parts in rtpmap"),
            Self::InvalidPayloadType => write!(f, "Invalid payload type"),
            Self::InvalidClockRate => write!(f, "Invalid clock rate"),
            Self::InvalidEncodingParams => write!(f, "Invalid encoding parameters"),
            Self::PayloadTypeOutOfRange => write!(f, "Payload type out of [0,127]"),
        }
    }
}
impl std::error::Error for RtpMapParseError {}

impl FromStr for RtpMap {
    type Err = RtpMapParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use RtpMapParseError::*;

        // Accept strings like: "96 opus/48000/2", "0 PCMU/8000" or "36 H264 AVC/90000"
        // We expect: <pt> <encoding>/<clock>[/<params>]
        let s = s.trim();

        let (pt_str, rhs) = s.split_once(char::is_whitespace).ok_or(MissingParts)?;
        let rhs = rhs.trim();
        if rhs.is_empty() {
            return Err(MissingParts);
        }

        let payload_type: u8 = pt_str.parse().map_err(|_| InvalidPayloadType)?;
        if payload_type > 127 {
            return Err(PayloadTypeOutOfRange);
        }

        // Split rhs by '/'; the encoding name itself may contain spaces
        let mut parts = rhs.splitn(3, '/');

        let encoding_name = parts.next().ok_or(MissingParts)?.trim().to_string();
        if encoding_name.is_empty() {
            return Err(MissingParts);
        }

        let clock_rate: u32 = parts
            .next()
            .ok_or(MissingParts)?
            .trim()
            .parse()
            .map_err(|_| InvalidClockRate)?;

        let encoding_params = match parts.next().map(str::trim) {
            None | Some("") => None,
            Some(p) => {
                // channels are positive; "0" is treated as absent
                let v: u16 = p.parse().map_err(|_| InvalidEncodingParams)?;
                if v == 0 { None } else { Some(v) }
            }
        };

        Ok(Self {
            payload_type,
            encoding_name,
            clock_rate,
            encoding_params,
        })
    }
}

impl fmt::Display for RtpMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}",
            self.payload_type, self.encoding_name, self.clock_rate
        )?;
        if let Some(p) = self.encoding_params {
            write!(f, "/{p}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn parses_opus() {
        let rm: RtpMap = "96 opus/48000/2".parse().unwrap();
        assert_eq!(rm.payload_type, 96);
        assert_eq!(rm.encoding_name.to_lowercase(), "opus");
        assert_eq!(rm.clock_rate, 48000);
        assert_eq!(rm.encoding_params, Some(2));
    }

    #[test]
    fn parses_pcmu_no_params() {
        let rm: RtpMap = "0 PCMU/8000".parse().unwrap();
        assert_eq!(rm.payload_type, 0);
        assert_eq!(rm.encoding_name, "PCMU");
        assert_eq!(rm.clock_rate, 8000);
        assert_eq!(rm.encoding_params, None);
    }

    #[test]
    fn encoding_name_with_space() {
        let rm: RtpMap = "36 H264 AVC/90000".parse().unwrap();
        assert_eq!(rm.payload_type, 36);
        assert_eq!(rm.encoding_name, "H264 AVC");
        assert_eq!(rm.clock_rate, 90_000);
        assert_eq!(rm.to_string(), "36 H264 AVC/90000");
    }

    #[test]
    fn multiple_spaces_and_tabs() {
        let rm: RtpMap = "  101\ttelephone-event/8000  ".parse().unwrap();
        assert_eq!(rm.payload_type, 101);
        assert_eq!(rm.encoding_name, "telephone-event");
        assert_eq!(rm.clock_rate, 8000);
    }

    #[test]
    fn invalid_missing_parts() {
        assert!("".parse::<RtpMap>().is_err());
        assert!("96".parse::<RtpMap>().is_err());
        assert!("96 ".parse::<RtpMap>().is_err());
        assert!("opus/48000".parse::<RtpMap>().is_err()); // no PT
    }

    #[test]
    fn invalid_pt_and_rate() {
        assert!("x9 opus/48000/2".parse::<RtpMap>().is_err());
        assert!("96 opus/xx".parse::<RtpMap>().is_err());
        assert!("96 opus".parse::<RtpMap>().is_err());
    }

    #[test]
    fn pt_out_of_range() {
        assert_eq!(
            "200 opus/48000".parse::<RtpMap>(),
            Err(RtpMapParseError::PayloadTypeOutOfRange)
        );
        // 127 is OK
        assert!("127 opus/48000".parse::<RtpMap>().is_ok());
    }

    #[test]
    fn zero_channels_becomes_none() {
        let rm: RtpMap = "98 opus/48000/0".parse().unwrap();
        assert_eq!(rm.encoding_params, None);
    }

    #[test]
    fn matches_numeric_format() {
        let rm = RtpMap::new(35, "opus", 48_000);
        assert!(rm.matches_format("35"));
        assert!(!rm.matches_format("36"));
        assert!(!rm.matches_format("webrtc-datachannel"));
    }
}
