use crate::sdp::sdp_error::LineError;
use std::{fmt, str::FromStr};

/// Represents a `b=<bwtype>:<bandwidth>` line.
///
/// - `bwtype`: bandwidth type (for example `"AS"` for Application-Specific).
/// - `bandwidth`: bandwidth value, usually in kbps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bandwidth {
    pub bwtype: String,
    pub bandwidth: u64,
}

impl Bandwidth {
    pub fn new(bwtype: impl Into<String>, bandwidth: u64) -> Self {
        Self {
            bwtype: bwtype.into(),
            bandwidth,
        }
    }
}

impl FromStr for Bandwidth {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let [bwtype, value] = fields.as_slice() else {
            return Err(LineError::invalid("bandwidth", "expected exactly one ':'"));
        };
        Ok(Self::new(
            *bwtype,
            value
                .parse::<u64>()
                .map_err(LineError::parse_int("bandwidth"))?,
        ))
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bwtype, self.bandwidth)
    }
}
