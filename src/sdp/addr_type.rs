use crate::sdp::sdp_error::LineError;
use std::fmt;

/// Address type of `o=` and `c=` lines.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AddrType {
    IP4,
    IP6,
}

impl fmt::Display for AddrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::IP4 => "IP4",
            Self::IP6 => "IP6",
        })
    }
}

impl std::str::FromStr for AddrType {
    type Err = LineError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IP4" => Ok(Self::IP4),
            "IP6" => Ok(Self::IP6),
            other => Err(LineError::invalid("addrtype", format!("'{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::AddrType;

    #[test]
    fn parses_known_types() {
        assert_eq!("IP4".parse::<AddrType>().unwrap(), AddrType::IP4);
        assert_eq!("IP6".parse::<AddrType>().unwrap(), AddrType::IP6);
        assert!("ip4".parse::<AddrType>().is_err());
    }
}
