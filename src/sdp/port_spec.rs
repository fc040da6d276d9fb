use crate::sdp::sdp_error::LineError;
use std::{fmt, str::FromStr};

/// Port field of an `m=` line: `<port>[/<number of ports>]`.
///
/// A base port of `0` marks the section as rejected or bundled away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortSpec {
    base: u16,        // base port
    num: Option<u16>, // explicit number of ports, as written
}

impl PortSpec {
    #[must_use]
    pub const fn new(base: u16, num: Option<u16>) -> Self {
        Self { base, num }
    }

    /// Single port with no explicit count.
    #[must_use]
    pub const fn single(base: u16) -> Self {
        Self { base, num: None }
    }

    // --- GETTERS ---
    #[must_use]
    pub const fn base(&self) -> u16 {
        self.base
    }

    /// Explicit count, only when it appeared in the text.
    #[must_use]
    pub const fn num(&self) -> Option<u16> {
        self.num
    }

    /// Number of ports, `1` when not written.
    #[must_use]
    pub fn ports_num(&self) -> u16 {
        self.num.unwrap_or(1)
    }

    // --- SETTERS ---
    pub const fn set_base(&mut self, base: u16) {
        self.base = base;
    }

    pub const fn set_num(&mut self, num: Option<u16>) {
        self.num = num;
    }
}

impl FromStr for PortSpec {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split('/').collect();
        match segments.as_slice() {
            [base] => Ok(Self::single(
                base.parse().map_err(LineError::parse_int("media port"))?,
            )),
            [base, num] => Ok(Self::new(
                base.parse().map_err(LineError::parse_int("media port"))?,
                Some(num.parse().map_err(LineError::parse_int("media ports num"))?),
            )),
            _ => Err(LineError::invalid("media port", "too many '/' segments")),
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.num {
            Some(n) => write!(f, "{}/{}", self.base, n),
            None => write!(f, "{}", self.base),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::PortSpec;

    #[test]
    fn new_sets_fields_correctly() {
        let p = PortSpec::new(5004, Some(2));
        assert_eq!(p.base(), 5004);
        assert_eq!(p.num(), Some(2));
        assert_eq!(p.ports_num(), 2);
        assert_eq!(format!("{p}"), "5004/2");

        let p2 = PortSpec::single(3478);
        assert_eq!(p2.num(), None);
        assert_eq!(p2.ports_num(), 1);
        assert_eq!(format!("{p2}"), "3478");
    }

    #[test]
    fn parses_optional_count() {
        assert_eq!("9".parse::<PortSpec>().unwrap(), PortSpec::single(9));
        assert_eq!(
            "49170/2".parse::<PortSpec>().unwrap(),
            PortSpec::new(49170, Some(2))
        );
    }

    #[test]
    fn rejects_three_segments_and_garbage() {
        assert!("1/2/3".parse::<PortSpec>().is_err());
        assert!("port".parse::<PortSpec>().is_err());
        assert!("70000".parse::<PortSpec>().is_err());
        assert!("9/x".parse::<PortSpec>().is_err());
    }

    #[test]
    fn setters_update_fields() {
        let mut p = PortSpec::default();
        p.set_base(80);
        p.set_num(Some(4));
        assert_eq!(format!("{p}"), "80/4");
        p.set_num(None);
        assert_eq!(format!("{p}"), "80");
    }
}
