use crate::sdp::sdp_error::LineError;
use std::{fmt, str::FromStr};

/// A `t=<start> <stop>` block together with the `r=` lines that follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timing {
    pub start: i64,
    pub stop: i64,
    pub repeat_times: Vec<RepeatTime>,
}

impl Timing {
    /// Unbounded session, `t=0 0`.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            start: 0,
            stop: 0,
            repeat_times: Vec::new(),
        }
    }
}

impl FromStr for Timing {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(' ').collect();
        let [start, stop] = fields.as_slice() else {
            return Err(LineError::invalid("timing", "expected '<start> <stop>'"));
        };
        Ok(Self {
            start: start.parse().map_err(LineError::parse_int("timing start"))?,
            stop: stop.parse().map_err(LineError::parse_int("timing stop"))?,
            repeat_times: Vec::new(),
        })
    }
}

impl fmt::Display for Timing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.stop)
    }
}

/// An SDP typed time: an integer with an optional `d`/`h`/`m`/`s` suffix.
///
/// The suffix is kept as written so the value re-encodes unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypedTime {
    pub value: i64,
    pub unit: Option<char>,
}

impl TypedTime {
    /// A plain number of seconds.
    #[must_use]
    pub const fn seconds_only(value: i64) -> Self {
        Self { value, unit: None }
    }

    #[must_use]
    pub const fn with_unit(value: i64, unit: char) -> Self {
        Self {
            value,
            unit: Some(unit),
        }
    }

    /// The value in seconds, saturating on overflow.
    #[must_use]
    pub fn seconds(&self) -> i64 {
        let multiplier = self.unit.and_then(unit_seconds).unwrap_or(1);
        self.value.saturating_mul(multiplier)
    }
}

impl FromStr for TypedTime {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (digits, unit) = match s.chars().last() {
            Some(c) if unit_seconds(c).is_some() => (&s[..s.len() - 1], Some(c)),
            _ => (s, None),
        };
        if digits.starts_with('+') {
            return Err(LineError::invalid("typed time", format!("'{s}' has a sign prefix")));
        }
        let value: i64 = digits
            .parse()
            .map_err(LineError::parse_int("typed time"))?;
        let t = Self { value, unit };
        let multiplier = unit.and_then(unit_seconds).unwrap_or(1);
        if value.checked_mul(multiplier).is_none() {
            return Err(LineError::invalid("typed time", format!("'{s}' overflows")));
        }
        Ok(t)
    }
}

impl fmt::Display for TypedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(unit) = self.unit {
            write!(f, "{unit}")?;
        }
        Ok(())
    }
}

/// An `r=<interval> <duration> <offsets>...` line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatTime {
    pub interval: TypedTime,
    pub duration: TypedTime,
    pub offsets: Vec<TypedTime>,
}

impl FromStr for RepeatTime {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(' ').collect();
        if fields.len() < 3 {
            return Err(LineError::invalid(
                "repeat time",
                "expected interval, duration and at least one offset",
            ));
        }
        Ok(Self {
            interval: fields[0].parse()?,
            duration: fields[1].parse()?,
            offsets: fields[2..]
                .iter()
                .map(|o| o.parse())
                .collect::<Result<_, _>>()?,
        })
    }
}

impl fmt::Display for RepeatTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interval, self.duration)?;
        for offset in &self.offsets {
            write!(f, " {offset}")?;
        }
        Ok(())
    }
}

/// One `<adjustment time> <offset>` pair of a `z=` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZone {
    pub time: i64,
    pub offset: TypedTime,
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time, self.offset)
    }
}

/// Parses the flat pair list of a `z=` line.
///
/// # Errors
/// Fails on an odd number of fields or on a malformed time/offset.
pub fn parse_time_zones(s: &str) -> Result<Vec<TimeZone>, LineError> {
    let fields: Vec<&str> = s.split(' ').collect();
    if fields.len() % 2 != 0 {
        return Err(LineError::invalid("time zone", "odd number of fields"));
    }
    fields
        .chunks_exact(2)
        .map(|pair| {
            Ok(TimeZone {
                time: pair[0].parse().map_err(LineError::parse_int("time zone"))?,
                offset: pair[1].parse()?,
            })
        })
        .collect()
}

/// Seconds represented by a typed-time unit suffix.
const fn unit_seconds(suffix: char) -> Option<i64> {
    match suffix {
        'd' => Some(86_400),
        'h' => Some(3_600),
        'm' => Some(60),
        's' => Some(1),
        _ => None,
    }
}

/// Parses an SDP typed time such as `7d`, `-1h` or `3600` into seconds.
///
/// # Errors
/// Fails when the numeric prefix is not an integer or the result overflows.
pub fn parse_typed_time(value: &str) -> Result<i64, LineError> {
    value.parse::<TypedTime>().map(|t| t.seconds())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn typed_time_units() {
        assert_eq!(parse_typed_time("7d").unwrap(), 604_800);
        assert_eq!(parse_typed_time("1h").unwrap(), 3_600);
        assert_eq!(parse_typed_time("25h").unwrap(), 90_000);
        assert_eq!(parse_typed_time("2m").unwrap(), 120);
        assert_eq!(parse_typed_time("9s").unwrap(), 9);
        assert_eq!(parse_typed_time("42").unwrap(), 42);
        assert_eq!(parse_typed_time("-1h").unwrap(), -3_600);
    }

    #[test]
    fn typed_time_errors() {
        assert!(parse_typed_time("").is_err());
        assert!(parse_typed_time("h").is_err());
        assert!(parse_typed_time("1x").is_err());
        assert!(parse_typed_time("+1h").is_err());
        assert!(parse_typed_time("9223372036854775807d").is_err());
    }

    #[test]
    fn timing_requires_two_integers() {
        let t: Timing = "3034423619 3042462419".parse().unwrap();
        assert_eq!((t.start, t.stop), (3_034_423_619, 3_042_462_419));
        assert!("0".parse::<Timing>().is_err());
        assert!("0 0 0".parse::<Timing>().is_err());
        assert!("0 x".parse::<Timing>().is_err());
    }

    #[test]
    fn repeat_time_keeps_units() {
        let r: RepeatTime = "7d 1h 0 25h".parse().unwrap();
        assert_eq!(r.interval.seconds(), 604_800);
        assert_eq!(r.duration, TypedTime::with_unit(1, 'h'));
        let offsets: Vec<i64> = r.offsets.iter().map(TypedTime::seconds).collect();
        assert_eq!(offsets, vec![0, 90_000]);
        assert_eq!(r.to_string(), "7d 1h 0 25h");
        assert_eq!("604800 3600 0 90000".parse::<RepeatTime>().unwrap().to_string(), "604800 3600 0 90000");
        assert!("7d 1h".parse::<RepeatTime>().is_err());
    }

    #[test]
    fn time_zones_come_in_pairs() {
        let z = parse_time_zones("3034423619 -1h 3042462419 0").unwrap();
        assert_eq!(
            z,
            vec![
                TimeZone {
                    time: 3_034_423_619,
                    offset: TypedTime::with_unit(-1, 'h')
                },
                TimeZone {
                    time: 3_042_462_419,
                    offset: TypedTime::seconds_only(0)
                },
            ]
        );
        assert_eq!(z[0].offset.seconds(), -3_600);
        assert_eq!(z[0].to_string(), "3034423619 -1h");
        assert!(parse_time_zones("3034423619").is_err());
    }
}
