use crate::sdp::addr_type::AddrType;
use crate::sdp::sdp_error::LineError;
use std::{fmt, str::FromStr};

/// Connection data (`c=` line), at session or media level.
///
/// The connection address may carry slash-separated suffixes:
/// `<addr>/<ttl>/<addresses-num>` for IPv4 and `<addr>/<addresses-num>` for
/// IPv6. The suffixes are remembered exactly as they appeared so that a
/// decoded line encodes back to the same text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    net_type: String,
    addr_type: AddrType,
    address: String,
    ttl: Option<u32>,
    addresses_num: Option<u32>,
}

impl Connection {
    /// Creates a plain unicast connection without TTL or address count.
    ///
    /// # Example
    /// ```rust, ignore
    /// let conn = Connection::new("IN", AddrType::IP4, "0.0.0.0");
    /// ```
    pub fn new(net_type: impl Into<String>, addr_type: AddrType, address: impl Into<String>) -> Self {
        Self {
            net_type: net_type.into(),
            addr_type,
            address: address.into(),
            ttl: None,
            addresses_num: None,
        }
    }

    /// `IN IP4 0.0.0.0`, the placeholder used by every generated media section.
    #[must_use]
    pub fn new_unspecified() -> Self {
        Self::new("IN", AddrType::IP4, "0.0.0.0")
    }

    /// Sets the IPv4 multicast TTL. Ignored when encoding an IPv6 connection.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }

    #[must_use]
    pub const fn with_addresses_num(mut self, n: u32) -> Self {
        self.addresses_num = Some(n);
        self
    }

    // --- GETTERS ---

    #[must_use]
    pub fn net_type(&self) -> &str {
        &self.net_type
    }

    #[must_use]
    pub const fn addr_type(&self) -> AddrType {
        self.addr_type
    }

    /// Connection address without the `/ttl/num` suffixes.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// TTL of an IPv4 multicast address, `0` when absent.
    #[must_use]
    pub fn ttl(&self) -> u32 {
        self.ttl.unwrap_or(0)
    }

    /// Number of contiguous addresses, `1` when absent.
    #[must_use]
    pub fn addresses_num(&self) -> u32 {
        self.addresses_num.unwrap_or(1)
    }
}

fn parse_suffix(field: &'static str, s: &str) -> Result<u32, LineError> {
    s.parse::<u32>().map_err(LineError::parse_int(field))
}

impl FromStr for Connection {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // nettype addrtype address
        let parts: Vec<&str> = s.split(' ').collect();
        if parts.len() != 3 {
            return Err(LineError::invalid(
                "connection",
                format!("expected 3 fields, got {}", parts.len()),
            ));
        }
        let addr_type: AddrType = parts[1].parse()?;
        let mut segments = parts[2].split('/');
        let address = segments.next().unwrap_or_default();
        let rest: Vec<&str> = segments.collect();

        let mut conn = Self::new(parts[0], addr_type, address);
        match addr_type {
            AddrType::IP4 => {
                if rest.len() > 2 {
                    return Err(LineError::invalid("connection", "too many '/' segments"));
                }
                if let Some(ttl) = rest.first() {
                    conn.ttl = Some(parse_suffix("connection ttl", ttl)?);
                }
                if let Some(num) = rest.get(1) {
                    conn.addresses_num = Some(parse_suffix("connection addresses-num", num)?);
                }
            }
            AddrType::IP6 => {
                if rest.len() > 1 {
                    return Err(LineError::invalid("connection", "too many '/' segments"));
                }
                if let Some(num) = rest.first() {
                    conn.addresses_num = Some(parse_suffix("connection addresses-num", num)?);
                }
            }
        }
        Ok(conn)
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.net_type, self.addr_type, self.address)?;
        match self.addr_type {
            AddrType::IP4 => {
                if let Some(ttl) = self.ttl {
                    write!(f, "/{ttl}")?;
                    if let Some(n) = self.addresses_num {
                        write!(f, "/{n}")?;
                    }
                }
            }
            AddrType::IP6 => {
                if let Some(n) = self.addresses_num {
                    write!(f, "/{n}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn plain_ipv4_defaults() {
        let c: Connection = "IN IP4 127.0.0.1".parse().unwrap();
        assert_eq!(c.net_type(), "IN");
        assert_eq!(c.addr_type(), AddrType::IP4);
        assert_eq!(c.address(), "127.0.0.1");
        assert_eq!(c.ttl(), 0);
        assert_eq!(c.addresses_num(), 1);
        assert_eq!(c.to_string(), "IN IP4 127.0.0.1");
    }

    #[test]
    fn ipv4_multicast_with_ttl_and_count() {
        let c: Connection = "IN IP4 224.2.1.1/127/3".parse().unwrap();
        assert_eq!(c.address(), "224.2.1.1");
        assert_eq!(c.ttl(), 127);
        assert_eq!(c.addresses_num(), 3);
        assert_eq!(c.to_string(), "IN IP4 224.2.1.1/127/3");

        let only_ttl: Connection = "IN IP4 224.2.17.12/127".parse().unwrap();
        assert_eq!(only_ttl.addresses_num(), 1);
        assert_eq!(only_ttl.to_string(), "IN IP4 224.2.17.12/127");
    }

    #[test]
    fn ipv6_second_segment_is_address_count() {
        let c: Connection = "IN IP6 ff15::101/3".parse().unwrap();
        assert_eq!(c.ttl(), 0);
        assert_eq!(c.addresses_num(), 3);
        assert!("IN IP6 ff15::101/3/4".parse::<Connection>().is_err());
    }

    #[test]
    fn rejects_wrong_field_count_and_bad_numbers() {
        assert!("IN IP4".parse::<Connection>().is_err());
        assert!("IN IP4 1.2.3.4 extra".parse::<Connection>().is_err());
        assert!(matches!(
            "IN IP4 224.2.1.1/abc".parse::<Connection>(),
            Err(LineError::ParseInt { field: "connection ttl", .. })
        ));
        assert!("IN IP4 224.2.1.1/1/2/3".parse::<Connection>().is_err());
    }
}
