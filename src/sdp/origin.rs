use crate::sdp::addr_type::AddrType;
use crate::sdp::sdp_error::LineError;
use std::{fmt, str::FromStr};

/// The `o=` line of a session description.
///
/// - `username`: login of the originating user, `-` when not available.
/// - `session_id`: numeric identifier that stays stable for the whole session.
/// - `session_version`: bumped every time the description is regenerated.
/// - `net_type`: network type, `IN` for Internet.
/// - `addr_type`: address type (IPv4 or IPv6).
/// - `unicast_address`: address of the machine that created the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    username: String,
    session_id: i64,
    session_version: i64,
    net_type: String,
    addr_type: AddrType,
    unicast_address: String,
}

impl Origin {
    /// Builds an `Origin` from all of its fields.
    ///
    /// # Example
    /// ```rust
    /// use rustyjsep::sdp::{addr_type::AddrType, origin::Origin};
    /// let origin = Origin::new("-", 42, 0, "IN", AddrType::IP4, "0.0.0.0");
    /// assert_eq!(origin.to_string(), "- 42 0 IN IP4 0.0.0.0");
    /// ```
    pub fn new(
        username: impl Into<String>,
        session_id: i64,
        session_version: i64,
        net_type: impl Into<String>,
        addr_type: AddrType,
        unicast_address: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            session_id,
            session_version,
            net_type: net_type.into(),
            addr_type,
            unicast_address: unicast_address.into(),
        }
    }

    /// Origin used for locally generated descriptions: `- <id> <version> IN IP4 0.0.0.0`.
    #[must_use]
    pub fn new_local(session_id: i64, session_version: i64) -> Self {
        Self::new("-", session_id, session_version, "IN", AddrType::IP4, "0.0.0.0")
    }

    // ---------------- Getters ----------------

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn session_id(&self) -> i64 {
        self.session_id
    }

    #[must_use]
    pub const fn session_version(&self) -> i64 {
        self.session_version
    }

    #[must_use]
    pub fn net_type(&self) -> &str {
        &self.net_type
    }

    #[must_use]
    pub const fn addr_type(&self) -> AddrType {
        self.addr_type
    }

    #[must_use]
    pub fn unicast_address(&self) -> &str {
        &self.unicast_address
    }

    // ---------------- Setters ----------------

    pub fn set_username<U: Into<String>>(&mut self, username: U) {
        self.username = username.into();
    }

    pub const fn set_session_id(&mut self, session_id: i64) {
        self.session_id = session_id;
    }

    pub const fn set_session_version(&mut self, session_version: i64) {
        self.session_version = session_version;
    }

    pub fn set_unicast_address<U: Into<String>>(&mut self, unicast_address: U) {
        self.unicast_address = unicast_address.into();
    }
}

impl FromStr for Origin {
    type Err = LineError;

    /// Parses `<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(' ').collect();
        if fields.len() != 6 {
            return Err(LineError::invalid(
                "originator",
                format!("expected 6 fields, got {}", fields.len()),
            ));
        }
        Ok(Self::new(
            fields[0],
            fields[1]
                .parse::<i64>()
                .map_err(LineError::parse_int("originator sess-id"))?,
            fields[2]
                .parse::<i64>()
                .map_err(LineError::parse_int("originator sess-version"))?,
            fields[3],
            fields[4].parse()?,
            fields[5],
        ))
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.username,
            self.session_id,
            self.session_version,
            self.net_type,
            self.addr_type,
            self.unicast_address
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::{AddrType, Origin};
    use crate::sdp::sdp_error::LineError;

    #[test]
    fn parses_six_fields() {
        let o: Origin = "jdoe 2890844526 2890842807 IN IP4 10.47.16.5".parse().unwrap();
        assert_eq!(o.username(), "jdoe");
        assert_eq!(o.session_id(), 2_890_844_526);
        assert_eq!(o.session_version(), 2_890_842_807);
        assert_eq!(o.net_type(), "IN");
        assert_eq!(o.addr_type(), AddrType::IP4);
        assert_eq!(o.unicast_address(), "10.47.16.5");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(matches!(
            "- 0 2 IN IP4".parse::<Origin>(),
            Err(LineError::Invalid { field: "originator", .. })
        ));
        assert!("- 0 2 IN IP4 127.0.0.1 extra".parse::<Origin>().is_err());
    }

    #[test]
    fn rejects_non_numeric_session_id() {
        assert!(matches!(
            "- abc 2 IN IP4 127.0.0.1".parse::<Origin>(),
            Err(LineError::ParseInt { field: "originator sess-id", .. })
        ));
    }

    #[test]
    fn negative_ids_round_trip() {
        let o = Origin::new("-", -5, 7, "IN", AddrType::IP6, "::1");
        let text = o.to_string();
        assert_eq!(text, "- -5 7 IN IP6 ::1");
        assert_eq!(text.parse::<Origin>().unwrap(), o);
    }

    #[test]
    fn setters_update_fields() {
        let mut o = Origin::new_local(1, 0);
        o.set_username("alice");
        o.set_session_id(100);
        o.set_session_version(101);
        o.set_unicast_address("192.168.1.2");
        assert_eq!(o.to_string(), "alice 100 101 IN IP4 192.168.1.2");
    }
}
