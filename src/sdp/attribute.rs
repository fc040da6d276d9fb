use std::{fmt, str::FromStr};

/// An `a=` line in SDP.
///
/// An attribute is a name plus an optional value. `value == None` is a flag
/// attribute such as `a=sendrecv` or `a=rtcp-rsize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    /// Builds a `name:value` attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Builds a flag attribute with no value.
    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// Value of the attribute, `None` for flags.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn is_flag(&self) -> bool {
        self.value().is_none()
    }
}

impl FromStr for Attribute {
    type Err = std::convert::Infallible;

    /// Splits at the first `:`. Everything after it, colons included, is the
    /// value, so `fingerprint:sha-256 AB:CD` keeps its hex pairs intact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.split_once(':') {
            Some((name, "")) => Self::flag(name),
            Some((name, value)) => Self::new(name, value),
            None => Self::flag(s),
        })
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "{}:{}", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

/// Ordered attribute list shared by the session and every media section.
///
/// Lookups are by exact name and return the first match in insertion order.
pub trait AttributeList {
    fn attributes(&self) -> &[Attribute];
    fn attributes_mut(&mut self) -> &mut Vec<Attribute>;

    fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().iter().find(|a| a.name == name)
    }

    /// Value of the first attribute called `name`. Flags yield `None`.
    fn attribute_value(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Attribute::value)
    }

    fn attributes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Attribute> + 'a {
        self.attributes().iter().filter(move |a| a.name == name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes_mut().push(Attribute::new(name, value));
    }

    fn add_flag(&mut self, name: impl Into<String>) {
        self.attributes_mut().push(Attribute::flag(name));
    }

    /// Removes every attribute called `name`, returning how many were dropped.
    fn remove_attributes(&mut self, name: &str) -> usize {
        let attrs = self.attributes_mut();
        let before = attrs.len();
        attrs.retain(|a| a.name != name);
        before - attrs.len()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    struct Bag(Vec<Attribute>);

    impl AttributeList for Bag {
        fn attributes(&self) -> &[Attribute] {
            &self.0
        }
        fn attributes_mut(&mut self) -> &mut Vec<Attribute> {
            &mut self.0
        }
    }

    #[test]
    fn flag_and_value_forms() {
        let flag: Attribute = "sendrecv".parse().unwrap();
        assert!(flag.is_flag());
        assert_eq!(flag.to_string(), "sendrecv");

        let rtpmap: Attribute = "rtpmap:96 opus/48000/2".parse().unwrap();
        assert_eq!(rtpmap.name, "rtpmap");
        assert_eq!(rtpmap.value(), Some("96 opus/48000/2"));
        assert_eq!(rtpmap.to_string(), "rtpmap:96 opus/48000/2");
    }

    #[test]
    fn value_keeps_inner_colons() {
        let fp: Attribute = "fingerprint:sha-256 AB:CD:EF".parse().unwrap();
        assert_eq!(fp.value(), Some("sha-256 AB:CD:EF"));
        assert_eq!(fp.to_string(), "fingerprint:sha-256 AB:CD:EF");
    }

    #[test]
    fn empty_value_is_encoded_as_flag() {
        let a = Attribute {
            name: "recvonly".into(),
            value: Some(String::new()),
        };
        assert!(a.is_flag());
        assert_eq!(a.to_string(), "recvonly");
        assert!("foo:".parse::<Attribute>().unwrap().is_flag());
    }

    #[test]
    fn list_helpers_follow_insertion_order() {
        let mut bag = Bag(Vec::new());
        bag.add_attribute("rtpmap", "35 opus/48000");
        bag.add_flag("rtcp-rsize");
        bag.add_attribute("rtpmap", "36 H264 AVC/90000");

        assert_eq!(bag.attribute_value("rtpmap"), Some("35 opus/48000"));
        assert_eq!(bag.attributes_named("rtpmap").count(), 2);
        assert!(bag.has_attribute("rtcp-rsize"));
        assert_eq!(bag.attribute_value("rtcp-rsize"), None);

        assert_eq!(bag.remove_attributes("rtpmap"), 2);
        assert_eq!(bag.attributes().len(), 1);
    }
}
