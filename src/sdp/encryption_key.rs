use crate::sdp::sdp_error::LineError;
use std::{fmt, str::FromStr};

/// A `k=<method>[:<key>]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionKey {
    pub method: String,
    pub key: Option<String>,
}

impl EncryptionKey {
    pub fn new(method: impl Into<String>, key: Option<String>) -> Self {
        Self {
            method: method.into(),
            key,
        }
    }
}

impl FromStr for EncryptionKey {
    type Err = LineError;

    /// A key containing `:` cannot be told apart from the separator, so more
    /// than one colon is rejected instead of being split arbitrarily.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [method] => Ok(Self::new(*method, None)),
            [method, key] if key.is_empty() => Ok(Self::new(*method, None)),
            [method, key] => Ok(Self::new(*method, Some((*key).to_owned()))),
            _ => Err(LineError::Format),
        }
    }
}

impl fmt::Display for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) if !key.is_empty() => write!(f, "{}:{}", self.method, key),
            _ => f.write_str(&self.method),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn method_with_and_without_key() {
        let k: EncryptionKey = "clear:secret".parse().unwrap();
        assert_eq!(k, EncryptionKey::new("clear", Some("secret".into())));
        assert_eq!(k.to_string(), "clear:secret");

        let prompt: EncryptionKey = "prompt".parse().unwrap();
        assert_eq!(prompt.key, None);
        assert_eq!(prompt.to_string(), "prompt");
    }

    #[test]
    fn second_colon_is_a_format_error() {
        assert!(matches!(
            "uri:http://example.com".parse::<EncryptionKey>(),
            Err(LineError::Format)
        ));
    }
}
