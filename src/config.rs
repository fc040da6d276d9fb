use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// INI-style settings: `[section]` headers, `key = value` pairs and `#` comments.
///
/// Keys written before the first header are globals and act as fallbacks for
/// the `*_or_default` lookups.
#[derive(Debug, Default)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: io::Error },
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Error reading file {path}: {source}"),
            Self::InvalidValue {
                section,
                key,
                value,
            } => write!(f, "Invalid value '{value}' for [{section}] {key}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl Config {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    /// [`ConfigError::Io`] when the file cannot be read.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Parses config text. Lines that are neither headers nor `key = value`
    /// pairs are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut config = Self::empty();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_string();
                let value = value.trim().trim_matches('"').to_string();

                match &current_section {
                    None => {
                        config.globals.insert(key, value);
                    }
                    Some(sec) => {
                        config
                            .sections
                            .entry(sec.clone())
                            .or_default()
                            .insert(key, value);
                    }
                }
            }
        }
        config
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(String::as_str)
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key)
            .or_else(|| self.get_global(key))
            .unwrap_or(default)
    }

    #[must_use]
    pub fn get_non_empty_or_default<'a>(
        &'a self,
        section: &str,
        key: &str,
        default: &'a str,
    ) -> &'a str {
        self.get_non_empty(section, key)
            .or_else(|| self.get_global(key).filter(|s| !s.is_empty()))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    const SAMPLE: &str = r#"
# global fallback
log_path = "/tmp/global"

[Negotiation]
bundle_policy = max-bundle
ice_candidate_pool_size =

[ICE]
servers = "stun:stun.l.google.com:19302"
"#;

    #[test]
    fn sections_and_globals() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get("Negotiation", "bundle_policy"), Some("max-bundle"));
        assert_eq!(cfg.get("ICE", "servers"), Some("stun:stun.l.google.com:19302"));
        assert_eq!(cfg.get_global("log_path"), Some("/tmp/global"));
        assert_eq!(cfg.get("Missing", "key"), None);
    }

    #[test]
    fn empty_values_fall_back() {
        let cfg = Config::parse(SAMPLE);
        assert_eq!(cfg.get("Negotiation", "ice_candidate_pool_size"), Some(""));
        assert_eq!(cfg.get_non_empty("Negotiation", "ice_candidate_pool_size"), None);
        assert_eq!(
            cfg.get_non_empty_or_default("Negotiation", "ice_candidate_pool_size", "0"),
            "0"
        );
        assert_eq!(cfg.get_or_default("Logging", "log_path", "logs"), "/tmp/global");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Config::load("/definitely/not/here.conf").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.conf"));
    }
}
