use crate::log::log_level::LogLevel;
use std::fmt;
use std::time::SystemTime;

/// Milliseconds since the Unix epoch, `0` if the clock is before it.
#[must_use]
pub fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// A single log record travelling from a sink to the logger worker.
#[derive(Debug, Clone)]
pub struct LogMsg {
    pub level: LogLevel,
    /// Milliseconds since the Unix epoch.
    pub ts_ms: u128,
    pub text: String,
    /// Module path of the call site.
    pub target: &'static str,
}

impl LogMsg {
    /// Creates a record stamped with the given time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rustyjsep::log::{log_level::LogLevel, log_msg::LogMsg};
    ///
    /// let msg = LogMsg::new(LogLevel::Info, "[JSEP] stable -> have-local-offer", "jsep", 1);
    /// assert_eq!(msg.to_string(), "[INFO] 1 jsep | [JSEP] stable -> have-local-offer");
    /// ```
    pub fn new(level: LogLevel, text: impl Into<String>, target: &'static str, ts_ms: u128) -> Self {
        Self {
            level,
            ts_ms,
            text: text.into(),
            target,
        }
    }

    /// Creates a record stamped with the current time.
    pub fn now(level: LogLevel, text: impl Into<String>, target: &'static str) -> Self {
        Self::new(level, text, target, now_millis())
    }
}

impl fmt::Display for LogMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {} | {}", self.level, self.ts_ms, self.target, self.text)
    }
}
