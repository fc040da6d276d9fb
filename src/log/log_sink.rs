use crate::log::log_level::LogLevel;
use std::sync::Arc;

/// Destination for log records. Implementations must never block the caller.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str, target: &'static str);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        (**self).log(level, msg, target);
    }
}

impl<T: LogSink + ?Sized> LogSink for &T {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        (**self).log(level, msg, target);
    }
}
