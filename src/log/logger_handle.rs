use std::sync::mpsc;

use crate::log::{
    log_level::LogLevel,
    log_msg::{LogMsg, now_millis},
    log_sink::LogSink,
};

/// Cloneable, non-blocking handle to the logger worker.
///
/// Records below `min_level` are discarded before allocation. When the bounded
/// queue is full the record is dropped, never waited on.
#[derive(Clone, Debug)]
pub struct LoggerHandle {
    pub(super) tx: mpsc::SyncSender<LogMsg>,
    pub(super) min_level: LogLevel,
}

impl LogSink for LoggerHandle {
    #[inline]
    fn log(&self, level: LogLevel, msg: &str, target: &'static str) {
        let _ = self.try_log(level, msg, target);
    }
}

impl LoggerHandle {
    #[must_use]
    pub const fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Enqueues a record stamped with the current time.
    ///
    /// Records below the handle's minimum level are accepted and dropped.
    ///
    /// # Errors
    /// - `TrySendError::Full` when the bounded queue is at capacity.
    /// - `TrySendError::Disconnected` when the worker has exited.
    pub fn try_log<S: Into<String>>(
        &self,
        level: LogLevel,
        text: S,
        target: &'static str,
    ) -> Result<(), mpsc::TrySendError<LogMsg>> {
        if level < self.min_level {
            return Ok(());
        }
        self.tx.try_send(LogMsg::new(level, text, target, now_millis()))
    }
}
