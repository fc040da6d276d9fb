//! Leveled logging macros over any [`LogSink`](crate::log::log_sink::LogSink).
//!
//! # Feature Flags
//! Levels are controlled by cargo features `log-trace`, `log-debug`,
//! `log-info`, `log-warn`, `log-error`; each one enables the next.
//! A disabled level expands to a dead `if false` block evaluating to `()`:
//! arguments are still type-checked but the message is never formatted.
//!
//! ```rust
//! use rustyjsep::log::NoopLogSink;
//! use rustyjsep::sink_info;
//!
//! let sink = NoopLogSink;
//! sink_info!(sink, "[JSEP] {} -> {}", "stable", "have-local-offer");
//! ```

#[macro_export]
macro_rules! sink_log {
    ($sink:expr, $lvl:expr, $($arg:tt)*) => {{
        let __msg = format!($($arg)*);
        $crate::log::log_sink::LogSink::log(&$sink, $lvl, &__msg, module_path!());
    }};
}

// ---------------------- TRACE ----------------------
#[cfg(feature = "log-trace")]
#[macro_export]
macro_rules! sink_trace { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Trace, $($arg)*) } }

#[cfg(not(feature = "log-trace"))]
#[macro_export]
macro_rules! sink_trace {
    ($sink:expr, $($arg:tt)*) => {
        if false {
            $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Trace, $($arg)*)
        }
    };
}

// ---------------------- DEBUG ----------------------
#[cfg(feature = "log-debug")]
#[macro_export]
macro_rules! sink_debug { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Debug, $($arg)*) } }

#[cfg(not(feature = "log-debug"))]
#[macro_export]
macro_rules! sink_debug {
    ($sink:expr, $($arg:tt)*) => {
        if false {
            $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Debug, $($arg)*)
        }
    };
}

// ---------------------- INFO ----------------------
#[cfg(feature = "log-info")]
#[macro_export]
macro_rules! sink_info { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Info, $($arg)*) } }

#[cfg(not(feature = "log-info"))]
#[macro_export]
macro_rules! sink_info {
    ($sink:expr, $($arg:tt)*) => {
        if false {
            $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Info, $($arg)*)
        }
    };
}

// ---------------------- WARN ----------------------
#[cfg(feature = "log-warn")]
#[macro_export]
macro_rules! sink_warn { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Warn, $($arg)*) } }

#[cfg(not(feature = "log-warn"))]
#[macro_export]
macro_rules! sink_warn {
    ($sink:expr, $($arg:tt)*) => {
        if false {
            $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Warn, $($arg)*)
        }
    };
}

// ---------------------- ERROR ----------------------
#[cfg(feature = "log-error")]
#[macro_export]
macro_rules! sink_error { ($sink:expr, $($arg:tt)*) => { $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Error, $($arg)*) } }

#[cfg(not(feature = "log-error"))]
#[macro_export]
macro_rules! sink_error {
    ($sink:expr, $($arg:tt)*) => {
        if false {
            $crate::sink_log!($sink, $crate::log::log_level::LogLevel::Error, $($arg)*)
        }
    };
}
