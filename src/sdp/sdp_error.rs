use std::fmt;
use std::io;
use std::num::ParseIntError;

/// Problem found while parsing a single `<key>=<value>` line.
///
/// The decoder wraps it into [`SdpError::Line`] together with the 1-based
/// line number, so the helpers that parse one field never need to know
/// where they are in the input.
#[derive(Debug)]
pub enum LineError {
    /// Line shorter than two characters or without `=` at index 1.
    Format,
    /// Key not allowed in the current (session or media) context.
    UnknownParameter(char),
    /// Field present but its value does not follow the grammar.
    Invalid { field: &'static str, reason: String },
    /// Numeric field that failed to parse.
    ParseInt {
        field: &'static str,
        source: ParseIntError,
    },
    /// Field that may appear at most once.
    Duplicate(&'static str),
    /// Session-only field found after the first `m=` line.
    AfterMedia(&'static str),
    RepeatBeforeTiming,
}

impl LineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn parse_int(field: &'static str) -> impl FnOnce(ParseIntError) -> Self {
        move |source| Self::ParseInt { field, source }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format => write!(f, "wrong line format"),
            Self::UnknownParameter(key) => write!(f, "unknown parameter type '{key}'"),
            Self::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::ParseInt { field, source } => write!(f, "invalid {field}: {source}"),
            Self::Duplicate(field) => write!(f, "multiple {field} fields"),
            Self::AfterMedia(field) => {
                write!(f, "{field} must be specified before the first media field")
            }
            Self::RepeatBeforeTiming => write!(f, "r= should not be specified before t="),
        }
    }
}

impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ParseInt { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors produced by the SDP decoder and encoder.
#[derive(Debug)]
pub enum SdpError {
    /// A line could not be parsed. `line` is 1-based.
    Line { line: usize, cause: LineError },
    /// `v=`, `o=` or `s=` never appeared.
    MissingRequiredFields,
    /// No session-level `c=` and at least one media section without one.
    MissingConnection,
    /// Reading the input or writing the output failed.
    Io(io::Error),
}

impl SdpError {
    /// Line number of the offending line, when the error refers to one.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl From<io::Error> for SdpError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for SdpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line { line, cause } => write!(f, "error while parsing line {line}: {cause}"),
            Self::MissingRequiredFields => write!(f, "not all required fields are set"),
            Self::MissingConnection => write!(
                f,
                "connection data must be set at session level or in every media description"
            ),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SdpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Line { cause, .. } => Some(cause),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}
