//! Crate-wide error types.
//!
//! Mirrors the shape of a host-facing `SubforgeError`: a stable `ErrorCode`
//! plus positional context, so callers can match on `code` without parsing
//! message text.

use std::fmt;

/// Closed set of error codes surfaced at the parse/serialize boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidTimestamp,
    UnclosedTag,
    UnknownStyle,
    MalformedEvent,
    InvalidColor,
    InvalidSection,
    MissingField,
    InvalidEncoding,
    DuplicateStyle,
    DuplicateId,
    InvalidFormat,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidTimestamp => "INVALID_TIMESTAMP",
            Self::UnclosedTag => "UNCLOSED_TAG",
            Self::UnknownStyle => "UNKNOWN_STYLE",
            Self::MalformedEvent => "MALFORMED_EVENT",
            Self::InvalidColor => "INVALID_COLOR",
            Self::InvalidSection => "INVALID_SECTION",
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidEncoding => "INVALID_ENCODING",
            Self::DuplicateStyle => "DUPLICATE_STYLE",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::InvalidFormat => "INVALID_FORMAT",
        };
        f.write_str(s)
    }
}

/// A single parse or serialize failure, with enough context to report to a
/// user and enough structure for a caller to match on programmatically.
#[derive(Debug, Clone, thiserror::Error)]
#[error("[{code}] {message} at line {line}, column {column}")]
pub struct SubforgeError {
    pub code: ErrorCode,
    pub line: usize,
    pub column: usize,
    pub message: String,
    /// The raw input fragment that triggered the error, if available.
    pub raw: Option<String>,
}

impl SubforgeError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            line: 0,
            column: 0,
            message: message.into(),
            raw: None,
        }
    }

    pub fn at_line(code: ErrorCode, line: usize, message: impl Into<String>) -> Self {
        Self {
            code,
            line,
            column: 0,
            message: message.into(),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    pub fn with_column(mut self, column: usize) -> Self {
        self.column = column;
        self
    }
}

/// A non-fatal observation surfaced alongside a partially or fully parsed
/// document (e.g. a style reference that resolved to "Default").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub line: usize,
    pub message: String,
}

impl Warning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// How a parser should react to a recoverable, event-local error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Abort parsing at the first recoverable error.
    Throw,
    /// Silently drop the offending entry and continue.
    Skip,
    /// Record the error in `ParseResult::errors` and keep going.
    #[default]
    Collect,
}
