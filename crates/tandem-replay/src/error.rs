//! Error types for sequence loading and line decoding.
//!
//! A partially-decoded sequence is never used: the first bad line is
//! fatal for the whole run, and the error names that line.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why a single line failed to decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecodeReason {
    /// The line did not split into the expected number of fields.
    FieldCount {
        /// Fields the grammar requires.
        expected: usize,
        /// Fields actually present.
        found: usize,
    },
    /// A field was not a parseable integer.
    IntField {
        /// Which field failed.
        field: &'static str,
        /// The offending token.
        value: String,
    },
    /// A numeric field was outside its documented range.
    OutOfRange {
        /// Which field was out of range.
        field: &'static str,
        /// The decoded value.
        value: i32,
        /// Inclusive minimum.
        min: i32,
        /// Inclusive maximum.
        max: i32,
    },
    /// A button field was something other than `0` or `1`.
    BadFlag {
        /// Which field was malformed.
        field: &'static str,
        /// The offending token.
        value: String,
    },
    /// A native-format line was not exactly twelve hex digits long.
    HexLength {
        /// The length actually found.
        found: usize,
    },
    /// A native-format line contained a non-hex character.
    HexDigit {
        /// The offending character.
        found: char,
    },
    /// A native-format record set reserved flag bits.
    FlagBits {
        /// The raw flags byte.
        bits: u8,
    },
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            Self::IntField { field, value } => {
                write!(f, "field '{field}' is not an integer: '{value}'")
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "field '{field}' = {value} outside [{min}, {max}]"),
            Self::BadFlag { field, value } => {
                write!(f, "field '{field}' must be 0 or 1, found '{value}'")
            }
            Self::HexLength { found } => {
                write!(f, "native record must be 12 hex digits, found {found}")
            }
            Self::HexDigit { found } => {
                write!(f, "native record contains non-hex character '{found}'")
            }
            Self::FlagBits { bits } => {
                write!(f, "native record sets reserved flag bits ({bits:#04x})")
            }
        }
    }
}

impl Error for DecodeReason {}

/// One input line does not parse under the selected controller grammar.
///
/// Carries the 1-based line number and the offending line text so the
/// failure is attributable from the error message alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    /// 1-based line number within the sequence source.
    pub line: usize,
    /// The offending line, as read.
    pub content: String,
    /// What was wrong with it.
    pub reason: DecodeReason,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} (input was '{}')",
            self.line, self.reason, self.content
        )
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.reason)
    }
}

/// Failure to produce an input sequence from a text resource.
#[derive(Debug)]
pub enum SequenceError {
    /// The sequence source is missing or unreadable.
    Resource {
        /// The file path, when the source is a file.
        path: Option<PathBuf>,
        /// The underlying I/O failure.
        source: io::Error,
    },
    /// One line failed to decode. The whole sequence is discarded.
    Decode(DecodeError),
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource {
                path: Some(p),
                source,
            } => write!(f, "input sequence '{}': {source}", p.display()),
            Self::Resource { path: None, source } => {
                write!(f, "input sequence stream: {source}")
            }
            Self::Decode(e) => write!(f, "{e}"),
        }
    }
}

impl Error for SequenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resource { source, .. } => Some(source),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<DecodeError> for SequenceError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}
