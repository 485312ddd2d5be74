//! Error codes for the record reader.
//!
//! - `E0xx` - Field scanning errors
//! - `E1xx` - Record errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unterminated quoted field.
    ///
    /// A field was opened with a double quote that is not closed before the
    /// end of the line.
    E001,

    /// Unexpected character after a quoted field.
    ///
    /// A closing quote must be followed by a comma or the end of the line.
    E002,

    /// Duplicate identifier.
    ///
    /// Two included records carry the same identifier.
    E100,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated quoted field",
            ErrorCode::E002 => "unexpected character after quoted field",
            ErrorCode::E100 => "duplicate identifier",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
