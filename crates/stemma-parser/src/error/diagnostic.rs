//! The core diagnostic type.

use std::fmt;

use crate::{
    error::{error_code::ErrorCode, label::Label},
    span::Span,
};

/// An error in the record file with source location information.
///
/// # Example
///
/// ```text
/// error[E001]: quoted field is never closed
///   --> family.csv:4:21
///    |
///  4 | 1,I7,yes,"Marie,Martin,F,1890,,,I2
///    |          ^^^^^^^^^^^^^^^^^^^^^^^^^ unterminated quoted field
///    |
///    = help: add the closing `"` or remove the opening one
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use stemma_parser::error::{Diagnostic, ErrorCode};
    /// # use stemma_parser::Span;
    ///
    /// let diag = Diagnostic::error("quoted field is never closed")
    ///     .with_code(ErrorCode::E001)
    ///     .with_label(Span::new(9..34), "unterminated quoted field")
    ///     .with_help("add the closing `\"`");
    /// assert_eq!(diag.to_string(), "error[E001]: quoted field is never closed");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error")?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("identifier `I3` is used by more than one record")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(100..102), "duplicate identifier")
            .with_secondary_label(Span::new(50..52), "first used here")
            .with_help("give every record its own identifier");

        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(!diag.labels()[1].is_primary());
        assert_eq!(diag.help(), Some("give every record its own identifier"));
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::error("bad row");
        assert_eq!(diag.to_string(), "error: bad row");
    }
}
