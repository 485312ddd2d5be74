//! Error and diagnostic system for the record reader.
//!
//! Structural problems in a record file (a quote that is never closed, text
//! trailing a closing quote, an identifier used twice) are reported as
//! [`Diagnostic`]s carrying an [`ErrorCode`], labelled byte spans into the
//! file and optional help text. All diagnostics of one file are returned
//! together inside a [`ParseError`].
//!
//! Rows that are merely incomplete (too few fields, unchecked, no id) are not
//! errors; they are skipped and logged.
//!
//! # Example
//!
//! ```
//! # use stemma_parser::error::{Diagnostic, ErrorCode};
//! # use stemma_parser::Span;
//!
//! let diag = Diagnostic::error("identifier `I12` is used by more than one record")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(120..123), "duplicate identifier")
//!     .with_secondary_label(Span::new(40..43), "first used here")
//!     .with_help("give every record its own identifier");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
