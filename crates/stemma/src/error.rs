//! Error types for Stemma operations.
//!
//! This module provides the main error type [`StemmaError`] which wraps the
//! error conditions of every pipeline stage.

use std::io;

use thiserror::Error;

use stemma_parser::error::ParseError;

use crate::tree::TreeError;

/// The main error type for Stemma operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the record file alongside the diagnostics so
/// callers can render source snippets.
#[derive(Debug, Error)]
pub enum StemmaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl From<crate::export::Error> for StemmaError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl StemmaError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
