//! # Stemma Parser
//!
//! Reads a family record file into typed [`PersonRecord`]s.
//!
//! The file is comma separated text, one person per line, with a header
//! line. Columns, in order:
//!
//! | # | column          | meaning                                      |
//! |---|-----------------|----------------------------------------------|
//! | 0 | inclusion flag  | `1` includes the row, anything else skips it |
//! | 1 | id              | unique identifier, required                  |
//! | 2 | lineage flag    | `true`/`yes`/`1` for blood descendants       |
//! | 3 | first name      |                                              |
//! | 4 | last name       |                                              |
//! | 5 | sex             | `male`/`m`, `female`/`f`, anything else      |
//! | 6 | birth           | free text                                    |
//! | 7 | death           | free text                                    |
//! | 8 | wedding         | free text                                    |
//! | 9 | parent id       | id this row attaches beneath; blank for root |
//!
//! Further columns are ignored.
//!
//! ## Usage
//!
//! ```
//! # use stemma_parser::{parse, ParseOptions, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = "check,id,lineage,first,last,sex,birth,death,wedding,parent\n\
//!                   1,I1,yes,Jean,Barbaneau,M,1850,1920,,\n\
//!                   1,I2,no,Marie,Roux,F,1855,1930,1874,I1\n";
//!
//!     let records = parse(source, &ParseOptions::default())?;
//!     assert_eq!(records.len(), 2);
//!     assert_eq!(records[1].parent_ref(), Some("I1"));
//!     Ok(())
//! }
//! ```

pub mod error;
mod reader;
mod span;

use std::collections::HashMap;

use log::{debug, info};

use stemma_core::person::{PersonRecord, Sex};

use error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError};
use reader::Field;

pub use span::Span;

/// Number of columns a row needs to be considered.
const FIELD_COUNT: usize = 10;

/// Options for [`parse`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Skip the first line of the file.
    pub skip_header: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { skip_header: true }
    }
}

/// Parse a record file into person records, in file order.
///
/// Rows that are blank, shorter than ten fields, not marked for inclusion or
/// without an id are skipped. Structural problems (broken quoting, a
/// duplicated id) are collected and returned together.
///
/// # Errors
///
/// Returns a [`ParseError`] holding one [`Diagnostic`] per problem found.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Vec<PersonRecord>, ParseError> {
    let mut ingestor = Ingestor::default();

    for (line_number, (offset, line)) in lines(source).enumerate() {
        if options.skip_header && line_number == 0 {
            continue;
        }
        ingestor.ingest_line(line_number + 1, offset, line);
    }

    ingestor.finish()
}

/// Splits the source on `\n`, dropping a trailing `\r`, and pairs each line
/// with its byte offset.
fn lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    source.split('\n').map(move |raw| {
        let start = offset;
        offset += raw.len() + 1;
        (start, raw.strip_suffix('\r').unwrap_or(raw))
    })
}

fn is_lineage_flag(flag: Option<&str>) -> bool {
    flag.is_some_and(|flag| {
        let flag = flag.to_ascii_lowercase();
        matches!(flag.as_str(), "true" | "yes" | "1")
    })
}

#[derive(Debug, Default)]
struct Ingestor {
    records: Vec<PersonRecord>,
    id_spans: HashMap<String, Span>,
    diagnostics: DiagnosticCollector,
}

impl Ingestor {
    fn ingest_line(&mut self, line_number: usize, offset: usize, line: &str) {
        if line.trim().is_empty() {
            return;
        }

        // Unchecked rows are drafts; whatever follows the flag is not read.
        if matches!(reader::leading_field(line), Some(flag) if flag.as_deref() != Some("1")) {
            debug!(line = line_number; "Skipping row not marked for inclusion");
            return;
        }

        let fields = match reader::scan_line(line, offset) {
            Ok(fields) => fields,
            Err(diagnostic) => {
                self.diagnostics.emit(diagnostic);
                return;
            }
        };

        if fields.len() < FIELD_COUNT {
            debug!(line = line_number, fields = fields.len(); "Skipping short row");
            return;
        }
        let Some(id) = fields[1].value.clone() else {
            debug!(line = line_number; "Skipping row without id");
            return;
        };

        if let Some(first) = self.id_spans.get(&id) {
            self.diagnostics.emit(
                Diagnostic::error(format!("identifier `{id}` is used by more than one record"))
                    .with_code(ErrorCode::E100)
                    .with_label(fields[1].span, ErrorCode::E100.description())
                    .with_secondary_label(*first, "first used here")
                    .with_help("give every record its own identifier"),
            );
            return;
        }
        self.id_spans.insert(id.clone(), fields[1].span);

        self.records.push(Self::record_from_fields(id, fields));
    }

    fn record_from_fields(id: String, fields: Vec<Field>) -> PersonRecord {
        // Inclusion flag and id were checked by the caller.
        let mut values = fields.into_iter().skip(2).map(|field| field.value);
        let mut next = || values.next().flatten();

        let lineage = is_lineage_flag(next().as_deref());
        let first_name = next();
        let last_name = next();
        let sex = next().as_deref().map(Sex::from_marker).unwrap_or_default();

        PersonRecord::new(id)
            .with_lineage(lineage)
            .with_first_name(first_name)
            .with_last_name(last_name)
            .with_sex(sex)
            .with_birth(next())
            .with_death(next())
            .with_wedding(next())
            .with_parent_ref(next())
    }

    fn finish(self) -> Result<Vec<PersonRecord>, ParseError> {
        self.diagnostics.finish()?;
        info!(records = self.records.len(); "Records read");
        Ok(self.records)
    }
}
