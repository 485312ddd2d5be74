//! Error adapter for converting StemmaError to miette diagnostics.
//!
//! Record file problems point into the file: one report per diagnostic,
//! with its labelled spans. Tree problems have no location, so their report
//! names the records involved instead.
//!
//! | failure                   | code                        |
//! |---------------------------|-----------------------------|
//! | record file               | `E001`, `E002`, `E100`      |
//! | id shared by two records  | `stemma::tree::duplicate`   |
//! | parent references loop    | `stemma::tree::cycle`       |
//! | `[layout]` settings       | `stemma::config`            |
//! | reading or writing files  | `stemma::io`                |
//! | rendering                 | `stemma::export`            |

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use stemma::{StemmaError, tree::TreeError};
use stemma_parser::error::Diagnostic;

/// A report ready for miette's handlers.
pub type Reportable<'a> = Box<dyn MietteDiagnostic + 'a>;

/// One record file diagnostic together with the file it points into.
#[derive(Debug)]
struct RecordReport<'a> {
    diag: &'a Diagnostic,
    src: &'a str,
}

impl fmt::Display for RecordReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.diag.message())
    }
}

impl std::error::Error for RecordReport<'_> {}

impl MietteDiagnostic for RecordReport<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|code| Box::new(code) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|help| Box::new(help) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Any other failure, reported with a stable code and, where the user can
/// act on it, a hint naming what to change.
#[derive(Debug)]
struct StageReport<'a>(&'a StemmaError);

impl fmt::Display for StageReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl std::error::Error for StageReport<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for StageReport<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            StemmaError::Io(_) => "stemma::io",
            StemmaError::Parse { .. } => return None,
            StemmaError::Tree(TreeError::DuplicateId(_)) => "stemma::tree::duplicate",
            StemmaError::Tree(TreeError::CyclicReference { .. }) => "stemma::tree::cycle",
            StemmaError::Layout(_) => "stemma::config",
            StemmaError::Export(_) => "stemma::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            StemmaError::Tree(TreeError::DuplicateId(id)) => {
                format!("rename one of the records with id `{id}`")
            }
            StemmaError::Tree(TreeError::CyclicReference { ids }) => format!(
                "clear the parent id of one of {} to attach it to the top of the tree",
                ids.iter()
                    .map(|id| format!("`{id}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            StemmaError::Layout(_) => "fix the [layout] section of the config file".to_string(),
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// Convert a [`StemmaError`] into a list of reports.
///
/// [`StemmaError::Parse`] yields one report per diagnostic; every other
/// variant yields a single one.
pub fn to_reportables(err: &StemmaError) -> Vec<Reportable<'_>> {
    match err {
        StemmaError::Parse {
            err: parse_err,
            src,
        } => parse_err
            .diagnostics()
            .iter()
            .map(|diag| Box::new(RecordReport { diag, src }) as Reportable<'_>)
            .collect(),
        _ => vec![Box::new(StageReport(err)) as Reportable<'_>],
    }
}

#[cfg(test)]
mod tests {
    use stemma_parser::{
        Span,
        error::{ErrorCode, ParseError},
    };

    use super::*;

    fn code(report: &Reportable<'_>) -> Option<String> {
        report.code().map(|code| code.to_string())
    }

    fn help(report: &Reportable<'_>) -> Option<String> {
        report.help().map(|help| help.to_string())
    }

    #[test]
    fn test_every_record_diagnostic_is_reported() {
        let diags = vec![
            Diagnostic::error("quoted field is never closed")
                .with_code(ErrorCode::E001)
                .with_label(Span::new(0..5), "unterminated quoted field")
                .with_help("add the closing `\"`"),
            Diagnostic::error("unexpected character after a quoted field")
                .with_code(ErrorCode::E002)
                .with_label(Span::new(10..11), "text after closing quote"),
        ];
        let err = StemmaError::new_parse_error(ParseError::new(diags), "\"Jean,\"Paul\"x,,");

        let reports = to_reportables(&err);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].to_string(), "quoted field is never closed");
        assert_eq!(code(&reports[0]).as_deref(), Some("E001"));
        assert_eq!(help(&reports[0]).as_deref(), Some("add the closing `\"`"));
        assert_eq!(code(&reports[1]).as_deref(), Some("E002"));
        assert!(reports[0].source_code().is_some());
    }

    #[test]
    fn test_duplicate_id_labels_both_rows() {
        let diag = Diagnostic::error("identifier `I2` is used by more than one record")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(20..22), "duplicate")
            .with_secondary_label(Span::new(3..5), "first used here");
        let err = StemmaError::new_parse_error(
            ParseError::from(diag),
            "1, I2, yes\n1, I1, yes\n1, I2, no",
        );

        let reports = to_reportables(&err);
        let labels: Vec<_> = reports[0].labels().unwrap().collect();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].primary());
        assert_eq!(labels[1].label(), Some("first used here"));
        assert!(!labels[1].primary());
    }

    #[test]
    fn test_cycle_names_every_record() {
        let err = StemmaError::Tree(TreeError::CyclicReference {
            ids: vec!["I02".to_string(), "I03".to_string()],
        });

        let reports = to_reportables(&err);

        assert_eq!(reports.len(), 1);
        assert_eq!(code(&reports[0]).as_deref(), Some("stemma::tree::cycle"));
        let help = help(&reports[0]).unwrap();
        assert!(help.contains("`I02`, `I03`"), "{help}");
        assert!(reports[0].labels().is_none());
    }

    #[test]
    fn test_duplicate_tree_id_is_named() {
        let err = StemmaError::Tree(TreeError::DuplicateId("I07".to_string()));

        let reports = to_reportables(&err);

        assert_eq!(code(&reports[0]).as_deref(), Some("stemma::tree::duplicate"));
        assert!(help(&reports[0]).unwrap().contains("`I07`"));
    }

    #[test]
    fn test_layout_error_points_at_config() {
        let err = StemmaError::Layout("`scale` must be a positive number, got 0".to_string());

        let reports = to_reportables(&err);

        assert_eq!(
            reports[0].to_string(),
            "Layout error: `scale` must be a positive number, got 0"
        );
        assert_eq!(code(&reports[0]).as_deref(), Some("stemma::config"));
        assert!(help(&reports[0]).unwrap().contains("[layout]"));
    }

    #[test]
    fn test_io_error_has_no_help() {
        let err = StemmaError::Io(std::io::Error::other("disk full"));

        let reports = to_reportables(&err);

        assert_eq!(code(&reports[0]).as_deref(), Some("stemma::io"));
        assert_eq!(help(&reports[0]), None);
    }
}
