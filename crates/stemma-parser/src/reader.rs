//! Field scanner for one line of the record file.
//!
//! A line is a comma separated list of fields. A field is either unquoted
//! (surrounding whitespace trimmed) or wrapped in double quotes, in which
//! case commas are literal and `""` stands for one `"`. Empty fields are
//! reported as `None`.

use winnow::{
    Parser as _,
    ascii::space0,
    combinator::{alt, cut_err, eof, peek, preceded, repeat, separated, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{none_of, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Diagnostic context attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: &'static str,
    /// Start of the error span; `None` marks only the offending character.
    start: Option<usize>,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<FieldDiagnostic>>;

/// One scanned field with its span relative to the whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Field {
    pub value: Option<String>,
    pub span: Span,
}

fn quoted_char(input: &mut Input<'_>) -> IResult<char> {
    alt(("\"\"".value('"'), none_of('"'))).parse_next(input)
}

fn quoted_content(input: &mut Input<'_>) -> IResult<String> {
    repeat(0.., quoted_char)
        .fold(String::new, |mut acc: String, ch: char| {
            acc.push(ch);
            acc
        })
        .parse_next(input)
}

/// A closing quote may only be followed by blanks and then a comma or the
/// end of the line.
fn after_quote(input: &mut Input<'_>) -> IResult<()> {
    cut_err((space0, peek(alt((','.void(), eof.void())))))
        .void()
        .context(FieldDiagnostic {
            code: ErrorCode::E002,
            message: "unexpected character after a quoted field",
            help: "put a comma after the closing `\"` or quote the whole field",
            start: None,
        })
        .parse_next(input)
}

fn quoted_field(input: &mut Input<'_>) -> IResult<String> {
    let start = input.current_token_start();
    terminated(
        preceded(
            '"',
            cut_err(terminated(quoted_content, '"')).context(FieldDiagnostic {
                code: ErrorCode::E001,
                message: "quoted field is never closed",
                help: "add the closing `\"` or remove the opening one",
                start: Some(start),
            }),
        ),
        after_quote,
    )
    .parse_next(input)
}

fn unquoted_field(input: &mut Input<'_>) -> IResult<String> {
    take_while(0.., |c: char| c != ',')
        .map(|raw: &str| raw.trim().to_string())
        .parse_next(input)
}

fn field(input: &mut Input<'_>) -> IResult<Option<String>> {
    preceded(space0, alt((quoted_field, unquoted_field)))
        .map(|value: String| Some(value).filter(|v| !v.is_empty()))
        .parse_next(input)
}

fn record(input: &mut Input<'_>) -> IResult<Vec<(Option<String>, std::ops::Range<usize>)>> {
    terminated(separated(1.., field.with_span(), ','), eof).parse_next(input)
}

/// Scans one line (without its line terminator) into fields.
///
/// `offset` is the byte position of the line within the file; it is added to
/// every span so diagnostics point into the whole source.
pub(crate) fn scan_line(line: &str, offset: usize) -> Result<Vec<Field>, Diagnostic> {
    let mut input = LocatingSlice::new(line);
    match record(&mut input) {
        Ok(fields) => Ok(fields
            .into_iter()
            .map(|(value, range)| Field {
                value,
                span: Span::new(range).shift(offset),
            })
            .collect()),
        Err(err) => {
            let error_pos = input.current_token_start();
            Err(convert_err_mode(err, error_pos, line.len(), offset))
        }
    }
}

/// Reads only the first field of a line.
///
/// Returns `None` when that field is itself malformed, so the full scan can
/// report it.
pub(crate) fn leading_field(line: &str) -> Option<Option<String>> {
    let mut input = LocatingSlice::new(line);
    field.parse_next(&mut input).ok()
}

/// Turns a winnow error into a [`Diagnostic`].
///
/// Falls back to E002 at the error position when no context was attached.
fn convert_err_mode(
    err: ErrMode<ContextError<FieldDiagnostic>>,
    error_pos: usize,
    line_len: usize,
    offset: usize,
) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };
    let char_span = Span::new(error_pos..(error_pos + 1).min(line_len));

    if let Some(FieldDiagnostic {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let span = match start {
            Some(start) => Span::new(*start..error_pos.max(*start + 1)),
            None => char_span,
        };
        return Diagnostic::error(*message)
            .with_code(*code)
            .with_label(span.shift(offset), code.description())
            .with_help(*help);
    }

    Diagnostic::error("unexpected character")
        .with_code(ErrorCode::E002)
        .with_label(char_span.shift(offset), ErrorCode::E002.description())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(line: &str) -> Vec<Option<String>> {
        scan_line(line, 0)
            .expect("line should scan")
            .into_iter()
            .map(|f| f.value)
            .collect()
    }

    #[test]
    fn test_plain_fields() {
        assert_eq!(
            values("1,I1,yes,Jean"),
            vec![
                Some("1".to_string()),
                Some("I1".to_string()),
                Some("yes".to_string()),
                Some("Jean".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_fields_are_none() {
        assert_eq!(
            values("1, ,,x"),
            vec![Some("1".to_string()), None, None, Some("x".to_string())]
        );
    }

    #[test]
    fn test_unquoted_fields_are_trimmed() {
        assert_eq!(values("  a  ,\tb"), vec![Some("a".to_string()), Some("b".to_string())]);
    }

    #[test]
    fn test_quoted_field_keeps_commas_and_escaped_quotes() {
        assert_eq!(
            values(r#"1,"Martin, ""Jr""",x"#),
            vec![
                Some("1".to_string()),
                Some(r#"Martin, "Jr""#.to_string()),
                Some("x".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_field_followed_by_blanks() {
        assert_eq!(
            values(r#""ab"  ,c"#),
            vec![Some("ab".to_string()), Some("c".to_string())]
        );
    }

    #[test]
    fn test_empty_quoted_field_is_none() {
        assert_eq!(values(r#""",a"#), vec![None, Some("a".to_string())]);
    }

    #[test]
    fn test_field_spans_are_offset() {
        let fields = scan_line("ab,cd", 100).unwrap();
        assert_eq!(fields[0].span, Span::new(100..102));
        assert_eq!(fields[1].span, Span::new(103..105));
    }

    #[test]
    fn test_leading_field_ignores_the_rest_of_the_line() {
        assert_eq!(leading_field(r#"0,I2,yes,"draft,,M"#), Some(Some("0".to_string())));
        assert_eq!(leading_field(r#" "1" ,I2"#), Some(Some("1".to_string())));
        assert_eq!(leading_field(",I2"), Some(None));
        assert_eq!(leading_field(r#""1,I2"#), None);
    }

    #[test]
    fn test_unterminated_quote() {
        let line = r#"1,I7,"Marie,Martin"#;
        let diag = scan_line(line, 10).unwrap_err();

        assert_eq!(diag.code(), Some(ErrorCode::E001));
        let span = diag.labels()[0].span();
        assert_eq!(span.start(), 15);
        assert_eq!(span.end(), 10 + line.len());
    }

    #[test]
    fn test_junk_after_closing_quote() {
        let diag = scan_line(r#""ab"c,d"#, 0).unwrap_err();

        assert_eq!(diag.code(), Some(ErrorCode::E002));
        assert_eq!(diag.labels()[0].span(), Span::new(4..5));
    }
}
