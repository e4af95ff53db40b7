//! Pretty error reporting using ariadne
//!
//! Provides colorful, user-friendly error messages with source context.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::errors::LgoError;

fn describe(error: &LgoError) -> (&'static str, String) {
    match error {
        LgoError::Lexer { message, .. } => ("Lexer error", message.clone()),
        LgoError::Parser { message, .. } => ("Parser error", message.clone()),
        LgoError::Type { message, .. } => ("Type error", message.clone()),
        other => ("Error", other.to_string()),
    }
}

fn build_report<'a>(
    filename: &'a str,
    error: &LgoError,
) -> Report<'a, (&'a str, std::ops::Range<usize>)> {
    let (kind, message) = describe(error);
    let span = error.span().map(|s| s.start..s.end).unwrap_or(0..0);

    let mut report = Report::build(ReportKind::Error, (filename, span.clone())).with_message(kind);
    report = report.with_label(
        Label::new((filename, span))
            .with_message(message)
            .with_color(Color::Red),
    );
    report.finish()
}

/// Print an error (every diagnostic of an aggregated error) with source context
pub fn print_error(source: &str, filename: &str, error: &LgoError) {
    for diagnostic in error.diagnostics() {
        if let LgoError::Import(e) = diagnostic {
            eprintln!("Import error: {}", e);
            continue;
        }
        if let Err(e) = build_report(filename, diagnostic).eprint((filename, Source::from(source))) {
            eprintln!("{}: {} ({})", filename, diagnostic, e);
        }
    }
}

/// Format an error as a string (for tests and non-terminal output)
pub fn format_error(source: &str, filename: &str, error: &LgoError) -> String {
    let mut output = Vec::new();
    for diagnostic in error.diagnostics() {
        if build_report(filename, diagnostic)
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            output.extend_from_slice(format!("{}\n", diagnostic).as_bytes());
        }
    }
    String::from_utf8_lossy(&output).into_owned()
}

/// Get the line and column (both 1-based) for a byte offset
pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Get the byte offset for a 1-based line and column, if the position exists
pub fn line_col_to_offset(source: &str, line: usize, col: usize) -> Option<usize> {
    let mut cur_line = 1;
    let mut cur_col = 1;

    for (i, c) in source.char_indices() {
        if cur_line == line && cur_col == col {
            return Some(i);
        }
        if c == '\n' {
            if cur_line == line {
                return None;
            }
            cur_line += 1;
            cur_col = 1;
        } else {
            cur_col += 1;
        }
    }

    (cur_line == line && cur_col == col).then_some(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ErrorList, SourceSpan};

    #[test]
    fn test_offset_to_line_col() {
        let source = "line1\nline2\nline3";

        assert_eq!(offset_to_line_col(source, 0), (1, 1));
        assert_eq!(offset_to_line_col(source, 5), (1, 6));
        assert_eq!(offset_to_line_col(source, 6), (2, 1));
        assert_eq!(offset_to_line_col(source, 12), (3, 1));
    }

    #[test]
    fn test_line_col_to_offset() {
        let source = "x := 1\nfmt.Println(x)";

        assert_eq!(line_col_to_offset(source, 1, 1), Some(0));
        assert_eq!(line_col_to_offset(source, 2, 5), Some(11));
        assert_eq!(line_col_to_offset(source, 1, 40), None);
        assert_eq!(line_col_to_offset(source, 9, 1), None);
    }

    #[test]
    fn test_format_error_mentions_every_diagnostic() {
        let source = "x := y + z";
        let error = LgoError::Multiple(ErrorList::from(vec![
            LgoError::type_error("undefined: y", SourceSpan::new(5, 6)),
            LgoError::type_error("undefined: z", SourceSpan::new(9, 10)),
        ]));
        let text = format_error(source, "block.go", &error);
        assert!(text.contains("undefined: y"));
        assert!(text.contains("undefined: z"));
    }
}
