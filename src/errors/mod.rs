//! Error handling for lgo-convert
//!
//! Provides structured error types with source location tracking
//! for helpful diagnostic messages.

mod diagnostic;

use std::fmt;
use std::ops::Range;
use thiserror::Error;

use crate::analysis::ImportError;

pub use diagnostic::{format_error, line_col_to_offset, offset_to_line_col, print_error};

/// A span in the source code, represented as a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl SourceSpan {
    /// Create a new source span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Merge two spans into one that covers both
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Check whether a byte offset falls inside this span
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Check if the span is empty (synthesized nodes have empty spans)
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl From<SourceSpan> for Range<usize> {
    fn from(span: SourceSpan) -> Self {
        span.start..span.end
    }
}

/// The main error type for conversions
#[derive(Error, Debug)]
pub enum LgoError {
    #[error("Lexer error: {message}")]
    Lexer { message: String, span: SourceSpan },

    #[error("Parser error: {message}")]
    Parser { message: String, span: SourceSpan },

    #[error("{message}")]
    Type { message: String, span: SourceSpan },

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("{0}")]
    Multiple(ErrorList),
}

impl LgoError {
    /// Get the source span associated with this error, if any
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            LgoError::Lexer { span, .. } => Some(*span),
            LgoError::Parser { span, .. } => Some(*span),
            LgoError::Type { span, .. } => Some(*span),
            LgoError::Import(_) => None,
            LgoError::Multiple(list) => list.first().and_then(LgoError::span),
        }
    }

    /// Create a lexer error
    pub fn lexer(message: impl Into<String>, span: SourceSpan) -> Self {
        LgoError::Lexer {
            message: message.into(),
            span,
        }
    }

    /// Create a parser error
    pub fn parser(message: impl Into<String>, span: SourceSpan) -> Self {
        LgoError::Parser {
            message: message.into(),
            span,
        }
    }

    /// Create a type error
    pub fn type_error(message: impl Into<String>, span: SourceSpan) -> Self {
        LgoError::Type {
            message: message.into(),
            span,
        }
    }

    /// Flatten into the individual diagnostics this error stands for
    pub fn diagnostics(&self) -> Vec<&LgoError> {
        match self {
            LgoError::Multiple(list) => list.iter().collect(),
            other => vec![other],
        }
    }
}

/// Result type alias for conversion operations
pub type LgoResult<T> = Result<T, LgoError>;

/// An ordered list of diagnostics collected by one analysis pass.
///
/// Displays as the first error, followed by `(and N more errors)` when
/// there is more than one.
#[derive(Debug, Default)]
pub struct ErrorList(Vec<LgoError>);

impl ErrorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: LgoError) {
        self.0.push(error);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&LgoError> {
        self.0.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LgoError> {
        self.0.iter()
    }

    /// `Ok(())` when empty, the lone error when there is one,
    /// and `LgoError::Multiple` otherwise
    pub fn into_result(mut self) -> LgoResult<()> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(LgoError::Multiple(self)),
        }
    }
}

impl From<Vec<LgoError>> for ErrorList {
    fn from(errors: Vec<LgoError>) -> Self {
        Self(errors)
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            0 => write!(f, "no errors"),
            1 => write!(f, "{}", self.0[0]),
            n => write!(f, "{} (and {} more errors)", self.0[0], n - 1),
        }
    }
}

impl std::error::Error for ErrorList {}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(msg: &str) -> LgoError {
        LgoError::type_error(msg, SourceSpan::new(0, 1))
    }

    #[test]
    fn test_error_list_display() {
        let list = ErrorList::from(vec![err("undefined: x")]);
        assert_eq!(list.to_string(), "undefined: x");

        let list = ErrorList::from(vec![err("undefined: x"), err("undefined: y"), err("undefined: z")]);
        assert_eq!(list.to_string(), "undefined: x (and 2 more errors)");
    }

    #[test]
    fn test_into_result() {
        assert!(ErrorList::new().into_result().is_ok());

        let single = ErrorList::from(vec![err("a")]).into_result().unwrap_err();
        assert!(matches!(single, LgoError::Type { .. }));

        let many = ErrorList::from(vec![err("a"), err("b")]).into_result().unwrap_err();
        assert_eq!(many.to_string(), "a (and 1 more errors)");
        assert_eq!(many.diagnostics().len(), 2);
        assert_eq!(many.span(), Some(SourceSpan::new(0, 1)));
    }

    #[test]
    fn test_span_helpers() {
        let a = SourceSpan::new(2, 5);
        assert!(a.contains(2));
        assert!(!a.contains(5));
        assert_eq!(a.merge(SourceSpan::new(7, 9)), SourceSpan::new(2, 9));
        assert!(SourceSpan::default().is_empty());
    }
}
