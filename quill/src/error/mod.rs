//! Error types and reporting

use std::fmt;
use thiserror::Error;

/// Result type alias for interpreter operations
pub type InterpResult<T> = std::result::Result<T, InterpError>;

/// Error taxonomy of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed statement shape, unmatched block delimiter, ill-formed expression
    Syntax,
    /// Operand/operator mismatch, non-boolean condition, parameter or return type mismatch
    Type,
    /// Unknown variable/function, redefinition in the same scope, call-arity mismatch
    Name,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Type => write!(f, "type error"),
            ErrorKind::Name => write!(f, "name error"),
        }
    }
}

/// Categorized error carrying the failing statement's position.
///
/// Every detection site returns one of these immediately; there is no
/// recovery or partial continuation.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{kind} at line {}: {message}", .line + 1)]
pub struct InterpError {
    pub kind: ErrorKind,
    pub message: String,
    /// Zero-based statement index (statement index = source line index)
    pub line: usize,
}

impl InterpError {
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        InterpError {
            kind: ErrorKind::Syntax,
            message: message.into(),
            line,
        }
    }

    pub fn type_error(message: impl Into<String>, line: usize) -> Self {
        InterpError {
            kind: ErrorKind::Type,
            message: message.into(),
            line,
        }
    }

    pub fn name_error(message: impl Into<String>, line: usize) -> Self {
        InterpError {
            kind: ErrorKind::Name,
            message: message.into(),
            line,
        }
    }
}

/// Report an error with ariadne, labeling the failing source line
pub fn report_error(filename: &str, source: &str, error: &InterpError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = line_span(source, error.line);

    Report::build(ReportKind::Error, (filename, span.clone()))
        .with_message(error.kind.to_string())
        .with_label(
            Label::new((filename, span))
                .with_message(&error.message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((filename, Source::from(source)))
        .ok();
}

/// Byte range of the given zero-based line within `source`
fn line_span(source: &str, line: usize) -> std::ops::Range<usize> {
    let mut start = 0;
    for (i, chunk) in source.split_inclusive('\n').enumerate() {
        if i == line {
            let end = start + chunk.trim_end_matches(['\n', '\r']).len();
            return start..end;
        }
        start += chunk.len();
    }
    start..start
}
