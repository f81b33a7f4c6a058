//! Loaded program: source lines, tokenized statements, indentation levels

use crate::error::InterpResult;
use crate::lexer;

/// A tokenized program ready for execution.
///
/// Statements are indexed by source line; the indentation array is used
/// only for block matching.
#[derive(Debug)]
pub struct Program {
    /// Original source lines, kept for tracing and diagnostics
    pub lines: Vec<String>,
    /// One token sequence per line; empty for blank/comment lines
    pub statements: Vec<Vec<String>>,
    /// Leading-space count per line
    pub indents: Vec<usize>,
}

impl Program {
    /// Tokenize source into a program
    pub fn parse(source: &str) -> InterpResult<Self> {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let mut statements = Vec::with_capacity(lines.len());
        let mut indents = Vec::with_capacity(lines.len());

        for (i, line) in lines.iter().enumerate() {
            statements.push(lexer::tokenize_line(line, i)?);
            indents.push(line.len() - line.trim_start_matches(' ').len());
        }

        Ok(Program {
            lines,
            statements,
            indents,
        })
    }

    /// Number of statements (= number of source lines)
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Head keyword of the statement at `ip`, if the line is non-empty
    pub fn head(&self, ip: usize) -> Option<&str> {
        self.statements[ip].first().map(String::as_str)
    }
}
