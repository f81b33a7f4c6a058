//! Line tokenizer built on logos
//!
//! Each source line is tokenized independently: quoted string literals
//! stay one token (quotes included), `#` comments and whitespace are
//! skipped, everything else splits on whitespace. Blank and comment-only
//! lines produce an empty token sequence.

mod token;

pub use token::Token;

use crate::error::{InterpError, InterpResult};
use logos::Logos;

/// Tokenize one source line.
///
/// `line` is the zero-based line number, used for error positions.
pub fn tokenize_line(text: &str, line: usize) -> InterpResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(text);

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token.into_text()),
            Err(_) => {
                return Err(InterpError::syntax(
                    format!("unexpected character: {:?}", lexer.slice()),
                    line,
                ));
            }
        }
    }

    Ok(tokens)
}
