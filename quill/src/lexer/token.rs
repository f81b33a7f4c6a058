//! Token definition for the line tokenizer

use logos::Logos;

/// One token of a source line.
///
/// Statements are flat token sequences dispatched on their head word, so
/// the lexer only needs to distinguish quoted string literals (kept
/// verbatim, delimiting quotes included) from bare words. Comments run
/// from `#` to end of line.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t]+")]
#[logos(skip r"#[^\n]*")]
pub enum Token {
    /// Quoted string literal, delimiters included
    #[regex(r#""[^"]*""#, |lex| lex.slice().to_string())]
    Quoted(String),

    /// Bare word: keyword, operator, identifier, or literal
    #[regex(r##"[^ \t"#]+"##, |lex| lex.slice().to_string())]
    Word(String),
}

impl Token {
    /// The token's textual form as the engine consumes it
    pub fn into_text(self) -> String {
        match self {
            Token::Quoted(s) | Token::Word(s) => s,
        }
    }
}
