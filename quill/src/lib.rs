//! Quill Interpreter Library
//!
//! A tree-walking interpreter for Quill, a small statement-oriented
//! teaching language with indentation-matched blocks, prefix-notation
//! expressions, value/reference parameters, and lambdas that capture by
//! live reference.

pub mod error;
pub mod interp;
pub mod lexer;
pub mod program;

pub use error::{ErrorKind, InterpError, InterpResult};
pub use interp::{BufferConsole, Console, Interpreter, StdConsole, Value};
pub use program::Program;

/// Load and run a program against the given console
pub fn run(source: &str, console: &mut dyn Console) -> InterpResult<()> {
    let program = Program::parse(source)?;
    Interpreter::new(program, console)?.run()
}
