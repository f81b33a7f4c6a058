//! Tree-walking execution engine and its runtime collaborators

mod blocks;
mod console;
mod engine;
mod eval;
mod functab;
mod scope;
mod value;

pub use console::{BufferConsole, Console, StdConsole};
pub use engine::Interpreter;
pub use functab::{FuncInfo, FuncSummary, FunctionTable};
pub use scope::ScopeStack;
pub use value::{Cell, Type, Value};
