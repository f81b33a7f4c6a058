//! Scope stack: call frames of nested block scopes
//!
//! One frame per active function/lambda invocation (plus the always
//! present main frame); each frame is a stack of block scopes opened and
//! closed by `if`/`else`/`while`/lambda bodies. Name lookup never crosses
//! a frame boundary.

use super::value::Cell;
use std::collections::HashMap;

/// One call frame: a stack of block scopes, outermost first
#[derive(Debug, Default)]
struct Frame {
    scopes: Vec<HashMap<String, Cell>>,
}

impl Frame {
    fn new() -> Self {
        Frame {
            scopes: vec![HashMap::new()],
        }
    }
}

/// Stack of call frames owned by the execution engine
#[derive(Debug)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// Create a scope stack holding the main frame
    pub fn new() -> Self {
        ScopeStack {
            frames: vec![Frame::new()],
        }
    }

    /// Push a frame for a new invocation
    pub fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Pop the current frame on return.
    /// Panics if only the main frame remains.
    pub fn pop_frame(&mut self) {
        if self.frames.len() <= 1 {
            panic!("cannot pop the main frame");
        }
        self.frames.pop();
    }

    /// Number of active frames (main frame included)
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Open a nested block scope in the current frame
    pub fn block_nest(&mut self) {
        self.current_mut().scopes.push(HashMap::new());
    }

    /// Close the innermost block scope of the current frame.
    /// Panics if only the frame's outermost scope remains.
    pub fn block_unnest(&mut self) {
        let frame = self.current_mut();
        if frame.scopes.len() <= 1 {
            panic!("cannot unnest the outermost scope of a frame");
        }
        frame.scopes.pop();
    }

    /// Nesting depth of the current frame
    pub fn block_depth(&self) -> usize {
        self.current().scopes.len()
    }

    /// Create a binding in the innermost scope of the current frame.
    /// Returns false (and leaves the scope untouched) if the name already
    /// exists in that scope.
    pub fn declare(&mut self, name: &str, cell: Cell) -> bool {
        let scope = self
            .current_mut()
            .scopes
            .last_mut()
            .expect("frame always has a scope");
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), cell);
        true
    }

    /// Create or overwrite a binding in the current frame's outermost
    /// scope, regardless of block nesting. Used for result variables so
    /// that unwinding nested scopes never loses them.
    pub fn declare_outermost(&mut self, name: &str, cell: Cell) {
        let scope = self
            .current_mut()
            .scopes
            .first_mut()
            .expect("frame always has a scope");
        scope.insert(name.to_string(), cell);
    }

    /// Look a name up in the current frame only, innermost scope first
    pub fn get(&self, name: &str) -> Option<Cell> {
        for scope in self.current().scopes.iter().rev() {
            if let Some(cell) = scope.get(name) {
                return Some(cell.clone());
            }
        }
        None
    }

    /// Bulk-import bindings into the innermost scope of the current frame
    /// (parameter/capture installation right after a frame push). Later
    /// entries overwrite earlier ones with the same name.
    pub fn import(&mut self, bindings: Vec<(String, Cell)>) {
        let scope = self
            .current_mut()
            .scopes
            .last_mut()
            .expect("frame always has a scope");
        for (name, cell) in bindings {
            scope.insert(name, cell);
        }
    }

    /// Flatten every scope of the current frame into (name, cell) pairs,
    /// outermost scope first, so that inner entries come later and win
    /// when re-imported. Used to record lambda captures.
    pub fn flatten_frame(&self) -> Vec<(String, Cell)> {
        let mut pairs = Vec::new();
        for scope in &self.current().scopes {
            for (name, cell) in scope {
                pairs.push((name.clone(), cell.clone()));
            }
        }
        pairs
    }

    fn current(&self) -> &Frame {
        self.frames.last().expect("main frame always present")
    }

    fn current_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("main frame always present")
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
