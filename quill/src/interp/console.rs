//! Console I/O collaborator
//!
//! The engine's only external effects are one-line writes and blocking
//! one-line reads, routed through this trait so tests can script them.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-oriented console the engine prints to and reads from
pub trait Console {
    /// Emit one line of program output
    fn write_line(&mut self, text: &str);

    /// Block until one line of input is available. End of input yields an
    /// empty line.
    fn read_line(&mut self) -> String;
}

/// Console backed by stdin/stdout
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "{text}");
        let _ = out.flush();
    }

    fn read_line(&mut self) -> String {
        let mut buf = String::new();
        let _ = io::stdin().lock().read_line(&mut buf);
        buf.trim_end_matches(['\n', '\r']).to_string()
    }
}

/// Scripted console for tests: queued input lines, captured output lines
#[derive(Debug, Default)]
pub struct BufferConsole {
    inputs: VecDeque<String>,
    pub outputs: Vec<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferConsole {
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: Vec::new(),
        }
    }
}

impl Console for BufferConsole {
    fn write_line(&mut self, text: &str) {
        self.outputs.push(text.to_string());
    }

    fn read_line(&mut self) -> String {
        self.inputs.pop_front().unwrap_or_default()
    }
}
