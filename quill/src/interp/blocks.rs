//! Control-flow resolver: block delimiter matching
//!
//! Block delimiters are matched by indentation equality: the terminator
//! of a block is the next statement (previous, for `endwhile`) with the
//! same indentation as its opener and the expected keyword. Empty
//! statements are skipped; a non-empty statement indented less than the
//! opener means the block was never terminated.
//!
//! All matches are computed once at load time into a side table, so the
//! engine never rescans the statement array during execution.

use crate::error::{InterpError, InterpResult};
use crate::program::Program;
use std::collections::HashMap;

/// Where an `if` continues when its condition is false
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// Matching `else`: continue after it and open a scope for the branch
    Else(usize),
    /// Matching `endif`: continue after it, no scope opened
    Endif(usize),
}

/// Match information for one block statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockInfo {
    /// `if` header
    If { on_false: Branch },
    /// `else`, reached by falling out of the true branch
    Else { endif_ip: usize },
    /// `while` header
    While { endwhile_ip: usize },
    /// `endwhile`, jumping back to its header
    Endwhile { while_ip: usize },
    /// `lambda` header (used to skip an uninvoked lambda literal)
    Lambda { endlambda_ip: usize },
}

/// Side table mapping every block statement to its match
#[derive(Debug)]
pub struct BlockMap {
    map: HashMap<usize, BlockInfo>,
}

impl BlockMap {
    /// Resolve every block delimiter in the program
    pub fn build(program: &Program) -> InterpResult<Self> {
        let mut map = HashMap::new();

        for ip in 0..program.len() {
            let info = match program.head(ip) {
                Some("if") => {
                    let pos = scan_forward(program, ip, &["else", "endif"])
                        .ok_or_else(|| InterpError::syntax("missing endif", ip))?;
                    let on_false = match program.head(pos) {
                        Some("else") => Branch::Else(pos),
                        _ => Branch::Endif(pos),
                    };
                    BlockInfo::If { on_false }
                }
                Some("else") => {
                    let endif_ip = scan_forward(program, ip, &["endif"])
                        .ok_or_else(|| InterpError::syntax("missing endif", ip))?;
                    BlockInfo::Else { endif_ip }
                }
                Some("while") => {
                    let endwhile_ip = scan_forward(program, ip, &["endwhile"])
                        .ok_or_else(|| InterpError::syntax("missing endwhile", ip))?;
                    BlockInfo::While { endwhile_ip }
                }
                Some("endwhile") => {
                    let while_ip = scan_backward(program, ip, "while")
                        .ok_or_else(|| InterpError::syntax("missing while", ip))?;
                    BlockInfo::Endwhile { while_ip }
                }
                Some("lambda") => {
                    let endlambda_ip = scan_forward(program, ip, &["endlambda"])
                        .ok_or_else(|| InterpError::syntax("missing endlambda", ip))?;
                    BlockInfo::Lambda { endlambda_ip }
                }
                _ => continue,
            };
            map.insert(ip, info);
        }

        Ok(BlockMap { map })
    }

    /// Match information for the block statement at `ip`.
    /// Panics if `ip` is not a block statement; the map covers every
    /// block keyword by construction.
    pub fn info(&self, ip: usize) -> BlockInfo {
        self.map[&ip]
    }
}

/// Find the first statement after `opener` with equal indentation and one
/// of the expected keywords. Skips empty statements; gives up on a
/// non-empty statement indented less than the opener.
pub(crate) fn scan_forward(program: &Program, opener: usize, targets: &[&str]) -> Option<usize> {
    let indent = program.indents[opener];
    for ip in opener + 1..program.len() {
        let Some(head) = program.head(ip) else {
            continue;
        };
        if program.indents[ip] < indent {
            return None;
        }
        if program.indents[ip] == indent && targets.contains(&head) {
            return Some(ip);
        }
    }
    None
}

/// Backward counterpart of [`scan_forward`], used to match `endwhile`
/// back to its `while` header
pub(crate) fn scan_backward(program: &Program, opener: usize, target: &str) -> Option<usize> {
    let indent = program.indents[opener];
    for ip in (0..opener).rev() {
        let Some(head) = program.head(ip) else {
            continue;
        };
        if program.indents[ip] < indent {
            return None;
        }
        if program.indents[ip] == indent && head == target {
            return Some(ip);
        }
    }
    None
}
