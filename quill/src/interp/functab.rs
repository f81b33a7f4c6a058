//! Function table: static discovery of functions and lambda bodies
//!
//! Built once from the tokenized program. Function headers have the shape
//! `func name [param:type ...] returnType`, terminated by an `endfunc` at
//! equal indentation; lambda literals (`lambda [param:type ...] returnType`
//! ... `endlambda`) contribute body ranges so the return type of the
//! lexically enclosing function or lambda can be resolved for any
//! statement position.

use super::blocks::scan_forward;
use super::value::{Cell, Type};
use crate::error::{InterpError, InterpResult};
use crate::program::Program;
use serde::Serialize;
use std::collections::HashMap;
use std::rc::Rc;

/// Reserved table slot holding the most recently created lambda
pub const LAMBDA_SLOT: &str = "resultf";

/// Metadata for one function or lambda
#[derive(Debug)]
pub struct FuncInfo {
    pub name: String,
    /// Ordered (name, type keyword) formal parameters
    pub params: Vec<(String, String)>,
    /// Statement index of the first body line
    pub start_ip: usize,
    /// Declared return type keyword (`void` if none)
    pub return_type: String,
    /// Captured bindings; empty for ordinary functions. The cells are the
    /// bindings visible at lambda creation, materialized by deep copy at
    /// each invocation.
    pub captures: Vec<(String, Cell)>,
}

impl FuncInfo {
    /// The default value of `func`-typed variables: no parameters, no
    /// body. Invoking it is undefined.
    pub fn placeholder() -> Self {
        FuncInfo {
            name: String::new(),
            params: Vec::new(),
            start_ip: usize::MAX,
            return_type: "void".to_string(),
            captures: Vec::new(),
        }
    }
}

/// Serializable summary of a discovered function (CLI `funcs` dump)
#[derive(Debug, Serialize)]
pub struct FuncSummary {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub return_type: String,
    pub start_line: usize,
}

/// A statically known function or lambda body, used to resolve the
/// enclosing return type of a statement position
#[derive(Debug)]
struct BodyRange {
    start: usize,
    end: usize,
    return_type: String,
}

/// Name → function metadata, plus positional body ranges
#[derive(Debug)]
pub struct FunctionTable {
    funcs: HashMap<String, Rc<FuncInfo>>,
    ranges: Vec<BodyRange>,
}

impl FunctionTable {
    /// Discover every function and lambda body in the program
    pub fn build(program: &Program) -> InterpResult<Self> {
        let mut funcs: HashMap<String, Rc<FuncInfo>> = HashMap::new();
        let mut ranges = Vec::new();

        for ip in 0..program.len() {
            match program.head(ip) {
                Some("func") => {
                    let tokens = &program.statements[ip];
                    if tokens.len() < 3 {
                        return Err(InterpError::syntax("malformed function header", ip));
                    }
                    let name = tokens[1].clone();
                    let return_type = tokens[tokens.len() - 1].clone();
                    check_return_type(&return_type, ip)?;
                    let params = parse_params(&tokens[2..tokens.len() - 1], ip)?;
                    let end = scan_forward(program, ip, &["endfunc"])
                        .ok_or_else(|| InterpError::syntax("missing endfunc", ip))?;
                    if funcs.contains_key(&name) {
                        return Err(InterpError::name_error(
                            format!("duplicate function {name}"),
                            ip,
                        ));
                    }
                    ranges.push(BodyRange {
                        start: ip,
                        end,
                        return_type: return_type.clone(),
                    });
                    funcs.insert(
                        name.clone(),
                        Rc::new(FuncInfo {
                            name,
                            params,
                            start_ip: ip + 1,
                            return_type,
                            captures: Vec::new(),
                        }),
                    );
                }
                Some("lambda") => {
                    let tokens = &program.statements[ip];
                    if tokens.len() < 2 {
                        return Err(InterpError::syntax("malformed lambda header", ip));
                    }
                    let return_type = tokens[tokens.len() - 1].clone();
                    check_return_type(&return_type, ip)?;
                    parse_params(&tokens[1..tokens.len() - 1], ip)?;
                    let end = scan_forward(program, ip, &["endlambda"])
                        .ok_or_else(|| InterpError::syntax("missing endlambda", ip))?;
                    ranges.push(BodyRange {
                        start: ip,
                        end,
                        return_type,
                    });
                }
                _ => {}
            }
        }

        if !funcs.contains_key("main") {
            return Err(InterpError::name_error("no main function defined", 0));
        }

        Ok(FunctionTable { funcs, ranges })
    }

    /// Look a function up by name (qualified `object.method` names resolve
    /// through aliases registered on assignment)
    pub fn lookup(&self, name: &str) -> Option<Rc<FuncInfo>> {
        self.funcs.get(name).cloned()
    }

    /// Register `name` as an alias for an existing function. Used when a
    /// func value is assigned to a variable or object field, and when one
    /// is passed as a value parameter.
    pub fn alias(&mut self, name: &str, info: Rc<FuncInfo>) {
        self.funcs.insert(name.to_string(), info);
    }

    /// Return type of the function or lambda lexically enclosing `ip`
    /// (terminator lines included). Innermost body wins.
    pub fn return_type_at(&self, ip: usize) -> Option<&str> {
        self.ranges
            .iter()
            .filter(|r| r.start <= ip && ip <= r.end)
            .max_by_key(|r| r.start)
            .map(|r| r.return_type.as_str())
    }

    /// Register a freshly created lambda under the reserved slot. `args`
    /// are the header tokens after the `lambda` keyword; `ip` is the
    /// header's position; `captures` the flattened bindings visible at
    /// creation.
    pub fn set_lambda(
        &mut self,
        args: &[String],
        ip: usize,
        captures: Vec<(String, Cell)>,
    ) -> InterpResult<Rc<FuncInfo>> {
        if args.is_empty() {
            return Err(InterpError::syntax("malformed lambda header", ip));
        }
        let return_type = args[args.len() - 1].clone();
        check_return_type(&return_type, ip)?;
        let params = parse_params(&args[..args.len() - 1], ip)?;

        let info = Rc::new(FuncInfo {
            name: "lambda".to_string(),
            params,
            start_ip: ip + 1,
            return_type,
            captures,
        });
        self.funcs.insert(LAMBDA_SLOT.to_string(), info.clone());
        Ok(info)
    }

    /// Summaries of the statically discovered functions, in source order
    pub fn summaries(&self) -> Vec<FuncSummary> {
        let mut all: Vec<FuncSummary> = self
            .funcs
            .values()
            .map(|info| FuncSummary {
                name: info.name.clone(),
                params: info.params.clone(),
                return_type: info.return_type.clone(),
                start_line: info.start_ip,
            })
            .collect();
        all.sort_by_key(|s| s.start_line);
        all
    }
}

/// Underlying runtime type for a parameter type keyword
pub fn param_type(keyword: &str) -> Option<Type> {
    match keyword {
        "int" | "refint" => Some(Type::Int),
        "string" | "refstring" => Some(Type::Str),
        "bool" | "refbool" => Some(Type::Bool),
        "func" => Some(Type::Func),
        "object" => Some(Type::Object),
        _ => None,
    }
}

/// Reference kinds bind the caller's own cell instead of a copy. Objects
/// are always reference-like: their field maps are shared instances.
pub fn is_reference_kind(keyword: &str) -> bool {
    matches!(keyword, "refint" | "refstring" | "refbool" | "object")
}

fn check_return_type(keyword: &str, ip: usize) -> InterpResult<()> {
    match keyword {
        "int" | "string" | "bool" | "func" | "object" | "void" => Ok(()),
        other => Err(InterpError::syntax(
            format!("invalid return type {other}"),
            ip,
        )),
    }
}

fn parse_params(tokens: &[String], ip: usize) -> InterpResult<Vec<(String, String)>> {
    let mut params = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some((name, ty)) = token.split_once(':') else {
            return Err(InterpError::syntax(
                format!("malformed parameter {token}"),
                ip,
            ));
        };
        if param_type(ty).is_none() {
            return Err(InterpError::type_error(
                format!("invalid parameter type {ty}"),
                ip,
            ));
        }
        params.push((name.to_string(), ty.to_string()));
    }
    Ok(params)
}
