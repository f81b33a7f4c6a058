//! Execution engine: the statement dispatcher and its handlers
//!
//! A single fetch/dispatch loop keyed on each statement's head token.
//! The engine owns every piece of mutable run state: the instruction
//! pointer, the call stack of return positions, the scope stack, and the
//! termination flag. Handlers either advance the pointer by one or set it
//! explicitly (branches, loops, calls, returns).

use super::blocks::{BlockInfo, BlockMap, Branch};
use super::console::Console;
use super::functab::{is_reference_kind, param_type, FuncInfo, FunctionTable};
use super::scope::ScopeStack;
use super::value::{Cell, Type, Value};
use crate::error::{InterpError, InterpResult};
use crate::program::Program;
use std::rc::Rc;

pub struct Interpreter<'a> {
    pub(crate) program: Program,
    pub(crate) funcs: FunctionTable,
    blocks: BlockMap,
    pub(crate) scopes: ScopeStack,
    /// Return positions, one per active call; empty while only main runs
    call_stack: Vec<usize>,
    pub(crate) ip: usize,
    terminated: bool,
    console: &'a mut dyn Console,
    trace: bool,
}

impl<'a> Interpreter<'a> {
    /// Load a program: tokenize-time work is already done by
    /// [`Program::parse`]; this discovers functions, resolves block
    /// matches, and positions the engine at the start of `main`
    pub fn new(program: Program, console: &'a mut dyn Console) -> InterpResult<Self> {
        let funcs = FunctionTable::build(&program)?;
        let blocks = BlockMap::build(&program)?;
        let main = funcs
            .lookup("main")
            .ok_or_else(|| InterpError::name_error("no main function defined", 0))?;
        let ip = main.start_ip;

        Ok(Interpreter {
            program,
            funcs,
            blocks,
            scopes: ScopeStack::new(),
            call_stack: Vec::new(),
            ip,
            terminated: false,
            console,
            trace: false,
        })
    }

    /// Echo each statement to stderr before executing it
    pub fn with_trace(mut self, on: bool) -> Self {
        self.trace = on;
        self
    }

    /// Run until the outermost return sets the termination flag or an
    /// error surfaces
    pub fn run(&mut self) -> InterpResult<()> {
        while !self.terminated {
            self.step()?;
        }
        Ok(())
    }

    fn step(&mut self) -> InterpResult<()> {
        if self.trace {
            eprintln!("{:4}  {}", self.ip + 1, self.program.lines[self.ip]);
        }
        let tokens = self.program.statements[self.ip].clone();
        let Some(head) = tokens.first() else {
            self.ip += 1;
            return Ok(());
        };

        match head.as_str() {
            "var" => self.define_vars(&tokens),
            "assign" => self.do_assign(&tokens),
            "funccall" => self.do_funccall(&tokens),
            "if" => self.do_if(&tokens),
            "else" => self.do_else(),
            "endif" => self.do_endif(),
            "while" => self.do_while(&tokens),
            "endwhile" => self.do_endwhile(),
            "lambda" => self.do_lambda(&tokens),
            "return" => self.do_return(&tokens),
            "endfunc" | "endlambda" => self.fall_off_end(),
            "func" => Err(InterpError::syntax(
                "function definition inside executable code",
                self.ip,
            )),
            other => Err(InterpError::syntax(
                format!("unknown statement {other}"),
                self.ip,
            )),
        }
    }

    /// `var typeKeyword name [name ...]`
    fn define_vars(&mut self, tokens: &[String]) -> InterpResult<()> {
        if tokens.len() < 3 {
            return Err(InterpError::syntax("invalid var statement", self.ip));
        }
        let keyword = &tokens[1];
        let default = Value::default_for(keyword).ok_or_else(|| {
            InterpError::type_error(format!("invalid type {keyword}"), self.ip)
        })?;
        for name in &tokens[2..] {
            // each variable gets its own storage, objects included
            let cell = default.deep_copy().into_cell();
            if !self.scopes.declare(name, cell) {
                return Err(InterpError::name_error(
                    format!("redefinition of variable {name}"),
                    self.ip,
                ));
            }
        }
        self.ip += 1;
        Ok(())
    }

    /// `assign target expr...`
    fn do_assign(&mut self, tokens: &[String]) -> InterpResult<()> {
        if tokens.len() < 3 {
            return Err(InterpError::syntax("invalid assignment statement", self.ip));
        }
        let target = &tokens[1];
        let value = self.eval_expression(&tokens[2..])?;

        if let Some((object, field)) = target.split_once('.') {
            self.assign_field(target, object, field, value)?;
        } else {
            self.assign_variable(target, value)?;
        }
        self.ip += 1;
        Ok(())
    }

    fn assign_variable(&mut self, target: &str, value: Value) -> InterpResult<()> {
        let cell = self.scopes.get(target).ok_or_else(|| {
            InterpError::name_error(
                format!("assignment of unknown variable {target}"),
                self.ip,
            )
        })?;
        let existing = cell.borrow().type_of();
        // an object-typed variable accepts a value of any type
        if existing != Type::Object && existing != value.type_of() {
            return Err(InterpError::type_error(
                format!("mismatched type in assignment to {target}"),
                self.ip,
            ));
        }
        if let Value::Func(info) = &value {
            self.funcs.alias(target, info.clone());
        }
        *cell.borrow_mut() = value;
        Ok(())
    }

    fn assign_field(
        &mut self,
        target: &str,
        object: &str,
        field: &str,
        value: Value,
    ) -> InterpResult<()> {
        let cell = self.scopes.get(object).ok_or_else(|| {
            InterpError::name_error(
                format!("assignment of unknown variable {object}"),
                self.ip,
            )
        })?;
        let fields = {
            let held = cell.borrow();
            let Value::Object(fields) = &*held else {
                return Err(InterpError::type_error(
                    format!("cannot set field on non-object {object}"),
                    self.ip,
                ));
            };
            fields.clone()
        };
        if let Value::Func(info) = &value {
            // makes the qualified name callable as a method
            self.funcs.alias(target, info.clone());
        }
        fields
            .borrow_mut()
            .insert(field.to_string(), value.into_cell());
        Ok(())
    }

    /// `funccall name [arg ...]`: builtins execute inline, everything else
    /// goes through the call protocol
    fn do_funccall(&mut self, tokens: &[String]) -> InterpResult<()> {
        let Some(name) = tokens.get(1) else {
            return Err(InterpError::syntax("missing function name to call", self.ip));
        };
        let args = &tokens[2..];
        match name.as_str() {
            "print" => {
                if args.is_empty() {
                    return Err(InterpError::syntax("invalid print call syntax", self.ip));
                }
                let line = self.format_args(args)?;
                self.console.write_line(&line);
                self.ip += 1;
                Ok(())
            }
            "input" => {
                if !args.is_empty() {
                    let prompt = self.format_args(args)?;
                    self.console.write_line(&prompt);
                }
                let line = self.console.read_line();
                self.set_result(Value::Str(line));
                self.ip += 1;
                Ok(())
            }
            "strtoint" => {
                if args.len() != 1 {
                    return Err(InterpError::syntax("invalid strtoint call syntax", self.ip));
                }
                let value = self.resolve_token(&args[0])?.borrow().clone();
                let Value::Str(text) = value else {
                    return Err(InterpError::type_error(
                        "non-string passed to strtoint",
                        self.ip,
                    ));
                };
                let n: i64 = text.parse().map_err(|_| {
                    InterpError::type_error(
                        format!("non-numeric string passed to strtoint: {text}"),
                        self.ip,
                    )
                })?;
                self.set_result(Value::Int(n));
                self.ip += 1;
                Ok(())
            }
            _ => self.call(name, args),
        }
    }

    /// Concatenate the textual form of each argument token
    fn format_args(&self, args: &[String]) -> InterpResult<String> {
        let mut out = String::new();
        for arg in args {
            let cell = self.resolve_token(arg)?;
            let value = cell.borrow();
            out.push_str(&value.to_string());
        }
        Ok(out)
    }

    /// The call protocol: bind formals, materialize captures, inject
    /// `this` for qualified targets, push a frame, jump to the body
    fn call(&mut self, name: &str, actuals: &[String]) -> InterpResult<()> {
        let Some(info) = self.funcs.lookup(name) else {
            // a same-named non-func variable is a type error, anything
            // else is an unknown name
            if let Some(cell) = self.scopes.get(name) {
                if cell.borrow().type_of() != Type::Func {
                    return Err(InterpError::type_error(
                        format!("cannot call non-function {name}"),
                        self.ip,
                    ));
                }
            }
            return Err(InterpError::name_error(
                format!("unknown function {name}"),
                self.ip,
            ));
        };
        if info.params.len() != actuals.len() {
            return Err(InterpError::name_error(
                format!("mismatched parameter count in call to {name}"),
                self.ip,
            ));
        }

        let mut bindings: Vec<(String, Cell)> = Vec::new();
        let mut aliases: Vec<(String, Rc<FuncInfo>)> = Vec::new();
        for ((formal, keyword), actual) in info.params.iter().zip(actuals) {
            let cell = self.resolve_token(actual)?;
            let actual_type = cell.borrow().type_of();
            if param_type(keyword) != Some(actual_type) {
                return Err(InterpError::type_error(
                    format!("mismatched parameter type for {formal} in call to {name}"),
                    self.ip,
                ));
            }
            if is_reference_kind(keyword) {
                bindings.push((formal.clone(), cell));
            } else {
                let value = cell.borrow().clone();
                if let Value::Func(f) = &value {
                    aliases.push((formal.clone(), f.clone()));
                }
                bindings.push((formal.clone(), value.into_cell()));
            }
        }

        // materialized after the formals: a captured name overwrites a
        // same-named parameter
        for (cname, ccell) in &info.captures {
            bindings.push((cname.clone(), ccell.borrow().deep_copy().into_cell()));
        }

        if let Some((object, _)) = name.split_once('.') {
            if let Some(cell) = self.scopes.get(object) {
                bindings.push(("this".to_string(), cell));
            }
        }

        for (formal, f) in aliases {
            self.funcs.alias(&formal, f);
        }
        self.call_stack.push(self.ip + 1);
        self.scopes.push_frame();
        self.scopes.import(bindings);
        self.ip = info.start_ip;
        Ok(())
    }

    /// `if expr...`
    fn do_if(&mut self, tokens: &[String]) -> InterpResult<()> {
        if tokens.len() < 2 {
            return Err(InterpError::syntax("invalid if syntax", self.ip));
        }
        let Value::Bool(cond) = self.eval_expression(&tokens[1..])? else {
            return Err(InterpError::type_error(
                "non-boolean if expression",
                self.ip,
            ));
        };
        if cond {
            self.scopes.block_nest();
            self.ip += 1;
            return Ok(());
        }
        let BlockInfo::If { on_false } = self.blocks.info(self.ip) else {
            unreachable!("if statement always has block info");
        };
        match on_false {
            Branch::Else(pos) => {
                self.scopes.block_nest();
                self.ip = pos + 1;
            }
            Branch::Endif(pos) => self.ip = pos + 1,
        }
        Ok(())
    }

    /// `else` reached by falling out of the true branch
    fn do_else(&mut self) -> InterpResult<()> {
        self.scopes.block_unnest();
        let BlockInfo::Else { endif_ip } = self.blocks.info(self.ip) else {
            unreachable!("else statement always has block info");
        };
        self.ip = endif_ip + 1;
        Ok(())
    }

    fn do_endif(&mut self) -> InterpResult<()> {
        self.scopes.block_unnest();
        self.ip += 1;
        Ok(())
    }

    /// `while expr...`: the condition re-evaluates on every iteration
    fn do_while(&mut self, tokens: &[String]) -> InterpResult<()> {
        if tokens.len() < 2 {
            return Err(InterpError::syntax("invalid while syntax", self.ip));
        }
        let Value::Bool(cond) = self.eval_expression(&tokens[1..])? else {
            return Err(InterpError::type_error(
                "non-boolean while expression",
                self.ip,
            ));
        };
        if cond {
            self.scopes.block_nest();
            self.ip += 1;
        } else {
            let BlockInfo::While { endwhile_ip } = self.blocks.info(self.ip) else {
                unreachable!("while statement always has block info");
            };
            self.ip = endwhile_ip + 1;
        }
        Ok(())
    }

    fn do_endwhile(&mut self) -> InterpResult<()> {
        self.scopes.block_unnest();
        let BlockInfo::Endwhile { while_ip } = self.blocks.info(self.ip) else {
            unreachable!("endwhile statement always has block info");
        };
        self.ip = while_ip;
        Ok(())
    }

    /// `lambda [p:type ...] returnType`: capture the visible bindings,
    /// register the lambda, bind it to `resultf`, skip the body
    fn do_lambda(&mut self, tokens: &[String]) -> InterpResult<()> {
        let captures = self.scopes.flatten_frame();
        let info = self.funcs.set_lambda(&tokens[1..], self.ip, captures)?;
        self.set_result(Value::Func(info));
        let BlockInfo::Lambda { endlambda_ip } = self.blocks.info(self.ip) else {
            unreachable!("lambda statement always has block info");
        };
        self.ip = endlambda_ip + 1;
        Ok(())
    }

    /// `return [expr...]`: the declared return type comes from the
    /// lexically enclosing function or lambda of the return site
    fn do_return(&mut self, tokens: &[String]) -> InterpResult<()> {
        let return_type = self
            .funcs
            .return_type_at(self.ip)
            .ok_or_else(|| InterpError::syntax("return outside of function", self.ip))?
            .to_string();

        if tokens.len() == 1 {
            self.unwind(None, &return_type);
            return Ok(());
        }
        if return_type == "void" {
            return Err(InterpError::type_error(
                "returning value from void function",
                self.ip,
            ));
        }
        let value = self.eval_expression(&tokens[1..])?;
        if param_type(&return_type) != Some(value.type_of()) {
            return Err(InterpError::type_error(
                format!("non-matching return type, expected {return_type}"),
                self.ip,
            ));
        }
        self.unwind(Some(value), &return_type);
        Ok(())
    }

    /// `endfunc`/`endlambda` reached as a statement: same as a bare return
    fn fall_off_end(&mut self) -> InterpResult<()> {
        let return_type = self
            .funcs
            .return_type_at(self.ip)
            .unwrap_or("void")
            .to_string();
        self.unwind(None, &return_type);
        Ok(())
    }

    /// Unwind one invocation. The binding decision is "was an expression
    /// supplied": a bare return from a non-void function binds the type's
    /// default value.
    fn unwind(&mut self, value: Option<Value>, return_type: &str) {
        match self.call_stack.pop() {
            None => {
                // returning from main ends the program; any value is
                // discarded
                self.terminated = true;
            }
            Some(resume) => {
                self.scopes.pop_frame();
                match value {
                    Some(v) => self.set_result(v),
                    None => {
                        if let Some(default) = Value::default_for(return_type) {
                            self.set_result(default);
                        }
                    }
                }
                self.ip = resume;
            }
        }
    }

    /// Bind a value into the per-type result variable in the current
    /// frame's outermost scope. Void binds nothing.
    fn set_result(&mut self, value: Value) {
        if let Some(name) = value.type_of().result_var() {
            self.scopes.declare_outermost(name, value.into_cell());
        }
    }
}
