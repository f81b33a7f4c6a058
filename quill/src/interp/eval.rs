//! Prefix-notation expression evaluator
//!
//! Expressions are token sequences in prefix form, evaluated right to
//! left with a value stack: operands push, binary operators pop two
//! (first pop = left operand), `!` pops one bool. Operations are defined
//! only for same-type operand pairs; there is no coercion.

use super::engine::Interpreter;
use super::value::{Cell, Value};
use crate::error::{InterpError, InterpResult};

/// Every binary operator token; the per-type tables below each accept a
/// subset of these
const BINARY_OPS: [&str; 13] = [
    "+", "-", "*", "/", "%", "==", "!=", "<", "<=", ">", ">=", "&", "|",
];

impl Interpreter<'_> {
    /// Evaluate a prefix expression to a single value
    pub(crate) fn eval_expression(&self, tokens: &[String]) -> InterpResult<Value> {
        let mut stack: Vec<Value> = Vec::new();

        for token in tokens.iter().rev() {
            if BINARY_OPS.contains(&token.as_str()) {
                let Some(lhs) = stack.pop() else {
                    return Err(InterpError::syntax("invalid expression", self.ip));
                };
                let Some(rhs) = stack.pop() else {
                    return Err(InterpError::syntax("invalid expression", self.ip));
                };
                if lhs.type_of() != rhs.type_of() {
                    return Err(InterpError::type_error(
                        format!(
                            "mismatched operand types {} and {}",
                            lhs.type_of(),
                            rhs.type_of()
                        ),
                        self.ip,
                    ));
                }
                let result = apply_binary(token, &lhs, &rhs).ok_or_else(|| {
                    InterpError::type_error(
                        format!("operator {token} not defined for {}", lhs.type_of()),
                        self.ip,
                    )
                })?;
                stack.push(result);
            } else if token == "!" {
                let Some(Value::Bool(b)) = stack.pop() else {
                    return Err(InterpError::type_error(
                        "expecting boolean operand for !",
                        self.ip,
                    ));
                };
                stack.push(Value::Bool(!b));
            } else {
                stack.push(self.resolve_token(token)?.borrow().clone());
            }
        }

        match stack.pop() {
            Some(value) if stack.is_empty() => Ok(value),
            _ => Err(InterpError::syntax("invalid expression", self.ip)),
        }
    }

    /// Resolve one operand token to the cell holding its value.
    ///
    /// Variables resolve to their own cell (so callers binding reference
    /// parameters alias the caller's storage); literals get a fresh cell.
    pub(crate) fn resolve_token(&self, token: &str) -> InterpResult<Cell> {
        if token.is_empty() {
            return Err(InterpError::name_error("empty token", self.ip));
        }

        if token.starts_with('"') {
            let text = token.trim_matches('"').to_string();
            return Ok(Value::Str(text).into_cell());
        }

        if token.chars().all(|c| c.is_ascii_digit()) || token.starts_with('-') {
            // a leading '-' always commits to the integer-literal parse
            let n: i64 = token.parse().expect("malformed integer literal");
            return Ok(Value::Int(n).into_cell());
        }

        if token == "true" || token == "false" {
            return Ok(Value::Bool(token == "true").into_cell());
        }

        if token.contains('.') {
            return self.resolve_field(token);
        }

        if let Some(cell) = self.scopes.get(token) {
            return Ok(cell);
        }
        if let Some(info) = self.funcs.lookup(token) {
            return Ok(Value::Func(info).into_cell());
        }

        Err(InterpError::name_error(
            format!("unknown variable {token}"),
            self.ip,
        ))
    }

    /// Resolve an `object.field` token to the field's cell
    fn resolve_field(&self, token: &str) -> InterpResult<Cell> {
        let mut parts = token.split('.');
        let object = parts.next().unwrap_or_default();
        let field = parts.next().unwrap_or_default();

        let cell = self.scopes.get(object).ok_or_else(|| {
            InterpError::name_error(format!("unknown variable {object}"), self.ip)
        })?;
        let value = cell.borrow();
        let Value::Object(fields) = &*value else {
            return Err(InterpError::type_error(
                format!("variable not of type object: {token}"),
                self.ip,
            ));
        };
        let fields = fields.borrow();
        fields.get(field).cloned().ok_or_else(|| {
            InterpError::name_error(
                format!("object field does not exist: {token}"),
                self.ip,
            )
        })
    }
}

/// Apply a binary operator to same-type operands. Returns None when the
/// operator is not registered for the operand type.
fn apply_binary(op: &str, lhs: &Value, rhs: &Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => {
            let value = match op {
                "+" => Value::Int(a + b),
                "-" => Value::Int(a - b),
                "*" => Value::Int(a * b),
                "/" => Value::Int(floor_div(*a, *b)),
                "%" => Value::Int(floor_mod(*a, *b)),
                "==" => Value::Bool(a == b),
                "!=" => Value::Bool(a != b),
                ">" => Value::Bool(a > b),
                "<" => Value::Bool(a < b),
                ">=" => Value::Bool(a >= b),
                "<=" => Value::Bool(a <= b),
                _ => return None,
            };
            Some(value)
        }
        (Value::Str(a), Value::Str(b)) => {
            let value = match op {
                "+" => Value::Str(format!("{a}{b}")),
                "==" => Value::Bool(a == b),
                "!=" => Value::Bool(a != b),
                ">" => Value::Bool(a > b),
                "<" => Value::Bool(a < b),
                ">=" => Value::Bool(a >= b),
                "<=" => Value::Bool(a <= b),
                _ => return None,
            };
            Some(value)
        }
        (Value::Bool(a), Value::Bool(b)) => {
            let value = match op {
                "&" => Value::Bool(*a && *b),
                "|" => Value::Bool(*a || *b),
                "==" => Value::Bool(a == b),
                "!=" => Value::Bool(a != b),
                _ => return None,
            };
            Some(value)
        }
        _ => None,
    }
}

/// Integer division rounding toward negative infinity
fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) { q - 1 } else { q }
}

/// Modulo taking the sign of the divisor, matching floor division
fn floor_mod(a: i64, b: i64) -> i64 {
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) { r + b } else { r }
}
