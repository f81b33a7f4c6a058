//! Runtime values for the interpreter

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::functab::FuncInfo;

/// Shared mutable cell holding one runtime value.
///
/// Assignment overwrites the cell content in place, so every alias of the
/// cell (reference parameters, `this`, captured bindings) observes the
/// change.
pub type Cell = Rc<RefCell<Value>>;

/// Shared field map backing an object value.
///
/// Cloning a `Value::Object` clones the handle, never the map: all copies
/// of an object variable see mutations of its fields.
pub type FieldMap = Rc<RefCell<HashMap<String, Cell>>>;

/// Runtime type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    Bool,
    Str,
    Void,
    Func,
    Object,
}

impl Type {
    /// Reserved result-variable name used to pass a return value of this
    /// type back to the caller. Void returns bind nothing.
    pub fn result_var(self) -> Option<&'static str> {
        match self {
            Type::Int => Some("resulti"),
            Type::Str => Some("results"),
            Type::Bool => Some("resultb"),
            Type::Func => Some("resultf"),
            Type::Object => Some("resulto"),
            Type::Void => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Str => write!(f, "string"),
            Type::Void => write!(f, "void"),
            Type::Func => write!(f, "func"),
            Type::Object => write!(f, "object"),
        }
    }
}

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit integer
    Int(i64),
    /// Boolean
    Bool(bool),
    /// String (stored without its source-literal quotes)
    Str(String),
    /// Absent value (void returns)
    Void,
    /// Function or lambda handle
    Func(Rc<FuncInfo>),
    /// Object: shared name → cell field map
    Object(FieldMap),
}

impl Value {
    /// Wrap in a fresh shared cell
    pub fn into_cell(self) -> Cell {
        Rc::new(RefCell::new(self))
    }

    /// Runtime type tag
    pub fn type_of(&self) -> Type {
        match self {
            Value::Int(_) => Type::Int,
            Value::Bool(_) => Type::Bool,
            Value::Str(_) => Type::Str,
            Value::Void => Type::Void,
            Value::Func(_) => Type::Func,
            Value::Object(_) => Type::Object,
        }
    }

    /// Default value for a declared type keyword, or None if the keyword
    /// is not a declarable type
    pub fn default_for(keyword: &str) -> Option<Value> {
        match keyword {
            "int" => Some(Value::Int(0)),
            "string" => Some(Value::Str(String::new())),
            "bool" => Some(Value::Bool(false)),
            "void" => Some(Value::Void),
            "func" => Some(Value::Func(Rc::new(FuncInfo::placeholder()))),
            "object" => Some(Value::Object(Rc::new(RefCell::new(HashMap::new())))),
            _ => None,
        }
    }

    /// Copy that shares no storage with the source: object field maps are
    /// copied recursively into fresh cells. Func metadata stays shared
    /// (`FuncInfo` is immutable once created).
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::Object(fields) => {
                let copied: HashMap<String, Cell> = fields
                    .borrow()
                    .iter()
                    .map(|(name, cell)| (name.clone(), cell.borrow().deep_copy().into_cell()))
                    .collect();
                Value::Object(Rc::new(RefCell::new(copied)))
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Void => write!(f, "void"),
            Value::Func(info) => write!(f, "<func {}>", info.name),
            Value::Object(_) => write!(f, "<object>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}
