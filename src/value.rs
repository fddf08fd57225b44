use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::callable::{Callable, LoxFunction, NativeFunction};
use crate::class::{LoxClass, LoxInstance};

/// Every runtime value a Lox program can produce.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Bool(bool),
    Nil,
    NativeFunction(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

impl Value {
    /// `nil` and `false` are falsy; everything else, `0` and `""` included,
    /// is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// The callable behind this value, if it can be called.
    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::NativeFunction(native) => Some(native.as_ref()),
            Value::Function(function) => Some(function.as_ref()),
            Value::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// `nil` equals only `nil`; scalars compare by value; functions, classes
    /// and instances compare by identity.  Mixed kinds are never equal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Shortest decimal text that round‑trips to `n`: `3` not `3.0`, `0.1`.
pub fn format_number(n: f64) -> String {
    format!("{}", n)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),

            Value::String(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::NativeFunction(_) => write!(f, "<native fn>"),

            Value::Function(function) => write!(f, "<fn {}>", function.name()),

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => write!(f, "{} instance", instance.borrow().class().name),
        }
    }
}
