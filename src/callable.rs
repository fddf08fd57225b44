//! Callable runtime entities: user functions (closures and bound methods)
//! and native functions.  Classes implement [`Callable`] in [`crate::class`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result, RuntimeErrorKind};
use crate::interpreter::{Flow, Interpreter};
use crate::token::Token;
use crate::value::Value;

/// Anything that can appear in callee position of a call expression.
pub trait Callable {
    fn arity(&self) -> usize;

    /// Invokes the callee.  The interpreter has already checked that
    /// `arguments.len() == self.arity()`; `paren` locates the call site.
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>, paren: &Token)
        -> Result<Value>;
}

/// A function implemented in Rust and exposed as a global.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: fn(&[Value]) -> std::result::Result<Value, String>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        _interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(&arguments)
            .map_err(|message| LoxError::runtime(paren, RuntimeErrorKind::Native(message)))
    }
}

/// A user‑defined function: its declaration plus the environment that was
/// active where it was defined.
pub struct LoxFunction {
    declaration: Rc<FunctionDecl>,
    closure: EnvRef,
    is_initializer: bool,
}

impl fmt::Debug for LoxFunction {
    // The closure chain may contain this very function; never print it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.declaration.name.lexeme)
            .field("arity", &self.declaration.params.len())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}

impl LoxFunction {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    /// Returns a copy of this method whose closure has `this` bound to
    /// `instance` in a fresh one‑slot scope.
    pub fn bind(&self, instance: &Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let scope = Environment::nested(&self.closure);
        scope
            .borrow_mut()
            .define("this", Value::Instance(instance.clone()));

        LoxFunction {
            declaration: self.declaration.clone(),
            closure: scope,
            is_initializer: self.is_initializer,
        }
    }

    fn bound_this(&self) -> Result<Value> {
        let this = Token::synthetic("this", self.declaration.name.line);
        Environment::get_at(&self.closure, 0, &this)
    }
}

impl Callable for LoxFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        _paren: &Token,
    ) -> Result<Value> {
        debug!("Calling user-defined function '{}'", self.name());

        // Parent is the *defining* scope, not the caller's.
        let environment = Environment::nested(&self.closure);
        {
            let mut scope = environment.borrow_mut();
            for (param, argument) in self.declaration.params.iter().zip(arguments) {
                scope.define(&param.lexeme, argument);
            }
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            return self.bound_this();
        }

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        })
    }
}

/// `clock()`: seconds since the Unix epoch.
pub fn clock() -> NativeFunction {
    NativeFunction {
        name: "clock",
        arity: 0,
        func: |_args: &[Value]| {
            let millis = chrono::Utc::now().timestamp_millis();
            Ok(Value::Number(millis as f64 / 1000.0))
        },
    }
}
