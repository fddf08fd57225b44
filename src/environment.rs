use crate::error::{LoxError, Result, RuntimeErrorKind};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope.  Closures and bound methods clone the handle,
/// which keeps the whole enclosing chain alive for as long as they live.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: its bindings plus a link to the enclosing scope.
/// The global environment is the only one without an enclosing link.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wraps a fresh scope nested in `enclosing` into a shared handle.
    pub fn nested(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(enclosing.clone())))
    }

    /// Binds `name` in this scope, overwriting any previous binding here.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Looks `name` up, walking outward through the enclosing chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Reassigns an existing binding, walking outward through the chain.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Returns the scope exactly `distance` hops out from `env`.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Option<EnvRef> {
        let mut current = env.clone();

        for _ in 0..distance {
            let next = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    /// Reads `name` directly from the scope `distance` hops out, without
    /// searching the chain.
    pub fn get_at(env: &EnvRef, distance: usize, name: &Token) -> Result<Value> {
        Self::ancestor(env, distance)
            .and_then(|scope| scope.borrow().values.get(&name.lexeme).cloned())
            .ok_or_else(|| undefined(name))
    }

    pub fn assign_at(env: &EnvRef, distance: usize, name: &Token, value: Value) -> Result<()> {
        let scope = Self::ancestor(env, distance).ok_or_else(|| undefined(name))?;
        let mut scope = scope.borrow_mut();

        match scope.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(undefined(name)),
        }
    }
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, RuntimeErrorKind::UndefinedVariable(name.lexeme.clone()))
}
