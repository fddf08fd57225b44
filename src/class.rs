use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, LoxFunction};
use crate::error::{LoxError, Result, RuntimeErrorKind};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Name of the method run when a class is called.
pub const INITIALIZER: &str = "init";

pub struct LoxClass {
    pub name: String,
    pub superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
}

impl fmt::Debug for LoxClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field(
                "superclass",
                &self.superclass.as_ref().map(|class| class.name.clone()),
            )
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    /// Looks in this class first, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        self.methods.get(name).cloned().or_else(|| {
            self.superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name))
        })
    }
}

impl Callable for Rc<LoxClass> {
    fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |initializer| initializer.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        debug!("Instantiating class '{}'", self.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(self.clone())));

        if let Some(initializer) = self.find_method(INITIALIZER) {
            initializer
                .bind(&instance)
                .call(interpreter, arguments, paren)?;
        }

        Ok(Value::Instance(instance))
    }
}

/// An object: its class plus fields created on first assignment.
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl fmt::Debug for LoxInstance {
    // Fields may refer back to this instance, so only their names are shown.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass> {
        &self.class
    }

    /// Property read: own fields shadow methods; methods come back bound.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value> {
        let this = instance.borrow();

        if let Some(value) = this.fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        match this.class.find_method(&name.lexeme) {
            Some(method) => Ok(Value::Function(Rc::new(method.bind(instance)))),
            None => Err(LoxError::runtime(
                name,
                RuntimeErrorKind::UndefinedProperty(name.lexeme.clone()),
            )),
        }
    }

    /// Property write always lands in the instance's own fields.
    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}
