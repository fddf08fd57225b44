//! Tree‑walking evaluator.
//!
//! Executes resolved statements against a chain of [`Environment`]s.  Local
//! variable accesses jump straight to the ancestor scope recorded by the
//! resolver; anything the resolver left unrecorded is looked up in the
//! globals, which is what allows top‑level functions to refer to each other
//! before both are defined.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::callable::{self, LoxFunction};
use crate::class::{LoxClass, LoxInstance, INITIALIZER};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result, RuntimeErrorKind};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.  `Return` unwinds to the nearest call.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: EnvRef,
    environment: EnvRef,
    /// Scope distance for every resolved local reference.
    locals: HashMap<ExprId, usize>,
    out: Rc<RefCell<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    /// Creates an interpreter whose `print` statements write to `out`.
    pub fn with_output(out: Rc<RefCell<dyn Write>>) -> Self {
        info!("Initializing Interpreter");

        let globals = Rc::new(RefCell::new(Environment::new()));

        debug!("Defining native function 'clock'");
        globals
            .borrow_mut()
            .define("clock", Value::NativeFunction(Rc::new(callable::clock())));

        Self {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            out,
        }
    }

    /// Records that the reference `id` binds `depth` scopes out from where it
    /// is evaluated.  Called by the resolver.
    pub fn note_local(&mut self, id: ExprId, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Runs a resolved program.  Execution stops at the first runtime error,
    /// so at most one error is ever returned; [`crate::run`] hands it on as a
    /// one-element list.  The current environment is back at the globals
    /// afterwards either way.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Err(e) = self.execute(stmt) {
                self.environment = self.globals.clone();
                return Err(e);
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ───────────────────────────── statements ─────────────────────────────

    pub fn execute(&mut self, stmt: &Stmt) -> Result<Flow> {
        ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out.borrow_mut(), "{}", value)?;
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}' = {}", name.lexeme, value);
                self.environment.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope = Environment::nested(&self.environment);
                return self.execute_block(statements, scope);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_stmt) = else_branch {
                    return self.execute(else_stmt);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                let function = LoxFunction::new(declaration.clone(), self.environment.clone(), false);
                self.environment
                    .borrow_mut()
                    .define(&declaration.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.execute_class(name, superclass.as_ref(), methods)?,
        }

        Ok(Flow::Normal)
    }

    /// Runs `statements` inside `environment`, restoring the previous
    /// environment on every exit path.
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> Result<Flow> {
        let previous = mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Rc<FunctionDecl>],
    ) -> Result<()> {
        debug!("Defining class '{}'", name.lexeme);

        // Checked before the name is bound, so a bad superclass leaves any
        // earlier binding of the name untouched.
        let superclass = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let at = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(LoxError::runtime(at, RuntimeErrorKind::SuperclassMustBeClass));
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(&name.lexeme, Value::Nil);

        let method_scope = match &superclass {
            Some(class) => {
                let scope = Environment::nested(&self.environment);
                scope
                    .borrow_mut()
                    .define("super", Value::Class(class.clone()));
                scope
            }
            None => self.environment.clone(),
        };

        let methods = methods
            .iter()
            .map(|declaration| {
                let is_initializer = declaration.name.lexeme == INITIALIZER;
                let function =
                    LoxFunction::new(declaration.clone(), method_scope.clone(), is_initializer);
                (declaration.name.lexeme.clone(), Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme.clone(), superclass, methods);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))
    }

    // ──────────────────────────── expressions ─────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val = self.evaluate(left)?;

                let decided = if operator.token_type == TokenType::OR {
                    left_val.is_truthy()
                } else {
                    !left_val.is_truthy()
                };

                if decided {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => {
                        Environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val = self.evaluate(callee)?;

                let mut arg_values = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    arg_values.push(self.evaluate(arg)?);
                }

                self.invoke_callable(&callee_val, paren, arg_values)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(
                    name,
                    RuntimeErrorKind::OnlyInstancesHaveProperties,
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(
                        name,
                        RuntimeErrorKind::OnlyInstancesHaveFields,
                    ));
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());
                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// `super.method`: the superclass sits `distance` scopes out and the
    /// receiver one scope closer, in the slot `bind` created.
    fn evaluate_super(&mut self, id: ExprId, keyword: &Token, method: &Token) -> Result<Value> {
        let distance = *self.locals.get(&id).ok_or_else(|| {
            LoxError::Internal(format!("unresolved 'super' on line {}", keyword.line))
        })?;

        let Value::Class(superclass) = Environment::get_at(&self.environment, distance, keyword)?
        else {
            return Err(LoxError::Internal("'super' is not bound to a class".into()));
        };

        let this = Token::synthetic("this", keyword.line);
        let Value::Instance(instance) =
            Environment::get_at(&self.environment, distance.saturating_sub(1), &this)?
        else {
            return Err(LoxError::Internal("'this' is not bound to an instance".into()));
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(&instance)))),
            None => Err(LoxError::runtime(
                method,
                RuntimeErrorKind::UndefinedProperty(method.lexeme.clone()),
            )),
        }
    }

    fn evaluate_unary(&mut self, op: &Token, expr: &Expr) -> Result<Value> {
        let right_val = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(op, RuntimeErrorKind::OperandMustBeNumber)),
            },
            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),
            _ => Err(LoxError::Internal(format!(
                "invalid unary operator '{}' on line {}",
                op.lexeme, op.line
            ))),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;

        debug!("Binary '{}' on {} and {}", op.lexeme, left_val, right_val);

        match op.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(
                    op,
                    RuntimeErrorKind::OperandsMustBeNumbersOrStrings,
                )),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            _ => {
                let (Value::Number(a), Value::Number(b)) = (left_val, right_val) else {
                    return Err(LoxError::runtime(op, RuntimeErrorKind::OperandsMustBeNumbers));
                };

                match op.token_type {
                    TokenType::MINUS => Ok(Value::Number(a - b)),
                    TokenType::STAR => Ok(Value::Number(a * b)),
                    TokenType::SLASH => Ok(Value::Number(a / b)),
                    TokenType::GREATER => Ok(Value::Bool(a > b)),
                    TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
                    TokenType::LESS => Ok(Value::Bool(a < b)),
                    TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
                    _ => Err(LoxError::Internal(format!(
                        "invalid binary operator '{}' on line {}",
                        op.lexeme, op.line
                    ))),
                }
            }
        }
    }

    fn invoke_callable(
        &mut self,
        callee_val: &Value,
        paren: &Token,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        let Some(callable) = callee_val.as_callable() else {
            return Err(LoxError::runtime(paren, RuntimeErrorKind::NotCallable));
        };

        if arguments.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                RuntimeErrorKind::Arity {
                    expected: callable.arity(),
                    got: arguments.len(),
                },
            ));
        }

        debug!("Calling {} with {} arguments", callee_val, arguments.len());
        callable.call(self, arguments, paren)
    }
}
