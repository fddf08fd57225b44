//! Static resolver pass for the **Lox** interpreter.
//!
//! This resolver does three things in one AST walk:
//! 1. Build lexical scopes (stack of `HashMap<&str,bool>` tracking declared/defined).
//! 2. Report static errors (redeclaration, read in own initializer, invalid
//!    `return`, misplaced `this`/`super`, self‑inheritance).  Errors are
//!    collected; the walk carries on so one pass reports all of them.
//! 3. Tell the interpreter, for *each* local variable/`this`/`super`
//!    occurrence, how many scopes out its binding lives.  Occurrences left
//!    unrecorded are globals.

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::class::INITIALIZER;
use crate::error::{LoxError, ResolveErrorKind};
use crate::interpreter::Interpreter;
use crate::stack::ensure_sufficient_stack;
use crate::token::Token;
use log::{debug, info};
use std::collections::HashMap;

/// What kind of function body are we in?  Used to validate `return`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

/// What kind of class body are we in?  Used to validate `this`/`super`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

/// Resolver: tracks scopes, enforces static rules, and *records* binding
/// distances by calling back into the interpreter.
pub struct Resolver<'ast, 'interp> {
    interpreter: &'interp mut Interpreter,
    scopes: Vec<HashMap<&'ast str, bool>>, // false=declared, true=defined
    current_function: FunctionType,
    current_class: ClassType,
    errors: Vec<LoxError>,
}

impl<'ast, 'interp> Resolver<'ast, 'interp> {
    /// Create a new resolver bound to the given interpreter.
    pub fn new(interpreter: &'interp mut Interpreter) -> Self {
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            errors: Vec::new(),
        }
    }

    /// Walk all top‑level statements, returning every error found.
    pub fn resolve(mut self, statements: &'ast [Stmt]) -> Vec<LoxError> {
        info!(
            "Beginning resolve pass over {} statement(s)",
            statements.len()
        );

        self.resolve_stmts(statements);

        info!("Resolve pass finished with {} error(s)", self.errors.len());
        self.errors
    }

    fn resolve_stmts(&mut self, statements: &'ast [Stmt]) {
        for stmt in statements {
            self.resolve_stmt(stmt);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statement resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_stmt(&mut self, stmt: &'ast Stmt) {
        ensure_sufficient_stack(|| self.resolve_stmt_inner(stmt))
    }

    fn resolve_stmt_inner(&mut self, stmt: &'ast Stmt) {
        match stmt {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_stmts(statements);
                self.end_scope();
            }

            Stmt::Var { name, initializer } => {
                // declare → resolve initializer → define
                self.declare(name);
                if let Some(expr) = initializer {
                    self.resolve_expr(expr);
                }
                self.define(name);
            }

            Stmt::Function(declaration) => {
                // Defined before the body so the function can recurse.
                self.declare(&declaration.name);
                self.define(&declaration.name);
                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Expression(expr) | Stmt::Print(expr) => {
                self.resolve_expr(expr);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(eb) = else_branch.as_deref() {
                    self.resolve_stmt(eb);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, ResolveErrorKind::ReturnOutsideFunction);
                }

                if let Some(expr) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, ResolveErrorKind::ReturnValueFromInitializer);
                    }
                    self.resolve_expr(expr);
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.resolve_class(name, superclass.as_ref(), methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &'ast Token,
        superclass: Option<&'ast Expr>,
        methods: &'ast [std::rc::Rc<FunctionDecl>],
    ) {
        let enclosing_class = self.current_class;
        self.current_class = ClassType::Class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = superclass
            {
                if super_name.lexeme == name.lexeme {
                    self.error(super_name, ResolveErrorKind::InheritFromSelf);
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expr(superclass);

            self.begin_scope();
            self.define_implicit("super");
        }

        self.begin_scope();
        self.define_implicit("this");

        for method in methods {
            let kind = if method.name.lexeme == INITIALIZER {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };
            self.resolve_function(method, kind);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expression resolution
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve_expr(&mut self, expr: &'ast Expr) {
        ensure_sufficient_stack(|| self.resolve_expr_inner(expr))
    }

    fn resolve_expr_inner(&mut self, expr: &'ast Expr) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expr(inner),

            Expr::Unary { right, .. } => self.resolve_expr(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }

            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(name.lexeme.as_str()) == Some(&false) {
                        self.error(name, ResolveErrorKind::ReadInOwnInitializer);
                    }
                }

                self.resolve_local(*id, name);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }

            Expr::Get { object, .. } => self.resolve_expr(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, ResolveErrorKind::ThisOutsideClass);
                    return;
                }

                self.resolve_local(*id, keyword);
            }

            Expr::Super { id, keyword, .. } => match self.current_class {
                ClassType::None => self.error(keyword, ResolveErrorKind::SuperOutsideClass),
                ClassType::Class => self.error(keyword, ResolveErrorKind::SuperWithoutSuperclass),
                ClassType::Subclass => self.resolve_local(*id, keyword),
            },
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Function helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Enter a fresh scope for a function’s parameters + body.
    fn resolve_function(&mut self, declaration: &'ast FunctionDecl, kind: FunctionType) {
        let enclosing = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&declaration.body);
        self.end_scope();

        self.current_function = enclosing;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scope management
    // ─────────────────────────────────────────────────────────────────────────

    #[inline]
    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    #[inline]
    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Globals (no open scope) may be redeclared freely.
    fn declare(&mut self, name: &'ast Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };

        if scope.contains_key(name.lexeme.as_str()) {
            self.error(name, ResolveErrorKind::AlreadyDeclared);
            return;
        }

        scope.insert(name.lexeme.as_str(), false);
    }

    fn define(&mut self, name: &'ast Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.as_str(), true);
        }
    }

    fn define_implicit(&mut self, name: &'static str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, true);
        }
    }

    fn error(&mut self, token: &Token, kind: ResolveErrorKind) {
        self.errors.push(LoxError::resolve(token, kind));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Binding‑distance helper
    // ─────────────────────────────────────────────────────────────────────────

    /// Record this occurrence as a local at depth `d`, or leave it
    /// unrecorded (global) if no open scope declares the name.
    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name.lexeme.as_str()) {
                debug!("Resolved '{}' at depth {}", name.lexeme, depth);
                self.interpreter.note_local(id, depth);
                return;
            }
        }

        debug!("Resolved '{}' as global", name.lexeme);
    }
}

/// Resolve `statements`, recording distances in `interpreter`.  An empty
/// list means the program may be executed.
pub fn resolve(statements: &[Stmt], interpreter: &mut Interpreter) -> Vec<LoxError> {
    Resolver::new(interpreter).resolve(statements)
}
