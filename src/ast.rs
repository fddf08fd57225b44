//! Abstract syntax tree produced by the [`crate::parser`].
//!
//! Every node exclusively owns its children.  The tree is never mutated after
//! parsing; the resolver records binding distances out of band, keyed by the
//! [`ExprId`] carried on each name‑bearing expression.

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::token::Token;

/// Identity of a name‑bearing expression (`Variable`, `Assign`, `This`,
/// `Super`).  Ids come from one process‑wide counter, so trees parsed at
/// different times (e.g. successive REPL lines) never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(usize);

static NEXT_EXPR_ID: AtomicUsize = AtomicUsize::new(0);

impl ExprId {
    pub fn fresh() -> Self {
        ExprId(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A **literal constant** that appears directly in the source code.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    True,

    False,

    Nil,
}

/// **Abstract‑Syntax‑Tree node** representing every kind of *expression*.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary { operator: Token, right: Box<Expr> },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Variable access.
    Variable { id: ExprId, name: Token },

    /// Assignment expression: `identifier "=" expression`
    Assign {
        id: ExprId,
        name: Token,
        value: Box<Expr>,
    },

    /// Function‑ or method‑call expression
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The 'this' keyword inside a method.
    This { id: ExprId, keyword: Token },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token,
        method: Token,
    },
}

impl Expr {
    pub fn variable(name: Token) -> Self {
        Expr::Variable {
            id: ExprId::fresh(),
            name,
        }
    }
}

/// A function or method declaration.  Shared (`Rc`) between the tree and
/// every function value created from it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    pub body: Vec<Stmt>,
}

/// **Abstract‑Syntax‑Tree node** for *statements*.  A program is a sequence
/// of these nodes returned by [`crate::parser::Parser::parse`].
///
/// There is no `for` node: the parser desugars it into `Block`/`While`.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    While { condition: Expr, body: Box<Stmt> },

    Function(Rc<FunctionDecl>),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    Class {
        name: Token,
        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr>,
        methods: Vec<Rc<FunctionDecl>>,
    },
}
