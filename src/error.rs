//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All pipeline stages (scanner, parser, resolver, runtime) convert their
//! failure modes into one of the variants defined here.  Each stage owns a
//! typed *kind* enum so callers can match on the exact failure, while the
//! outer [`LoxError`] adds the source location.
//!
//! The module **does not** print diagnostics itself.

use std::io;
use thiserror::Error;

use log::debug;

use crate::token::{Token, TokenType};

/// Lexical failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanErrorKind {
    #[error("Unterminated string.")]
    UnterminatedString,

    #[error("Unexpected character: {0}")]
    UnrecognizedToken(char),
}

/// Syntactic failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A required token was missing; carries the expectation message.
    #[error("{0}")]
    UnexpectedToken(String),

    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget,

    #[error("Can't have more than 255 parameters.")]
    TooManyParameters,

    #[error("Can't have more than 255 arguments.")]
    TooManyArguments,
}

/// Static‑analysis failures found by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveErrorKind {
    #[error("Already a variable with this name in this scope.")]
    AlreadyDeclared,

    #[error("Can't read local variable in its own initializer.")]
    ReadInOwnInitializer,

    #[error("Can't return from top-level code.")]
    ReturnOutsideFunction,

    #[error("Can't return a value from an initializer.")]
    ReturnValueFromInitializer,

    #[error("Can't use 'this' outside of a class.")]
    ThisOutsideClass,

    #[error("Can't use 'super' outside of a class.")]
    SuperOutsideClass,

    #[error("Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass,

    #[error("A class can't inherit from itself.")]
    InheritFromSelf,
}

/// Failures raised while evaluating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeErrorKind {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,

    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,

    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,

    #[error("Can only call functions and classes.")]
    NotCallable,

    #[error("Expected {expected} arguments but got {got}.")]
    Arity { expected: usize, got: usize },

    #[error("Undefined variable '{0}'.")]
    UndefinedVariable(String),

    #[error("Undefined property '{0}'.")]
    UndefinedProperty(String),

    #[error("Only instances have properties.")]
    OnlyInstancesHaveProperties,

    #[error("Only instances have fields.")]
    OnlyInstancesHaveFields,

    #[error("Superclass must be a class.")]
    SuperclassMustBeClass,

    /// Failure reported by a native function.
    #[error("{0}")]
    Native(String),
}

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {kind}")]
    Lex { kind: ScanErrorKind, line: usize },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error at {location}: {kind}")]
    Parse {
        kind: ParseErrorKind,
        /// `'lexeme'` or `end`.
        location: String,
        line: usize,
    },

    /// Static‑analysis (resolver) error.
    #[error("[line {line}] Error at {location}: {kind}")]
    Resolve {
        kind: ResolveErrorKind,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error, tagged with the offending line.
    #[error("{kind}\n[line {line}]")]
    Runtime { kind: RuntimeErrorKind, line: usize },

    /// Anything whose shape could not be classified.
    #[error("Unknown type error: {0}")]
    Internal(String),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        "end".to_string()
    } else {
        format!("'{}'", token.lexeme)
    }
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex(line: usize, kind: ScanErrorKind) -> Self {
        debug!("Creating Lex error: line={}, kind={}", line, kind);

        LoxError::Lex { kind, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse(token: &Token, kind: ParseErrorKind) -> Self {
        debug!("Creating Parse error: line={}, kind={}", token.line, kind);

        LoxError::Parse {
            kind,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve(token: &Token, kind: ResolveErrorKind) -> Self {
        debug!("Creating Resolve error: line={}, kind={}", token.line, kind);

        LoxError::Resolve {
            kind,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime(token: &Token, kind: RuntimeErrorKind) -> Self {
        debug!("Creating Runtime error: line={}, kind={}", token.line, kind);

        LoxError::Runtime {
            kind,
            line: token.line,
        }
    }

    /// Source line of the error, when it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. }
            | LoxError::Parse { line, .. }
            | LoxError::Resolve { line, .. }
            | LoxError::Runtime { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// `true` for errors found before execution starts.
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. }
        )
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
