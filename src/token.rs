use serde::Serialize;
use std::fmt;
use std::mem;

/// Every token kind of Lox.  `STRING` and `NUMBER` carry their literal
/// value; equality between kinds ignores that payload.
#[rustfmt::skip]
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    // Single-character punctuation.
    LEFT_PAREN, RIGHT_PAREN, LEFT_BRACE, RIGHT_BRACE,
    COMMA, DOT, MINUS, PLUS, SEMICOLON, SLASH, STAR,

    // One or two character operators.
    BANG, BANG_EQUAL,
    EQUAL, EQUAL_EQUAL,
    GREATER, GREATER_EQUAL,
    LESS, LESS_EQUAL,

    // Literals.
    IDENTIFIER,
    /// Contents without the surrounding quotes.
    STRING(String),
    NUMBER(f64),

    // Keywords.
    AND, CLASS, ELSE, FALSE, FUN, FOR, IF, NIL, OR,
    PRINT, RETURN, SUPER, THIS, TRUE, VAR, WHILE,

    EOF,
}

impl TokenType {
    /// Variant name without payload, e.g. `"LEFT_PAREN"` or `"NUMBER"`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::STRING(_) => "STRING",
            TokenType::NUMBER(_) => "NUMBER",
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::SLASH => "SLASH",
            TokenType::STAR => "STAR",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::AND => "AND",
            TokenType::CLASS => "CLASS",
            TokenType::ELSE => "ELSE",
            TokenType::FALSE => "FALSE",
            TokenType::FUN => "FUN",
            TokenType::FOR => "FOR",
            TokenType::IF => "IF",
            TokenType::NIL => "NIL",
            TokenType::OR => "OR",
            TokenType::PRINT => "PRINT",
            TokenType::RETURN => "RETURN",
            TokenType::SUPER => "SUPER",
            TokenType::THIS => "THIS",
            TokenType::TRUE => "TRUE",
            TokenType::VAR => "VAR",
            TokenType::WHILE => "WHILE",
            TokenType::EOF => "EOF",
        }
    }
}

impl PartialEq for TokenType {
    /// Two TokenTypes are equal if they share the same variant
    /// (ignoring any inner data). Uses `mem::discriminant` to compare.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// A scanned token, including its type, the original lexeme,
/// and the line number where it was found.
///
/// Tokens own their lexeme so the AST built from them can outlive the
/// source buffer (closures defined on one REPL line stay callable later).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    /// The category of this token, with its literal payload if any.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: String,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl Token {
    /// Create a new Token with the given type, lexeme, and line.
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// Synthetic identifier used for the implicit `this` / `super` slots.
    pub fn synthetic(name: &str, line: usize) -> Self {
        Self::new(TokenType::IDENTIFIER, name, line)
    }
}

/// Renders a literal number the way `tokenize` shows it: `3` → `3.0`.
fn write_number_literal(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        write!(f, "{}.0", buf.format(n as i64))
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.token_type.name(), self.lexeme)?;

        match &self.token_type {
            TokenType::STRING(s) => write!(f, "{}", s),
            TokenType::NUMBER(n) => write_number_literal(f, *n),
            _ => write!(f, "null"),
        }
    }
}
