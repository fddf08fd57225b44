//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It transforms source text into a sequence of [`Token`]s, skipping whitespace
//! and comments, and emitting exactly one `EOF` token at the end regardless of
//! how many errors were reported on the way.  Designed as a `FusedIterator`,
//! it can be chained safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token, LoxError>` on each `.next()`, where `Ok(token)` is a
//!   scanned token and `Err` reports a lexing error with line information.
//!   Scanning continues after an error.
//!
//! - `scan(src) -> (Vec<Token>, Vec<LoxError>)`
//!   Drains a scanner, splitting tokens from diagnostics.
//!
//! # Token Recognition
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - Two‑character operators: `!=`, `==`, `<=`, `>=` (maximal munch).
//! - String literals: `"` … `"`, allowing multi‑line and reporting unterminated errors.
//! - Numeric literals: integer and optional fractional part, no sign or exponent.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a perfect‑hash `KEYWORDS` map.
//! - Comments: `//` to end of line, skipped with `memchr`.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("print 123; // example");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{LoxError, Result, ScanErrorKind};
use crate::token::{Token, TokenType};
use log::{info, trace};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// A single pass **scanner / lexer** that converts source text into a
/// sequence of [`Token`]s.
pub struct Scanner<'a> {
    text: &'a str,
    src: &'a [u8],
    /// First byte of the lexeme being scanned.
    start: usize,
    /// One past the last byte examined.  Goes to `len + 1` once `EOF` is out.
    curr: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(text: &'a str) -> Self {
        info!("Scanner created over {} bytes", text.len());

        Self {
            text,
            src: text.as_bytes(),
            start: 0,
            curr: 0,
            line: 1,
        }
    }

    // ───────────────────────────── cursor ──────────────────────────────────

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Byte `offset` past the cursor, or `0` beyond the input.
    #[inline(always)]
    fn byte_at(&self, offset: usize) -> u8 {
        self.src.get(self.curr + offset).copied().unwrap_or(0)
    }

    #[inline(always)]
    fn bump(&mut self) -> u8 {
        let b = self.byte_at(0);
        self.curr += 1;
        b
    }

    /// Consumes `expected` if it is next and picks the long or short kind.
    #[inline(always)]
    fn either(&mut self, expected: u8, long: TokenType, short: TokenType) -> TokenType {
        if !self.is_at_end() && self.byte_at(0) == expected {
            self.curr += 1;
            long
        } else {
            short
        }
    }

    #[inline(always)]
    fn lexeme(&self) -> &'a str {
        &self.text[self.start..self.curr]
    }

    // ───────────────────────────── lexing ──────────────────────────────────

    /// Scans the lexeme starting at `self.start`.  `Ok(None)` means it was
    /// whitespace or a comment.
    fn lex(&mut self) -> Result<Option<TokenType>> {
        let kind = match self.bump() {
            b'(' => TokenType::LEFT_PAREN,
            b')' => TokenType::RIGHT_PAREN,
            b'{' => TokenType::LEFT_BRACE,
            b'}' => TokenType::RIGHT_BRACE,
            b',' => TokenType::COMMA,
            b'.' => TokenType::DOT,
            b'-' => TokenType::MINUS,
            b'+' => TokenType::PLUS,
            b';' => TokenType::SEMICOLON,
            b'*' => TokenType::STAR,

            b'!' => self.either(b'=', TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.either(b'=', TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.either(b'=', TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.either(b'=', TokenType::GREATER_EQUAL, TokenType::GREATER),

            b'/' if self.byte_at(0) == b'/' => {
                // Stop on the newline so the line count still sees it.
                self.curr = match memchr(b'\n', &self.src[self.curr..]) {
                    Some(pos) => self.curr + pos,
                    None => self.src.len(),
                };
                return Ok(None);
            }
            b'/' => TokenType::SLASH,

            b' ' | b'\r' | b'\t' => return Ok(None),

            b'\n' => {
                self.line += 1;
                return Ok(None);
            }

            b'"' => self.string()?,

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            _ => {
                // Step over the whole character, however many bytes it takes.
                let ch = self.text[self.start..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.curr = self.start + ch.len_utf8();

                return Err(LoxError::lex(
                    self.line,
                    ScanErrorKind::UnrecognizedToken(ch),
                ));
            }
        };

        Ok(Some(kind))
    }

    /// Body of a string literal; the opening quote is already consumed.
    /// Strings may span lines.
    fn string(&mut self) -> Result<TokenType> {
        let rest = &self.src[self.curr..];

        let Some(len) = memchr(b'"', rest) else {
            self.line += rest.iter().filter(|&&b| b == b'\n').count();
            self.curr = self.src.len();
            return Err(LoxError::lex(self.line, ScanErrorKind::UnterminatedString));
        };

        self.line += rest[..len].iter().filter(|&&b| b == b'\n').count();
        self.curr += len + 1;

        let contents = &self.text[self.start + 1..self.curr - 1];
        Ok(TokenType::STRING(contents.to_owned()))
    }

    /// `123` or `3.14`.  No sign, no exponent, no trailing dot.
    fn number(&mut self) -> TokenType {
        while self.byte_at(0).is_ascii_digit() {
            self.curr += 1;
        }

        if self.byte_at(0) == b'.' && self.byte_at(1).is_ascii_digit() {
            self.curr += 1;
            while self.byte_at(0).is_ascii_digit() {
                self.curr += 1;
            }
        }

        // Only ASCII digits and at most one inner dot, so this parses.
        TokenType::NUMBER(self.lexeme().parse().unwrap_or(0.0))
    }

    fn identifier(&mut self) -> TokenType {
        while matches!(self.byte_at(0), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.curr += 1;
        }

        KEYWORDS
            .get(self.lexeme())
            .cloned()
            .unwrap_or(TokenType::IDENTIFIER)
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.src.len();

        while self.curr < len {
            self.start = self.curr;

            match self.lex() {
                Ok(Some(kind)) => {
                    trace!("Scanned {:?} on line {}", kind, self.line);
                    return Some(Ok(Token::new(kind, self.lexeme(), self.line)));
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        // Exactly one EOF, then the iterator is exhausted.
        if self.curr == len {
            self.curr += 1;
            return Some(Ok(Token::new(TokenType::EOF, "", self.line)));
        }

        None
    }
}

impl<'a> FusedIterator for Scanner<'a> {}

/// Scan all of `source`, returning the token stream (always ending in `EOF`)
/// and every lexical error found along the way.
pub fn scan(source: &str) -> (Vec<Token>, Vec<LoxError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    info!(
        "Scan finished: {} tokens, {} errors",
        tokens.len(),
        errors.len()
    );

    (tokens, errors)
}
