/*!
Recursive‑descent parser for Lox.

Time & Space Complexity
=======================

* **n** = number of tokens (including the sole EOF).

Each token is consumed once via `advance()`; error recovery
(`synchronize()`) only discards tokens up to the next statement boundary.
Overall **Θ(n)** time, **O(n)** space for the AST.  Call‑stack depth grows with
syntactic nesting.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `declaration`, `synchronize` | `debug`| Descent into grammar branches, recovery.  |

--------------------------------------------------------------------------------
Grammar (EBNF)
--------------

```text
program        → declaration* EOF ;
declaration    → classDecl | funDecl | varDecl | statement ;
classDecl      → "class" IDENT ( "<" IDENT )? "{" function* "}" ;
funDecl        → "fun" function ;
function       → IDENT "(" parameters? ")" block ;
varDecl        → "var" IDENT ( "=" expression )? ";" ;
statement      → exprStmt | forStmt | ifStmt | printStmt
               | returnStmt | whileStmt | block ;
forStmt        → "for" "(" ( varDecl | exprStmt | ";" )
                 expression? ";" expression? ")" statement ;
returnStmt     → "return" expression? ";" ;
block          → "{" declaration* "}" ;
expression     → assignment ;
assignment     → ( call "." )? IDENT "=" assignment | logic_or ;
logic_or       → logic_and ( "or" logic_and )* ;
logic_and      → equality  ( "and" equality )* ;
equality       → comparison ( ( "!=" | "==" ) comparison )* ;
comparison     → term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
term           → factor ( ( "-" | "+" ) factor )* ;
factor         → unary ( ( "/" | "*" ) unary )* ;
unary          → ( "!" | "-" ) unary | call ;
call           → primary ( "(" arguments? ")" | "." IDENT )* ;
primary        → NUMBER | STRING | "true" | "false" | "nil" | "this"
               | IDENT | "(" expression ")" | "super" "." IDENT ;
```

`for` loops never reach the AST: they are desugared into an optional
initializer, a `while` whose condition defaults to `true`, and a body block
with the increment appended.
*/

use std::mem;
use std::rc::Rc;

use crate::ast::{Expr, ExprId, FunctionDecl, LiteralValue, Stmt};
use crate::error::{LoxError, ParseErrorKind, Result};
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};

use log::{debug, info};

const MAX_ARITY: usize = 255;

/// Stands in for the `EOF` of a hand‑built token slice that lacks one.
static MISSING_EOF: Token = Token {
    token_type: TokenType::EOF,
    lexeme: String::new(),
    line: 0,
};

/// Top‑level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    /// Errors that did not abort the current declaration.
    errors: Vec<LoxError>,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.  `tokens` must end with an `EOF` token, as
    /// produced by the scanner.
    pub fn new(tokens: &'a [Token]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program.  Every error found is returned; statements
    /// that failed to parse are omitted from the list.
    pub fn parse(&mut self) -> (Vec<Stmt>, Vec<LoxError>) {
        info!("Beginning parse phase");

        let mut statements: Vec<Stmt> = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        info!(
            "Parse finished: {} statements, {} errors",
            statements.len(),
            self.errors.len()
        );

        (statements, mem::take(&mut self.errors))
    }

    /// Parse a single expression that must span the whole input.
    pub fn parse_expression(&mut self) -> std::result::Result<Expr, Vec<LoxError>> {
        info!("Parsing a single expression");

        let parsed = self.expression().and_then(|expr| {
            if self.is_at_end() {
                Ok(expr)
            } else {
                Err(self.error(ParseErrorKind::UnexpectedToken(
                    "Expect end of expression.".into(),
                )))
            }
        });

        let mut errors = mem::take(&mut self.errors);

        match parsed {
            Ok(expr) if errors.is_empty() => Ok(expr),
            Ok(_) => Err(errors),
            Err(e) => {
                errors.push(e);
                Err(errors)
            }
        }
    }

    // ──────────────────────── declaration rules ───────────────────

    /// Parses one declaration, recovering at the next statement boundary on
    /// failure.
    fn declaration(&mut self) -> Option<Stmt> {
        ensure_sufficient_stack(|| self.declaration_inner())
    }

    fn declaration_inner(&mut self) -> Option<Stmt> {
        debug!("Entering declaration at line {}", self.peek().line);

        let result = if self.matches(TokenType::CLASS) {
            self.class_declaration()
        } else if self.matches(TokenType::FUN) {
            self.function("function").map(Stmt::Function)
        } else if self.matches(TokenType::VAR) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(e) => {
                self.errors.push(e);
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expect class name.")?;

        let superclass = if self.matches(TokenType::LESS) {
            let super_name = self.consume(TokenType::IDENTIFIER, "Expect superclass name.")?;
            Some(Expr::variable(super_name))
        } else {
            None
        };

        self.consume(TokenType::LEFT_BRACE, "Expect '{' before class body.")?;

        let mut methods: Vec<Rc<FunctionDecl>> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            methods.push(self.function("method")?);
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after class body.")?;

        Ok(Stmt::Class {
            name,
            superclass,
            methods,
        })
    }

    /// `kind` is "function" or "method"; it only shapes error messages.
    fn function(&mut self, kind: &str) -> Result<Rc<FunctionDecl>> {
        let name: Token = self.consume(TokenType::IDENTIFIER, &format!("Expect {} name.", kind))?;

        self.consume(
            TokenType::LEFT_PAREN,
            &format!("Expect '(' after {} name.", kind),
        )?;

        let mut params: Vec<Token> = Vec::new();
        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if params.len() >= MAX_ARITY {
                    let e = self.error(ParseErrorKind::TooManyParameters);
                    self.errors.push(e);
                }

                params.push(self.consume(TokenType::IDENTIFIER, "Expect parameter name.")?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after parameters.")?;

        self.consume(
            TokenType::LEFT_BRACE,
            &format!("Expect '{{' before {} body.", kind),
        )?;
        let body = self.block()?;

        Ok(Rc::new(FunctionDecl { name, params, body }))
    }

    fn var_declaration(&mut self) -> Result<Stmt> {
        let name: Token = self.consume(TokenType::IDENTIFIER, "Expect variable name.")?;

        let initializer: Option<Expr> = if self.matches(TokenType::EQUAL) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(
            TokenType::SEMICOLON,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::Var { name, initializer })
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Stmt> {
        if self.matches(TokenType::FOR) {
            self.for_statement()
        } else if self.matches(TokenType::IF) {
            self.if_statement()
        } else if self.matches(TokenType::WHILE) {
            self.while_statement()
        } else if self.matches(TokenType::RETURN) {
            self.return_statement()
        } else if self.matches(TokenType::LEFT_BRACE) {
            Ok(Stmt::Block(self.block()?))
        } else if self.matches(TokenType::PRINT) {
            self.print_statement()
        } else {
            self.expression_statement()
        }
    }

    fn for_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(TokenType::SEMICOLON) {
            None
        } else if self.matches(TokenType::VAR) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::SEMICOLON, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenType::RIGHT_PAREN) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after for clauses.")?;

        let mut body: Stmt = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(LiteralValue::True));
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    fn print_statement(&mut self) -> Result<Stmt> {
        let value: Expr = self.expression()?;

        self.consume(TokenType::SEMICOLON, "Expect ';' after value.")?;

        Ok(Stmt::Print(value))
    }

    fn expression_statement(&mut self) -> Result<Stmt> {
        let expr: Expr = self.expression()?;
        self.consume(TokenType::SEMICOLON, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    fn if_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'if'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after if condition.")?;

        let then_branch: Box<Stmt> = Box::new(self.statement()?);
        let else_branch: Option<Box<Stmt>> = if self.matches(TokenType::ELSE) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt> {
        self.consume(TokenType::LEFT_PAREN, "Expect '(' after 'while'.")?;
        let condition: Expr = self.expression()?;
        self.consume(TokenType::RIGHT_PAREN, "Expect ')' after condition.")?;
        let body: Box<Stmt> = Box::new(self.statement()?);

        Ok(Stmt::While { condition, body })
    }

    fn return_statement(&mut self) -> Result<Stmt> {
        let keyword: Token = self.previous().clone();
        let value: Option<Expr> = if !self.check(TokenType::SEMICOLON) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenType::SEMICOLON, "Expect ';' after return value.")?;
        Ok(Stmt::Return { keyword, value })
    }

    fn block(&mut self) -> Result<Vec<Stmt>> {
        let mut statements: Vec<Stmt> = Vec::new();

        while !self.check(TokenType::RIGHT_BRACE) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenType::RIGHT_BRACE, "Expect '}' after block.")?;
        Ok(statements)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Expr> {
        ensure_sufficient_stack(|| self.assignment())
    }

    fn assignment(&mut self) -> Result<Expr> {
        let expr: Expr = self.logical_or()?;

        if self.matches(TokenType::EQUAL) {
            let equals: Token = self.previous().clone();
            let value: Expr = self.assignment()?;

            return match expr {
                Expr::Variable { name, .. } => Ok(Expr::Assign {
                    id: ExprId::fresh(),
                    name,
                    value: Box::new(value),
                }),

                Expr::Get { object, name } => Ok(Expr::Set {
                    object,
                    name,
                    value: Box::new(value),
                }),

                // Reported, but the parser is not confused: keep going.
                other => {
                    self.errors.push(LoxError::parse(
                        &equals,
                        ParseErrorKind::InvalidAssignmentTarget,
                    ));
                    Ok(other)
                }
            };
        }

        Ok(expr)
    }

    fn logical_or(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.logical_and()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.equality()?;

        while self.matches(TokenType::AND) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.equality()?;

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    /// Shared loop for the left‑associative binary levels.
    fn binary_level(
        &mut self,
        operators: &[TokenType],
        next: fn(&mut Self) -> Result<Expr>,
    ) -> Result<Expr> {
        let mut expr: Expr = next(self)?;

        while operators.iter().any(|op| self.check(op.clone())) {
            let operator: Token = self.advance().clone();
            let right: Expr = next(self)?;

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }

        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr> {
        self.binary_level(
            &[TokenType::BANG_EQUAL, TokenType::EQUAL_EQUAL],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr> {
        self.binary_level(
            &[
                TokenType::GREATER,
                TokenType::GREATER_EQUAL,
                TokenType::LESS,
                TokenType::LESS_EQUAL,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Expr> {
        self.binary_level(&[TokenType::MINUS, TokenType::PLUS], Self::factor)
    }

    fn factor(&mut self) -> Result<Expr> {
        self.binary_level(&[TokenType::STAR, TokenType::SLASH], Self::unary)
    }

    fn unary(&mut self) -> Result<Expr> {
        if self.matches(TokenType::BANG) || self.matches(TokenType::MINUS) {
            let operator: Token = self.previous().clone();
            let right: Expr = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                right: Box::new(right),
            });
        }

        self.call()
    }

    fn call(&mut self) -> Result<Expr> {
        let mut expr: Expr = self.primary()?;

        loop {
            if self.matches(TokenType::LEFT_PAREN) {
                expr = self.finish_call(expr)?;
            } else if self.matches(TokenType::DOT) {
                let name: Token =
                    self.consume(TokenType::IDENTIFIER, "Expect property name after '.'.")?;

                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr> {
        let mut arguments: Vec<Expr> = Vec::new();
        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                if arguments.len() >= MAX_ARITY {
                    let e = self.error(ParseErrorKind::TooManyArguments);
                    self.errors.push(e);
                }

                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        let paren: Token = self.consume(TokenType::RIGHT_PAREN, "Expect ')' after arguments.")?;

        Ok(Expr::Call {
            callee: Box::new(callee),
            paren,
            arguments,
        })
    }

    fn primary(&mut self) -> Result<Expr> {
        let token: &Token = self.peek();

        let expr = match &token.token_type {
            TokenType::FALSE => Expr::Literal(LiteralValue::False),
            TokenType::TRUE => Expr::Literal(LiteralValue::True),
            TokenType::NIL => Expr::Literal(LiteralValue::Nil),
            TokenType::NUMBER(n) => Expr::Literal(LiteralValue::Number(*n)),
            TokenType::STRING(s) => Expr::Literal(LiteralValue::Str(s.clone())),
            TokenType::IDENTIFIER => Expr::variable(token.clone()),
            TokenType::THIS => Expr::This {
                id: ExprId::fresh(),
                keyword: token.clone(),
            },

            TokenType::SUPER => {
                let keyword: Token = self.advance().clone();
                self.consume(TokenType::DOT, "Expect '.' after 'super'.")?;
                let method: Token =
                    self.consume(TokenType::IDENTIFIER, "Expect superclass method name.")?;

                return Ok(Expr::Super {
                    id: ExprId::fresh(),
                    keyword,
                    method,
                });
            }

            TokenType::LEFT_PAREN => {
                self.advance();
                let expr: Expr = self.expression()?;
                self.consume(TokenType::RIGHT_PAREN, "Expect ')' after expression.")?;

                return Ok(Expr::Grouping(Box::new(expr)));
            }

            _ => {
                return Err(self.error(ParseErrorKind::UnexpectedToken(
                    "Expect expression.".into(),
                )))
            }
        };

        self.advance();
        Ok(expr)
    }

    // ────────────────────── utility helpers ───────────────────────

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<Token> {
        if self.check(ttype) {
            return Ok(self.advance().clone());
        }

        Err(self.error(ParseErrorKind::UnexpectedToken(message.to_string())))
    }

    /// Builds an error located at the current token.
    fn error(&self, kind: ParseErrorKind) -> LoxError {
        LoxError::parse(self.peek(), kind)
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        tokens.get(self.current).unwrap_or(&MISSING_EOF)
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token {
        let tokens: &'a [Token] = self.tokens;
        tokens
            .get(self.current.wrapping_sub(1))
            .unwrap_or(&MISSING_EOF)
    }

    /// Discards tokens until it thinks it is at a statement boundary.
    fn synchronize(&mut self) {
        debug!("Synchronizing after parse error at line {}", self.peek().line);

        self.advance();

        while !self.is_at_end() {
            if matches!(self.previous().token_type, TokenType::SEMICOLON) {
                return;
            }

            match self.peek().token_type {
                TokenType::CLASS
                | TokenType::FUN
                | TokenType::VAR
                | TokenType::FOR
                | TokenType::IF
                | TokenType::WHILE
                | TokenType::PRINT
                | TokenType::RETURN => return,
                _ => {}
            }

            self.advance();
        }
    }
}

/// Parse a full program from `tokens`.
pub fn parse(tokens: &[Token]) -> (Vec<Stmt>, Vec<LoxError>) {
    Parser::new(tokens).parse()
}
