//! A tree‑walking interpreter for the Lox scripting language.
//!
//! The pipeline is `scan → parse → resolve → interpret`:
//!
//! ```rust
//! use rox::{parse, resolve, scan, Interpreter};
//!
//! let (tokens, scan_errors) = scan("print 1 + 2;");
//! let (program, parse_errors) = parse(&tokens);
//! assert!(scan_errors.is_empty() && parse_errors.is_empty());
//!
//! let mut interpreter = Interpreter::new();
//! assert!(resolve(&program, &mut interpreter).is_empty());
//! interpreter.interpret(&program).unwrap();
//! ```

pub mod ast;
pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stack;
pub mod token;
pub mod value;

pub use error::{LoxError, Result};
pub use interpreter::Interpreter;
pub use parser::parse;
pub use resolver::resolve;
pub use scanner::scan;

/// Runs `source` through the whole pipeline on `interpreter`.
///
/// Static errors from scanning, parsing and resolving are all reported
/// together and nothing is executed; otherwise the single runtime error, if
/// any, is returned.  Global state from earlier successful runs is kept.
pub fn run(source: &str, interpreter: &mut Interpreter) -> std::result::Result<(), Vec<LoxError>> {
    let (tokens, mut errors) = scan(source);
    let (statements, parse_errors) = parse(&tokens);
    errors.extend(parse_errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    let resolve_errors = resolve(&statements, interpreter);
    if !resolve_errors.is_empty() {
        return Err(resolve_errors);
    }

    interpreter.interpret(&statements).map_err(|e| vec![e])
}
