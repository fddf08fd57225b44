use crate::ast::{Expr, LiteralValue};
use crate::value::format_number;

/// Converts an expression to its parenthesized prefix form, e.g.
/// `1 + 2 * 3` → `(+ 1 (* 2 3))`.
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            // ── literals ────────────────────────────────────────────────
            Expr::Literal(lit) => match lit {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                LiteralValue::Number(n) => format_number(*n),
            },

            Expr::Grouping(inner) => Self::parenthesize("group", &[&**inner]),

            Expr::Unary { operator, right } => Self::parenthesize(&operator.lexeme, &[&**right]),

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => Self::parenthesize(&operator.lexeme, &[&**left, &**right]),

            // ── names ───────────────────────────────────────────────────
            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::This { .. } => "this".into(),

            Expr::Super { method, .. } => format!("(super {})", method.lexeme),

            // ── calls / properties ──────────────────────────────────────
            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));
                for arg in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(arg));
                }
                s.push(')');
                s
            }

            Expr::Get { object, name } => format!("(. {} {})", Self::print(object), name.lexeme),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(=. {} {} {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),
        }
    }

    fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
        let mut s = format!("({}", name);
        for e in exprs {
            s.push(' ');
            s.push_str(&Self::print(e));
        }
        s.push(')');
        s
    }
}
