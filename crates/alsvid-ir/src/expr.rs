//! The evaluable numeric expression tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::program::CallStack;

/// Prefix operators and named unary functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
}

impl UnaryOp {
    /// The source spelling of a named unary function, if `s` is one.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "sin" => Some(UnaryOp::Sin),
            "cos" => Some(UnaryOp::Cos),
            "tan" => Some(UnaryOp::Tan),
            "exp" => Some(UnaryOp::Exp),
            "ln" => Some(UnaryOp::Ln),
            "sqrt" => Some(UnaryOp::Sqrt),
            _ => None,
        }
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            UnaryOp::Neg => -v,
            UnaryOp::Sin => v.sin(),
            UnaryOp::Cos => v.cos(),
            UnaryOp::Tan => v.tan(),
            UnaryOp::Exp => v.exp(),
            UnaryOp::Ln => v.ln(),
            UnaryOp::Sqrt => v.sqrt(),
        }
    }
}

/// Infix binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    /// Map an operator token to its tag.
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(BinOp::Add),
            "-" => Some(BinOp::Sub),
            "*" => Some(BinOp::Mul),
            "/" => Some(BinOp::Div),
            "^" => Some(BinOp::Pow),
            _ => None,
        }
    }

    /// Source spelling.
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "^",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u32 {
        match self {
            BinOp::Add | BinOp::Sub => 100,
            BinOp::Mul | BinOp::Div => 200,
            BinOp::Pow => 400,
        }
    }

    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            // IEEE-754 semantics: division by zero yields inf/NaN.
            BinOp::Div => lhs / rhs,
            BinOp::Pow => lhs.powf(rhs),
        }
    }
}

/// An evaluable numeric expression.
///
/// `Param` is the expression counterpart of a formal qubit argument: a
/// named slot of the enclosing gate, only evaluable while a call to that
/// gate is active. Trees are built strictly bottom-up during parsing and
/// are never cyclic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A literal: the symbolic constant `pi` or a decimal number, kept as
    /// source text and parsed at evaluation time.
    Constant(String),
    /// A formal parameter of the enclosing gate.
    Param { name: String, slot: usize },
    /// A unary operation.
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// A binary operation.
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(text: impl Into<String>) -> Self {
        Expr::Constant(text.into())
    }

    pub fn unary(op: UnaryOp, expr: Expr) -> Self {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate against the current call stack.
    ///
    /// Parameters resolve through the topmost frame; the expression bound
    /// there was written by the caller, so it is in turn evaluated one
    /// frame down. Evaluating a parameter with no active frame is an
    /// error.
    pub fn evaluate(&self, stack: &CallStack) -> Result<f64> {
        self.evaluate_at(stack, stack.len())
    }

    /// Evaluate as if only the first `depth` frames of `stack` existed.
    pub(crate) fn evaluate_at(&self, stack: &CallStack, depth: usize) -> Result<f64> {
        match self {
            Expr::Constant(text) => {
                if text == "pi" {
                    return Ok(std::f64::consts::PI);
                }
                let v: f64 = text
                    .parse()
                    .map_err(|_| bad_literal(text))?;
                if !v.is_finite() {
                    return Err(bad_literal(text));
                }
                Ok(v)
            }
            Expr::Param { name, slot } => {
                if depth == 0 {
                    return Err(Error::new(format!("parameter {name} is not bound")));
                }
                let frame = stack.frame(depth - 1);
                let bound = frame.params.get(*slot).ok_or_else(|| {
                    Error::new(format!("parameter {name} is not bound"))
                })?;
                bound.evaluate_at(stack, depth - 1)
            }
            Expr::Unary { op, expr } => Ok(op.apply(expr.evaluate_at(stack, depth)?)),
            Expr::Binary { op, lhs, rhs } => Ok(op.apply(
                lhs.evaluate_at(stack, depth)?,
                rhs.evaluate_at(stack, depth)?,
            )),
        }
    }
}

fn bad_literal(text: &str) -> Error {
    Error::new(format!("cannot evaluate {text} as a floating point number"))
}

/// Serialized text must re-parse with the same grouping, so binary
/// sub-expressions are always parenthesized.
fn fmt_operand(f: &mut fmt::Formatter<'_>, e: &Expr) -> fmt::Result {
    if matches!(e, Expr::Binary { .. }) {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(text) => write!(f, "{text}"),
            Expr::Param { name, .. } => write!(f, "{name}"),
            Expr::Unary { op, expr } => match op {
                UnaryOp::Neg => {
                    write!(f, "-")?;
                    fmt_operand(f, expr)
                }
                UnaryOp::Sin => write!(f, "sin({expr})"),
                UnaryOp::Cos => write!(f, "cos({expr})"),
                UnaryOp::Tan => write!(f, "tan({expr})"),
                UnaryOp::Exp => write!(f, "exp({expr})"),
                UnaryOp::Ln => write!(f, "ln({expr})"),
                UnaryOp::Sqrt => write!(f, "sqrt({expr})"),
            },
            Expr::Binary { op, lhs, rhs } => {
                fmt_operand(f, lhs)?;
                write!(f, " {} ", op.symbol())?;
                fmt_operand(f, rhs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_pi_literal() {
        let e = Expr::constant("pi");
        assert!((e.evaluate(&CallStack::default()).unwrap() - PI).abs() < 1e-15);
    }

    #[test]
    fn test_decimal_literal() {
        let e = Expr::constant("2.5");
        assert_eq!(e.evaluate(&CallStack::default()).unwrap(), 2.5);
    }

    #[test]
    fn test_out_of_range_literal() {
        let e = Expr::constant("1e999");
        assert!(e.evaluate(&CallStack::default()).is_err());
    }

    #[test]
    fn test_unary_dispatch() {
        let stack = CallStack::default();
        let neg = Expr::unary(UnaryOp::Neg, Expr::constant("3"));
        assert_eq!(neg.evaluate(&stack).unwrap(), -3.0);
        let cos = Expr::unary(UnaryOp::Cos, Expr::constant("0"));
        assert_eq!(cos.evaluate(&stack).unwrap(), 1.0);
    }

    #[test]
    fn test_binary_dispatch() {
        let stack = CallStack::default();
        let raise = Expr::binary(BinOp::Pow, Expr::constant("2"), Expr::constant("10"));
        assert_eq!(raise.evaluate(&stack).unwrap(), 1024.0);
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        let stack = CallStack::default();
        let div = Expr::binary(BinOp::Div, Expr::constant("1"), Expr::constant("0"));
        assert!(div.evaluate(&stack).unwrap().is_infinite());
    }

    #[test]
    fn test_unbound_parameter_errors() {
        let e = Expr::Param {
            name: "theta".into(),
            slot: 0,
        };
        assert!(e.evaluate(&CallStack::default()).is_err());
    }

    #[test]
    fn test_precedence_table() {
        assert_eq!(BinOp::Add.precedence(), 100);
        assert_eq!(BinOp::Sub.precedence(), 100);
        assert_eq!(BinOp::Mul.precedence(), 200);
        assert_eq!(BinOp::Div.precedence(), 200);
        assert_eq!(BinOp::Pow.precedence(), 400);
    }

    #[test]
    fn test_display_round_trip_shape() {
        let e = Expr::binary(
            BinOp::Add,
            Expr::unary(UnaryOp::Neg, Expr::constant("1")),
            Expr::unary(UnaryOp::Sin, Expr::constant("pi")),
        );
        assert_eq!(e.to_string(), "-1 + sin(pi)");
    }

    #[test]
    fn test_display_parenthesizes_nested_binary() {
        let e = Expr::binary(
            BinOp::Mul,
            Expr::binary(BinOp::Add, Expr::constant("1"), Expr::constant("2")),
            Expr::constant("3"),
        );
        assert_eq!(e.to_string(), "(1 + 2) * 3");

        let neg = Expr::unary(
            UnaryOp::Neg,
            Expr::binary(BinOp::Add, Expr::constant("1"), Expr::constant("2")),
        );
        assert_eq!(neg.to_string(), "-(1 + 2)");
    }
}
