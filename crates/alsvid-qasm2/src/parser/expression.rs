//! Precedence-climbing parser for gate parameter expressions.

use alsvid_ir::{BinOp, Expr, Gate, Result, UnaryOp};

use crate::lexer::Token;
use crate::parser::{Parser, Unit};

/// Bound on expression tree depth, to keep recursion in check on
/// adversarial input.
const MAX_EXPR_DEPTH: usize = 128;

impl Parser {
    /// The comma-separated expressions of a call's parameter list. The
    /// closing parenthesis is left for the caller; an immediate `)` means
    /// an empty list.
    pub(crate) fn parse_expr_list(&self, u: &mut Unit, scope: Option<&Gate>) -> Result<Vec<Expr>> {
        if matches!(u.peek(), Some(Token::RParen)) {
            return Ok(Vec::new());
        }
        let mut exprs = vec![self.parse_expr(u, scope)?];
        while u.eat(&Token::Comma) {
            exprs.push(self.parse_expr(u, scope)?);
        }
        Ok(exprs)
    }

    pub(crate) fn parse_expr(&self, u: &mut Unit, scope: Option<&Gate>) -> Result<Expr> {
        self.parse_binary_expr(u, scope, 0, 0)
    }

    /// Left-associative precedence climbing: consume operators that bind
    /// at least as tightly as `min_prec`, parsing each right-hand side
    /// with the operator's precedence plus one.
    fn parse_binary_expr(
        &self,
        u: &mut Unit,
        scope: Option<&Gate>,
        min_prec: u32,
        depth: usize,
    ) -> Result<Expr> {
        let mut lhs = self.parse_unary_expr(u, scope, depth)?;
        while let Some(op) = peek_binary_op(u) {
            if op.precedence() < min_prec {
                break;
            }
            u.advance();
            let rhs = self.parse_binary_expr(u, scope, op.precedence() + 1, depth + 1)?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary_expr(&self, u: &mut Unit, scope: Option<&Gate>, depth: usize) -> Result<Expr> {
        if depth > MAX_EXPR_DEPTH {
            return Err(u.err_here(format!(
                "expression nesting exceeds the limit of {MAX_EXPR_DEPTH}"
            )));
        }
        let token = match u.peek() {
            Some(t) => t.clone(),
            None => return Err(u.err_here("expect an expression")),
        };
        match token {
            Token::Pi => {
                u.advance();
                Ok(Expr::constant("pi"))
            }
            Token::Real(text) | Token::Int(text) => {
                u.advance();
                Ok(Expr::constant(text))
            }
            Token::Identifier(name) => {
                let line = u.line();
                u.advance();
                let slot = scope
                    .and_then(|g| g.param_index.get(&name).copied())
                    .ok_or_else(|| u.err(line, format!("unknown parameter {name}")))?;
                Ok(Expr::Param { name, slot })
            }
            Token::Plus => {
                u.advance();
                self.parse_unary_expr(u, scope, depth + 1)
            }
            Token::Minus => {
                u.advance();
                let inner = self.parse_unary_expr(u, scope, depth + 1)?;
                Ok(Expr::unary(UnaryOp::Neg, inner))
            }
            Token::LParen => {
                u.advance();
                let inner = self.parse_binary_expr(u, scope, 0, depth + 1)?;
                u.expect(&Token::RParen, "missing ')' in expression")?;
                Ok(inner)
            }
            Token::Sin | Token::Cos | Token::Tan | Token::Exp | Token::Ln | Token::Sqrt => {
                let op = match token {
                    Token::Sin => UnaryOp::Sin,
                    Token::Cos => UnaryOp::Cos,
                    Token::Tan => UnaryOp::Tan,
                    Token::Exp => UnaryOp::Exp,
                    Token::Ln => UnaryOp::Ln,
                    _ => UnaryOp::Sqrt,
                };
                u.advance();
                u.expect(&Token::LParen, format!("expect '(' after {token}"))?;
                let inner = self.parse_binary_expr(u, scope, 0, depth + 1)?;
                u.expect(&Token::RParen, format!("missing ')' after argument of {token}"))?;
                Ok(Expr::unary(op, inner))
            }
            _ => Err(u.err_here("expect an expression")),
        }
    }
}

fn peek_binary_op(u: &Unit) -> Option<BinOp> {
    match u.peek() {
        Some(Token::Plus) => Some(BinOp::Add),
        Some(Token::Minus) => Some(BinOp::Sub),
        Some(Token::Star) => Some(BinOp::Mul),
        Some(Token::Slash) => Some(BinOp::Div),
        Some(Token::Caret) => Some(BinOp::Pow),
        _ => None,
    }
}
