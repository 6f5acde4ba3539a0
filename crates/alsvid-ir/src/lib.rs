//! Data, expression and instruction model for the Alsvid `OpenQASM` 2.0
//! interpreter.
//!
//! This crate holds everything the front end builds and the interpreter
//! walks: registers and bits over two flat address spaces, the evaluable
//! expression tree, the five instruction kinds, gates with their
//! call-binding protocol, and the arbitrary-width integers used for
//! classical-register guards.
//!
//! Gate "execution" binds arguments and walks the instruction tree; it
//! performs no quantum state transformation. See `alsvid-qasm2` for the
//! parser that produces these types.
//!
//! # Example
//!
//! ```rust
//! use alsvid_ir::{CallStack, Expr, BinOp};
//!
//! let e = Expr::binary(BinOp::Mul, Expr::constant("2"), Expr::constant("pi"));
//! let v = e.evaluate(&CallStack::default()).unwrap();
//! assert!((v - std::f64::consts::TAU).abs() < 1e-12);
//! ```

mod bigint;
mod data;
mod error;
mod expr;
mod gate;
mod instruction;
mod program;

pub use bigint::BigInt;
pub use data::{Bit, Operand, RegKind, Register};
pub use error::{Error, Result};
pub use expr::{BinOp, Expr, UnaryOp};
pub use gate::{CNOT_GATE, Gate, IDENTITY_GATE, U_GATE};
pub use instruction::Instruction;
pub use program::{
    CallStack, ClassicalState, DEFAULT_MAX_CALL_DEPTH, ExecState, Frame, Program,
};
