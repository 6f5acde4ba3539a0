//! `OpenQASM` 2.0 front end: lexer, parser and source emitter.
//!
//! The parser performs semantic analysis while parsing: registers, gates
//! and operands are resolved against the symbol tables as statements are
//! recognized, so a successfully parsed program is also a checked one.
//! Parsing is fail-fast and every error carries the file name and line.
//!
//! # Example
//!
//! ```rust
//! use alsvid_qasm2::Parser;
//!
//! let mut parser = Parser::new();
//! parser
//!     .parse_str(
//!         "bell.qasm",
//!         "OPENQASM 2.0;\n\
//!          qreg q[2];\n\
//!          creg c[2];\n\
//!          CX q[0], q[1];\n\
//!          measure q -> c;\n",
//!     )
//!     .unwrap();
//! assert_eq!(parser.program().instructions.len(), 2);
//! parser.run().unwrap();
//! ```

mod emitter;
pub mod lexer;
mod parser;

pub use parser::{Header, Parser};
