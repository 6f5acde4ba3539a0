//! Recursive-descent parser with embedded semantic analysis.
//!
//! The grammar driver is an ordered choice over statement productions.
//! Every production follows one contract: if its distinguishing leading
//! token(s) do not match it consumes nothing and reports "no match"
//! (`Ok(false)` / `Ok(None)`), letting the caller try the next
//! alternative; once the leading tokens are recognized, every subsequent
//! requirement is mandatory and a mismatch is a hard parse error. Parsing
//! is fail-fast: the first error aborts the whole `parse` call.

mod expression;
mod statement;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use alsvid_ir::{Error, ExecState, Gate, Program, Register, Result};

use crate::lexer::{SpannedToken, Token, tokenize};

/// Bound on `include` nesting.
const MAX_INCLUDE_DEPTH: usize = 16;

/// Version header of one parsed source unit.
#[derive(Debug, Clone)]
pub struct Header {
    pub file: String,
    pub major: u64,
    pub minor: u64,
}

/// One source unit being parsed: its tokens and a cursor.
pub(crate) struct Unit {
    file: String,
    tokens: Vec<SpannedToken>,
    pos: usize,
    depth: usize,
}

impl Unit {
    fn new(file: &str, source: &str, depth: usize) -> Result<Self> {
        let mut tokens = Vec::new();
        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((line, msg)) => return Err(Error::at_line(file, line, msg)),
            }
        }
        Ok(Self {
            file: file.to_string(),
            tokens,
            pos: 0,
            depth,
        })
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos)?.token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Line of the token at the cursor, or of the last token at EOF.
    pub(crate) fn line(&self) -> usize {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or(0, |t| t.line)
    }

    /// Consume the next token if it has the same kind as `expected`.
    pub(crate) fn eat(&mut self, expected: &Token) -> bool {
        let matches = self
            .peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(expected));
        if matches {
            self.pos += 1;
        }
        matches
    }

    /// Require a token of the given kind; hard error otherwise.
    pub(crate) fn expect(&mut self, expected: &Token, msg: impl Into<String>) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.err_here(msg))
        }
    }

    /// Consume an identifier if one is next.
    pub(crate) fn eat_identifier(&mut self) -> Option<(String, usize)> {
        match self.peek() {
            Some(Token::Identifier(id)) => {
                let id = id.clone();
                let line = self.line();
                self.pos += 1;
                Some((id, line))
            }
            _ => None,
        }
    }

    /// Require an identifier; hard error otherwise.
    pub(crate) fn expect_identifier(&mut self, msg: impl Into<String>) -> Result<(String, usize)> {
        self.eat_identifier().ok_or_else(|| self.err_here(msg))
    }

    /// Require an integer literal, returned as its source text.
    pub(crate) fn expect_int(&mut self, msg: impl Into<String>) -> Result<(String, usize)> {
        match self.peek() {
            Some(Token::Int(text)) => {
                let text = text.clone();
                let line = self.line();
                self.pos += 1;
                Ok((text, line))
            }
            _ => Err(self.err_here(msg)),
        }
    }

    pub(crate) fn err(&self, line: usize, msg: impl Into<String>) -> Error {
        Error::at_line(&self.file, line, msg)
    }

    pub(crate) fn err_here(&self, msg: impl Into<String>) -> Error {
        self.err(self.line(), msg)
    }
}

/// The parser: token cursor management, symbol tables and the global
/// program.
///
/// Classical registers, quantum registers and gates share one flat
/// namespace check (a name declared as any of the three cannot be
/// redeclared) but live in separate tables. The three builtin gates are
/// registered before any source is parsed.
#[derive(Debug)]
pub struct Parser {
    pub(crate) cregs: FxHashMap<String, Arc<Register>>,
    pub(crate) qregs: FxHashMap<String, Arc<Register>>,
    pub(crate) gates: FxHashMap<String, Arc<Gate>>,
    /// Declaration order, for deterministic serialization.
    pub(crate) creg_order: Vec<Arc<Register>>,
    pub(crate) qreg_order: Vec<Arc<Register>>,
    pub(crate) gate_order: Vec<Arc<Gate>>,
    /// Running offset counters, one per register kind.
    pub(crate) clbit_space: usize,
    pub(crate) qubit_space: usize,
    pub(crate) program: Program,
    pub(crate) headers: Vec<Header>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        let mut gates = FxHashMap::default();
        for g in Gate::builtins() {
            gates.insert(g.name.clone(), g);
        }
        Self {
            cregs: FxHashMap::default(),
            qregs: FxHashMap::default(),
            gates,
            creg_order: Vec::new(),
            qreg_order: Vec::new(),
            gate_order: Vec::new(),
            clbit_space: 0,
            qubit_space: 0,
            program: Program::default(),
            headers: Vec::new(),
        }
    }

    /// Parse one source file, following `include`s, into the shared
    /// symbol tables and global program.
    pub fn parse(&mut self, path: &str) -> Result<()> {
        self.parse_file(path, 0)
    }

    /// Parse an in-memory source unit. `name` is used in error messages.
    pub fn parse_str(&mut self, name: &str, source: &str) -> Result<()> {
        self.parse_source(name, source, 0)
    }

    pub(crate) fn parse_file(&mut self, path: &str, depth: usize) -> Result<()> {
        if depth > MAX_INCLUDE_DEPTH {
            return Err(Error::in_file(
                path,
                format!("include nesting exceeds the limit of {MAX_INCLUDE_DEPTH}"),
            ));
        }
        let source = std::fs::read_to_string(path)
            .map_err(|e| Error::in_file(path, format!("cannot read source file: {e}")))?;
        self.parse_source(path, &source, depth)
    }

    fn parse_source(&mut self, file: &str, source: &str, depth: usize) -> Result<()> {
        let mut unit = Unit::new(file, source, depth)?;
        if unit.is_eof() {
            return Ok(());
        }
        self.parse_header(&mut unit)?;
        while !unit.is_eof() {
            self.parse_unit(&mut unit)?;
        }
        debug!(file, "parsed source unit");
        Ok(())
    }

    /// `OPENQASM <major>.<minor>;` must open every non-empty unit.
    fn parse_header(&mut self, u: &mut Unit) -> Result<()> {
        if !u.eat(&Token::OpenQasm) {
            return Err(u.err_here("missing header"));
        }
        let version = match u.peek() {
            Some(Token::Real(v)) => v.clone(),
            _ => return Err(u.err_here("expect a version number after OPENQASM")),
        };
        let line = u.line();
        u.advance();
        u.expect(&Token::Semicolon, "expect ';' at the end of the header")?;

        let (major_str, minor_str) = version
            .split_once('.')
            .ok_or_else(|| u.err(line, format!("malformed version {version}")))?;
        let major: u64 = major_str
            .parse()
            .map_err(|_| u.err(line, "major version in the header out of range"))?;
        let minor: u64 = minor_str
            .parse()
            .map_err(|_| u.err(line, "minor version in the header out of range"))?;
        self.headers.push(Header {
            file: u.file.clone(),
            major,
            minor,
        });
        Ok(())
    }

    /// Ordered choice over the statement productions.
    fn parse_unit(&mut self, u: &mut Unit) -> Result<()> {
        if self.parse_include(u)? {
            return Ok(());
        }
        if self.parse_reg_declaration(u)? {
            return Ok(());
        }
        if self.parse_gate_definition(u)? {
            return Ok(());
        }
        if self.parse_program_statement(u)? {
            return Ok(());
        }
        Err(u.err_here("unknown statement"))
    }

    /// Parse an `include "file";` statement, pulling the included unit
    /// into the same symbol tables and program.
    fn parse_include(&mut self, u: &mut Unit) -> Result<bool> {
        if !matches!(u.peek(), Some(Token::Include)) {
            return Ok(false);
        }
        u.advance();
        let path = match u.peek() {
            Some(Token::Filename(path)) => path.clone(),
            _ => return Err(u.err_here("expect a file name after 'include'")),
        };
        u.advance();
        u.expect(&Token::Semicolon, "expect ';' at the end of include statement")?;
        self.parse_file(&path, u.depth + 1)?;
        Ok(true)
    }

    // --- symbol table lookups ------------------------------------------

    pub fn creg(&self, name: &str) -> Option<&Arc<Register>> {
        self.cregs.get(name)
    }

    pub fn qreg(&self, name: &str) -> Option<&Arc<Register>> {
        self.qregs.get(name)
    }

    pub fn gate(&self, name: &str) -> Option<&Arc<Gate>> {
        self.gates.get(name)
    }

    /// Gates defined by the parsed sources, in declaration order. The
    /// builtins are not included.
    pub fn declared_gates(&self) -> &[Arc<Gate>] {
        &self.gate_order
    }

    /// Total declared classical bits.
    pub fn clbit_space(&self) -> usize {
        self.clbit_space
    }

    /// Total declared qubits.
    pub fn qubit_space(&self) -> usize {
        self.qubit_space
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Serialize registers, gates and the program body back to source
    /// text.
    pub fn to_text(&self) -> String {
        crate::emitter::emit(self)
    }

    /// Execute the global program.
    pub fn run(&self) -> Result<()> {
        let mut exec = ExecState::new(self.clbit_space);
        self.program.run(&mut exec)
    }
}
