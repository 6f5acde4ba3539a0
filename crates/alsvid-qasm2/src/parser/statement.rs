//! Statement productions: register declarations, gate definitions and
//! global program statements.

use std::sync::Arc;

use tracing::debug;

use alsvid_ir::{
    BigInt, Bit, CNOT_GATE, Error, Expr, Gate, IDENTITY_GATE, Instruction, Operand, RegKind,
    Register, Result, U_GATE,
};

use crate::lexer::Token;
use crate::parser::{Parser, Unit};

impl Parser {
    /// `qreg name[size];` / `creg name[size];`
    pub(crate) fn parse_reg_declaration(&mut self, u: &mut Unit) -> Result<bool> {
        let kind = match u.peek() {
            Some(Token::QReg) => RegKind::Quantum,
            Some(Token::CReg) => RegKind::Classical,
            _ => return Ok(false),
        };
        u.advance();

        let (name, line) = u.expect_identifier("expect identifier after register keyword")?;
        self.check_undeclared(u, &name, line)?;
        u.expect(
            &Token::LBracket,
            format!("expect '[' after register name {name}"),
        )?;
        let (size_text, size_line) = u.expect_int(format!("expect a size for register {name}"))?;
        u.expect(
            &Token::RBracket,
            format!("expect ']' after the size of register {name}"),
        )?;
        u.expect(
            &Token::Semicolon,
            format!("expect ';' at the end of the declaration of register {name}"),
        )?;

        let size: usize = size_text
            .parse()
            .map_err(|_| u.err(size_line, format!("size of register {name} is out of range")))?;
        if size == 0 {
            return Err(u.err(size_line, format!("size of register {name} cannot be 0")));
        }

        match kind {
            RegKind::Classical => {
                let next = self.clbit_space.checked_add(size).ok_or_else(|| {
                    u.err(size_line, "total size of the classical bit space is out of range")
                })?;
                let reg = Arc::new(Register::new(kind, &name, size, self.clbit_space));
                self.clbit_space = next;
                self.cregs.insert(name.clone(), reg.clone());
                self.creg_order.push(reg);
            }
            RegKind::Quantum => {
                let next = self.qubit_space.checked_add(size).ok_or_else(|| {
                    u.err(size_line, "total size of the qubit space is out of range")
                })?;
                let reg = Arc::new(Register::new(kind, &name, size, self.qubit_space));
                self.qubit_space = next;
                self.qregs.insert(name.clone(), reg.clone());
                self.qreg_order.push(reg);
            }
        }
        debug!(name, size, ?kind, "declared register");
        Ok(true)
    }

    fn check_undeclared(&self, u: &Unit, name: &str, line: usize) -> Result<()> {
        if self.cregs.contains_key(name) {
            return Err(u.err(
                line,
                format!("{name} is already declared as a classical register"),
            ));
        }
        if self.qregs.contains_key(name) {
            return Err(u.err(
                line,
                format!("{name} is already declared as a quantum register"),
            ));
        }
        if self.gates.contains_key(name) {
            return Err(u.err(line, format!("{name} is already declared as a gate")));
        }
        Ok(())
    }

    /// `gate name(params) qubits { body }` / `opaque name(params) qubits;`
    ///
    /// A gate's formal names open a local scope: its body may only
    /// reference the formals, never global registers. An empty body (and
    /// every opaque gate) is filled with one identity call per formal
    /// qubit so that execution always reaches leaves.
    pub(crate) fn parse_gate_definition(&mut self, u: &mut Unit) -> Result<bool> {
        let opaque = match u.peek() {
            Some(Token::Gate) => false,
            Some(Token::Opaque) => true,
            _ => return Ok(false),
        };
        u.advance();

        let keyword = if opaque { "opaque" } else { "gate" };
        let (name, line) = u.expect_identifier(format!("expect identifier after '{keyword}'"))?;
        self.check_undeclared(u, &name, line)?;

        let params = Self::parse_formal_params(u, &name)?;
        let qubit_names = Self::parse_formal_qubit_names(u, &name, &params)?;

        let mut gate = Gate::new(name.clone(), params, qubit_names);
        if opaque {
            u.expect(
                &Token::Semicolon,
                format!("expect ';' at the end of opaque gate {name}"),
            )?;
        } else {
            u.expect(&Token::LBrace, format!("expect '{{' to open the body of gate {name}"))?;
            let mut body = Vec::new();
            while let Some(inst) = self.parse_gate_body_statement(u, &gate)? {
                body.push(inst);
            }
            u.expect(&Token::RBrace, format!("expect '}}' to close the body of gate {name}"))?;
            gate.body = body;
        }

        if gate.body.is_empty() {
            let identity = self.gates[IDENTITY_GATE].clone();
            gate.body = gate
                .qubit_names
                .iter()
                .enumerate()
                .map(|(slot, n)| Instruction::Call {
                    gate: identity.clone(),
                    params: vec![],
                    qubits: vec![Operand::Formal {
                        name: n.clone(),
                        slot,
                    }],
                })
                .collect();
        }

        debug!(
            name,
            nparams = gate.nparams(),
            nqubits = gate.nqubits(),
            opaque,
            "defined gate"
        );
        let gate = Arc::new(gate);
        self.gates.insert(name, gate.clone());
        self.gate_order.push(gate);
        Ok(true)
    }

    /// Optional `(p1, p2, ...)` formal parameter list. Empty parens are
    /// accepted, same as no parens at all.
    fn parse_formal_params(u: &mut Unit, gate: &str) -> Result<Vec<String>> {
        if !u.eat(&Token::LParen) {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = Vec::new();
        while let Some((id, line)) = u.eat_identifier() {
            if names.contains(&id) {
                return Err(u.err(
                    line,
                    format!("parameter {id} of gate {gate} is repeated"),
                ));
            }
            names.push(id);
            if !u.eat(&Token::Comma) {
                break;
            }
        }
        u.expect(
            &Token::RParen,
            format!("expect ')' after the parameter list of gate {gate}"),
        )?;
        Ok(names)
    }

    /// The formal qubit names of a gate signature. At least one is
    /// required, all must be unique and disjoint from the parameters.
    fn parse_formal_qubit_names(u: &mut Unit, gate: &str, params: &[String]) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        while let Some((id, line)) = u.eat_identifier() {
            if params.contains(&id) {
                return Err(u.err(
                    line,
                    format!("{id} is both a parameter and a qubit of gate {gate}"),
                ));
            }
            if names.contains(&id) {
                return Err(u.err(line, format!("qubit {id} of gate {gate} is repeated")));
            }
            names.push(id);
            if !u.eat(&Token::Comma) {
                break;
            }
        }
        if names.is_empty() {
            return Err(u.err_here(format!("expect at least one qubit for gate {gate}")));
        }
        Ok(names)
    }

    /// One statement inside a gate body: a barrier over formals or a
    /// nested gate call. `Ok(None)` means the closing brace is next.
    fn parse_gate_body_statement(
        &mut self,
        u: &mut Unit,
        scope: &Gate,
    ) -> Result<Option<Instruction>> {
        if matches!(u.peek(), Some(Token::Barrier)) {
            u.advance();
            let targets = Self::parse_formal_qubit_list(u, scope)?;
            if targets.is_empty() {
                return Err(u.err_here("expect one or more qubits after 'barrier'"));
            }
            u.expect(&Token::Semicolon, "expect ';' at the end of barrier statement")?;
            return Ok(Some(Instruction::Barrier { targets }));
        }

        let Some((gate, params, spelling, line)) = self.parse_call_prelude(u, Some(scope))? else {
            return Ok(None);
        };
        let qubits = Self::parse_formal_qubit_list(u, scope)?;
        if qubits.len() != gate.nqubits() {
            return Err(u.err(
                line,
                format!(
                    "gate {spelling} expects {} qubits, {} provided",
                    gate.nqubits(),
                    qubits.len()
                ),
            ));
        }
        u.expect(
            &Token::Semicolon,
            format!("expect ';' at the end of call to gate {spelling}"),
        )?;
        Ok(Some(Instruction::Call {
            gate,
            params,
            qubits,
        }))
    }

    /// Comma-separated formal qubit references inside a gate body.
    /// Returns empty without consuming if the next token is not a known
    /// formal. Repeats are rejected.
    fn parse_formal_qubit_list(u: &mut Unit, scope: &Gate) -> Result<Vec<Operand>> {
        let first = match u.peek() {
            Some(Token::Identifier(id)) if scope.qubit_index.contains_key(id) => id.clone(),
            _ => return Ok(Vec::new()),
        };
        u.advance();
        let mut slots = vec![scope.qubit_index[&first]];
        let mut ops = vec![Operand::Formal {
            name: first,
            slot: slots[0],
        }];
        while u.eat(&Token::Comma) {
            let (id, line) = u.expect_identifier("expect a qubit after ','")?;
            let slot = *scope
                .qubit_index
                .get(&id)
                .ok_or_else(|| u.err(line, format!("{id} is not a qubit of gate {}", scope.name)))?;
            if slots.contains(&slot) {
                return Err(u.err(line, format!("qubit argument {id} is repeated")));
            }
            slots.push(slot);
            ops.push(Operand::Formal { name: id, slot });
        }
        Ok(ops)
    }

    /// Gate name and parameter list of a call, shared between gate-body
    /// and global statements. `Ok(None)` means the next token cannot open
    /// a call.
    ///
    /// The builtin spelling rules live here: `CX` must not be followed by
    /// a parenthesis, while any other zero-parameter gate tolerates an
    /// empty `()`.
    fn parse_call_prelude(
        &self,
        u: &mut Unit,
        scope: Option<&Gate>,
    ) -> Result<Option<(Arc<Gate>, Vec<Arc<Expr>>, String, usize)>> {
        let (spelling, line) = match u.peek() {
            Some(Token::Identifier(id)) => (id.clone(), u.line()),
            Some(Token::GateU) => ("U".to_string(), u.line()),
            Some(Token::GateCX) => ("CX".to_string(), u.line()),
            _ => return Ok(None),
        };
        u.advance();

        let key = match spelling.as_str() {
            "U" => U_GATE,
            "CX" => CNOT_GATE,
            other => other,
        };
        let gate = self
            .gates
            .get(key)
            .cloned()
            .ok_or_else(|| u.err(line, format!("{spelling} is not a gate")))?;

        let mut params = Vec::new();
        if gate.nparams() == 0 {
            if spelling == "CX" {
                if matches!(u.peek(), Some(Token::LParen)) {
                    return Err(u.err_here("cannot use '(' when calling the CX gate"));
                }
            } else if u.eat(&Token::LParen) {
                u.expect(
                    &Token::RParen,
                    format!("expect ')' after '(' when calling gate {spelling}"),
                )?;
            }
        } else {
            u.expect(
                &Token::LParen,
                format!("expect '(' for the parameter list of gate {spelling}"),
            )?;
            let exprs = self.parse_expr_list(u, scope)?;
            if exprs.len() != gate.nparams() {
                return Err(u.err(
                    line,
                    format!(
                        "gate {spelling} expects {} parameters, {} provided",
                        gate.nparams(),
                        exprs.len()
                    ),
                ));
            }
            u.expect(
                &Token::RParen,
                format!("expect ')' after the parameter list of gate {spelling}"),
            )?;
            params = exprs.into_iter().map(Arc::new).collect();
        }
        Ok(Some((gate, params, spelling, line)))
    }

    /// One global program statement, optionally guarded by an `if`
    /// condition.
    pub(crate) fn parse_program_statement(&mut self, u: &mut Unit) -> Result<bool> {
        let guard = self.parse_if_prefix(u)?;
        let inst = self.parse_base_instruction(u)?;
        match (guard, inst) {
            (None, None) => Ok(false),
            (Some(_), None) => Err(u.err_here("expect a statement after 'if' condition")),
            (None, Some(inst)) => {
                self.program.instructions.push(inst);
                Ok(true)
            }
            (Some((creg, value)), Some(inst)) => {
                self.program.instructions.push(Instruction::If {
                    creg,
                    value,
                    body: Box::new(inst),
                });
                Ok(true)
            }
        }
    }

    /// `if (creg == n)` prefix. The literal keeps full precision; it is
    /// compared bit-for-bit against the register at execution time.
    fn parse_if_prefix(&self, u: &mut Unit) -> Result<Option<(Arc<Register>, BigInt)>> {
        if !u.eat(&Token::If) {
            return Ok(None);
        }
        u.expect(&Token::LParen, "expect '(' after 'if'")?;
        let (name, line) = u.expect_identifier("expect a classical register after 'if ('")?;
        let creg = self
            .cregs
            .get(&name)
            .cloned()
            .ok_or_else(|| u.err(line, format!("{name} is not a classical register")))?;
        u.expect(&Token::EqEq, format!("expect '==' after 'if ({name}'"))?;
        let (num, _) = u.expect_int(format!("expect an integer after 'if ({name} =='"))?;
        u.expect(&Token::RParen, "expect ')' at the end of 'if' condition")?;
        Ok(Some((creg, BigInt::from_decimal(&num))))
    }

    /// The instruction part of a global statement: measure, reset,
    /// barrier or a gate call over declared registers.
    fn parse_base_instruction(&mut self, u: &mut Unit) -> Result<Option<Instruction>> {
        match u.peek() {
            Some(Token::Measure) => {
                u.advance();
                let src = self
                    .parse_reg_operand(u, RegKind::Quantum)?
                    .ok_or_else(|| u.err_here("expect a qubit or register after 'measure'"))?;
                u.expect(&Token::Arrow, "expect '->' after the source of 'measure'")?;
                let dst = self.parse_reg_operand(u, RegKind::Classical)?.ok_or_else(|| {
                    u.err_here("expect a classical bit or register after '->'")
                })?;
                self.check_measure_shapes(u, &src, &dst)?;
                u.expect(&Token::Semicolon, "expect ';' at the end of measure statement")?;
                Ok(Some(Instruction::Measure { src, dst }))
            }
            Some(Token::Reset) => {
                u.advance();
                let target = self
                    .parse_reg_operand(u, RegKind::Quantum)?
                    .ok_or_else(|| u.err_here("expect a qubit or register after 'reset'"))?;
                u.expect(&Token::Semicolon, "expect ';' at the end of reset statement")?;
                Ok(Some(Instruction::Reset { target }))
            }
            Some(Token::Barrier) => {
                u.advance();
                let targets = self.parse_qubit_operand_list(u)?;
                if targets.is_empty() {
                    return Err(u.err_here("expect one or more qubits or registers after 'barrier'"));
                }
                u.expect(&Token::Semicolon, "expect ';' at the end of barrier statement")?;
                Ok(Some(Instruction::Barrier { targets }))
            }
            Some(Token::Identifier(_) | Token::GateU | Token::GateCX) => {
                let Some((gate, params, spelling, line)) = self.parse_call_prelude(u, None)? else {
                    return Ok(None);
                };
                let qubits = self.parse_qubit_operand_list(u)?;
                if qubits.len() != gate.nqubits() {
                    return Err(u.err(
                        line,
                        format!(
                            "gate {spelling} expects {} qubits, {} provided",
                            gate.nqubits(),
                            qubits.len()
                        ),
                    ));
                }
                u.expect(
                    &Token::Semicolon,
                    format!("expect ';' at the end of call to gate {spelling}"),
                )?;
                Ok(Some(Instruction::Call {
                    gate,
                    params,
                    qubits,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Measuring a whole register requires a destination register of the
    /// same size; measuring one qubit requires a single-bit destination.
    fn check_measure_shapes(&self, u: &Unit, src: &Operand, dst: &Operand) -> Result<()> {
        if src.size()? != dst.size()? {
            return Err(u.err_here(format!(
                "measure source {src} and destination {dst} differ in size"
            )));
        }
        Ok(())
    }

    /// A declared quantum register, optionally indexed. Returns `None`
    /// without consuming if the next token is not a known quantum
    /// register.
    fn parse_reg_operand(&self, u: &mut Unit, kind: RegKind) -> Result<Option<Operand>> {
        let table = match kind {
            RegKind::Quantum => &self.qregs,
            RegKind::Classical => &self.cregs,
        };
        let name = match u.peek() {
            Some(Token::Identifier(id)) if table.contains_key(id) => id.clone(),
            _ => return Ok(None),
        };
        u.advance();
        let reg = table[&name].clone();

        if !u.eat(&Token::LBracket) {
            return Ok(Some(Operand::Register(reg)));
        }
        let (idx_text, line) = u.expect_int(format!("expect an index into register {name}"))?;
        let index: usize = idx_text
            .parse()
            .map_err(|_| u.err(line, format!("index into register {name} is out of range")))?;
        if index >= reg.size {
            return Err(u.err(
                line,
                format!("index {index} is out of bounds for register {reg}"),
            ));
        }
        u.expect(
            &Token::RBracket,
            format!("expect ']' after the index into register {name}"),
        )?;
        Ok(Some(Operand::Bit(Bit::new(reg, index))))
    }

    /// Comma-separated qubit operands of a global barrier or call, with
    /// the full argument-list validation applied.
    fn parse_qubit_operand_list(&self, u: &mut Unit) -> Result<Vec<Operand>> {
        let list_line = u.line();
        let Some(first) = self.parse_reg_operand(u, RegKind::Quantum)? else {
            return Ok(Vec::new());
        };
        let mut ops = vec![first];
        while u.eat(&Token::Comma) {
            let op = self
                .parse_reg_operand(u, RegKind::Quantum)?
                .ok_or_else(|| u.err_here("expect a qubit or register after ','"))?;
            ops.push(op);
        }
        check_operand_list(u, list_line, &ops)?;
        Ok(ops)
    }
}

/// Shape rules for a list of concrete qubit operands:
/// all register operands have equal size (broadcast compatibility), no
/// register appears twice, no bit appears twice, and no bit belongs to a
/// register that is also listed whole.
fn check_operand_list(u: &Unit, line: usize, ops: &[Operand]) -> Result<()> {
    let mut regs: Vec<&Arc<Register>> = Vec::new();
    let mut bits: Vec<&Bit> = Vec::new();
    for op in ops {
        match op {
            Operand::Register(r) => regs.push(r),
            Operand::Bit(b) => bits.push(b),
            Operand::Formal { name, .. } => {
                return Err(Error::new(format!("formal argument {name} is not bound")));
            }
        }
    }

    if let Some(first) = regs.first() {
        for r in &regs[1..] {
            if r.size != first.size {
                return Err(u.err(
                    line,
                    format!(
                        "register arguments {first} and {r} must have the same size"
                    ),
                ));
            }
        }
    }
    for (i, a) in regs.iter().enumerate() {
        for b in &regs[i + 1..] {
            if a.offset == b.offset {
                return Err(u.err(line, format!("register argument {} is repeated", a.name)));
            }
        }
    }
    for (i, a) in bits.iter().enumerate() {
        for b in &bits[i + 1..] {
            if a.offset() == b.offset() {
                return Err(u.err(line, format!("qubit argument {a} is repeated")));
            }
        }
    }
    for b in &bits {
        for r in &regs {
            if b.register.name == r.name {
                return Err(u.err(
                    line,
                    format!("register argument {} overlaps with qubit argument {b}", r.name),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::parser::Parser;

    fn parse(source: &str) -> Parser {
        let mut p = Parser::new();
        p.parse_str("t.qasm", &format!("OPENQASM 2.0;\n{source}"))
            .unwrap();
        p
    }

    fn parse_err(source: &str) -> Error {
        let mut p = Parser::new();
        p.parse_str("t.qasm", &format!("OPENQASM 2.0;\n{source}"))
            .unwrap_err()
    }

    #[test]
    fn test_register_offsets_per_kind() {
        let p = parse("qreg q[3];\ncreg c[2];\nqreg r[2];\ncreg d[4];");
        assert_eq!(p.qreg("q").unwrap().offset, 0);
        assert_eq!(p.qreg("r").unwrap().offset, 3);
        assert_eq!(p.creg("c").unwrap().offset, 0);
        assert_eq!(p.creg("d").unwrap().offset, 2);
        assert_eq!(p.qubit_space(), 5);
        assert_eq!(p.clbit_space(), 6);
    }

    #[test]
    fn test_register_redeclaration() {
        let err = parse_err("qreg q[1];\ncreg q[1];");
        assert!(err.to_string().contains("already declared as a quantum register"));
        assert_eq!(err.line, Some(3));
    }

    #[test]
    fn test_register_size_zero() {
        let err = parse_err("qreg q[0];");
        assert!(err.to_string().contains("cannot be 0"));
    }

    #[test]
    fn test_name_collides_with_gate() {
        let err = parse_err("gate g a { }\nqreg g[1];");
        assert!(err.to_string().contains("already declared as a gate"));
    }

    #[test]
    fn test_gate_definition_with_params() {
        let p = parse("gate rz(theta) a { U(0, 0, theta) a; }");
        let g = p.gate("rz").unwrap();
        assert_eq!(g.nparams(), 1);
        assert_eq!(g.nqubits(), 1);
        assert_eq!(g.body.len(), 1);
    }

    #[test]
    fn test_empty_gate_body_fills_with_identity() {
        let p = parse("gate idle a, b { }");
        let g = p.gate("idle").unwrap();
        assert_eq!(g.body.len(), 2);
        for inst in &g.body {
            match inst {
                Instruction::Call { gate, qubits, .. } => {
                    assert_eq!(gate.name, IDENTITY_GATE);
                    assert_eq!(qubits.len(), 1);
                }
                other => panic!("unexpected instruction {other}"),
            }
        }
    }

    #[test]
    fn test_opaque_gate_behaves_like_empty_gate() {
        let p = parse("opaque magic(theta) a;");
        let g = p.gate("magic").unwrap();
        assert_eq!(g.nparams(), 1);
        assert_eq!(g.body.len(), 1);
    }

    #[test]
    fn test_gate_qubit_name_shadows_parameter() {
        let err = parse_err("gate g(a) a { }");
        assert!(err.to_string().contains("both a parameter and a qubit"));
    }

    #[test]
    fn test_gate_body_rejects_global_register() {
        let err = parse_err("qreg q[1];\ngate g a { U(0, 0, 0) q; }");
        assert!(err.to_string().contains("expects 1 qubits, 0 provided"));
    }

    #[test]
    fn test_gate_body_rejects_repeated_formal() {
        let err = parse_err("gate g a, b { CX a, a; }");
        assert!(err.to_string().contains("repeated"));
    }

    #[test]
    fn test_cx_rejects_parens() {
        let err = parse_err("qreg q[2];\nCX(0) q[0], q[1];");
        assert!(err.to_string().contains("cannot use '('"));
    }

    #[test]
    fn test_zero_param_gate_accepts_empty_parens() {
        let p = parse("qreg q[1];\ngate h a { U(pi, 0, pi) a; }\nh() q[0];");
        assert_eq!(p.program().instructions.len(), 1);
    }

    #[test]
    fn test_u_call_builds_instruction() {
        let p = parse("qreg q[1];\nU(0, 0, 3.14) q[0];");
        match &p.program().instructions[0] {
            Instruction::Call { gate, params, .. } => {
                assert_eq!(gate.source_name(), "U");
                assert_eq!(params.len(), 3);
            }
            other => panic!("unexpected instruction {other}"),
        }
    }

    #[test]
    fn test_call_arity_mismatch() {
        let err = parse_err("qreg q[1];\nU(0, 0) q[0];");
        assert!(err.to_string().contains("expects 3 parameters, 2 provided"));
    }

    #[test]
    fn test_call_to_undeclared_gate() {
        let err = parse_err("qreg q[1];\nh q[0];");
        assert!(err.to_string().contains("h is not a gate"));
    }

    #[test]
    fn test_measure_statement() {
        let p = parse("qreg q[2];\ncreg c[2];\nmeasure q -> c;\nmeasure q[0] -> c[1];");
        assert_eq!(p.program().instructions.len(), 2);
    }

    #[test]
    fn test_measure_size_mismatch() {
        let err = parse_err("qreg q[2];\ncreg c[3];\nmeasure q -> c;");
        assert!(err.to_string().contains("differ in size"));
    }

    #[test]
    fn test_measure_requires_quantum_source() {
        let err = parse_err("creg c[1];\nmeasure c -> c;");
        assert!(err.to_string().contains("after 'measure'"));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let err = parse_err("qreg q[2];\nreset q[2];");
        assert!(err.to_string().contains("out of bounds"));
    }

    #[test]
    fn test_if_statement() {
        let p = parse("qreg q[1];\ncreg c[2];\nif (c == 3) reset q[0];");
        match &p.program().instructions[0] {
            Instruction::If { creg, value, body } => {
                assert_eq!(creg.name, "c");
                assert!(value.get_bit(0) && value.get_bit(1));
                assert!(matches!(**body, Instruction::Reset { .. }));
            }
            other => panic!("unexpected instruction {other}"),
        }
    }

    #[test]
    fn test_if_requires_classical_register() {
        let err = parse_err("qreg q[1];\nif (q == 1) reset q[0];");
        assert!(err.to_string().contains("not a classical register"));
    }

    #[test]
    fn test_if_without_statement() {
        let err = parse_err("creg c[1];\nif (c == 1);");
        assert!(err.to_string().contains("expect a statement after 'if'"));
    }

    #[test]
    fn test_broadcast_requires_equal_sizes() {
        let err = parse_err("qreg q[2];\nqreg r[3];\nCX q, r;");
        assert!(err.to_string().contains("must have the same size"));
    }

    #[test]
    fn test_repeated_register_argument() {
        let err = parse_err("qreg q[2];\nCX q, q;");
        assert!(err.to_string().contains("register argument q is repeated"));
    }

    #[test]
    fn test_repeated_bit_argument() {
        let err = parse_err("qreg q[2];\nCX q[1], q[1];");
        assert!(err.to_string().contains("qubit argument q[1] is repeated"));
    }

    #[test]
    fn test_bit_overlapping_whole_register() {
        let err = parse_err("qreg q[2];\nqreg r[2];\nbarrier q, r[0], r;");
        assert!(err.to_string().contains("overlaps with qubit argument"));
    }

    #[test]
    fn test_barrier_over_registers() {
        let p = parse("qreg q[2];\nqreg r[2];\nbarrier q, r;");
        match &p.program().instructions[0] {
            Instruction::Barrier { targets } => assert_eq!(targets.len(), 2),
            other => panic!("unexpected instruction {other}"),
        }
    }

    proptest! {
        #[test]
        fn prop_register_offsets_are_prefix_sums(
            sizes in proptest::collection::vec(1usize..32, 1..8),
        ) {
            let mut source = String::from("OPENQASM 2.0;\n");
            for (i, size) in sizes.iter().enumerate() {
                source.push_str(&format!("qreg r{i}[{size}];\n"));
            }
            let mut p = Parser::new();
            p.parse_str("t.qasm", &source).unwrap();

            // Offsets are 0, s1, s1+s2, ...: each register starts where
            // the previous one ended, so no two registers overlap.
            let mut expected = 0;
            for (i, size) in sizes.iter().enumerate() {
                let reg = p.qreg(&format!("r{i}")).unwrap();
                prop_assert_eq!(reg.offset, expected);
                prop_assert_eq!(reg.size, *size);
                expected += size;
            }
            prop_assert_eq!(p.qubit_space(), expected);
        }
    }
}
