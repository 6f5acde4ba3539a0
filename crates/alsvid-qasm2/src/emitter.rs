//! Serialization of the parsed model back to `OpenQASM` 2.0 source.
//!
//! The output is normalized rather than verbatim: one statement per
//! line, declarations first (classical registers, then quantum, then
//! gates, each in declaration order), then the global program. Emitted
//! text parses back to an equivalent model.

use std::fmt::Write;

use alsvid_ir::Gate;

use crate::parser::Parser;

pub(crate) fn emit(parser: &Parser) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "OPENQASM 2.0;");
    for reg in &parser.creg_order {
        let _ = writeln!(out, "creg {reg};");
    }
    for reg in &parser.qreg_order {
        let _ = writeln!(out, "qreg {reg};");
    }
    for gate in &parser.gate_order {
        emit_gate(&mut out, gate);
    }
    for inst in &parser.program.instructions {
        let _ = writeln!(out, "{inst}");
    }
    out
}

fn emit_gate(out: &mut String, gate: &Gate) {
    let _ = write!(out, "gate {}", gate.name);
    if gate.nparams() > 0 {
        let _ = write!(out, "({})", gate.param_names.join(", "));
    }
    let _ = writeln!(out, " {} {{", gate.qubit_names.join(", "));
    for inst in &gate.body {
        let _ = writeln!(out, "  {inst}");
    }
    let _ = writeln!(out, "}}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Parser {
        let mut p = Parser::new();
        p.parse_str("t.qasm", source).unwrap();
        p
    }

    #[test]
    fn test_emits_declarations_before_program() {
        let p = parse("OPENQASM 2.0;\nqreg q[2];\ncreg c[2];\nmeasure q -> c;");
        let text = p.to_text();
        assert_eq!(
            text,
            "OPENQASM 2.0;\ncreg c[2];\nqreg q[2];\nmeasure q -> c;\n"
        );
    }

    #[test]
    fn test_emits_gate_definition() {
        let p = parse("OPENQASM 2.0;\ngate rz(theta) a { U(0, 0, theta) a; }");
        let text = p.to_text();
        assert!(text.contains("gate rz(theta) a {\n  U(0, 0, theta) a;\n}"));
    }

    #[test]
    fn test_builtin_gates_are_not_emitted() {
        let p = parse("OPENQASM 2.0;\nqreg q[1];\nU(0, 0, 0) q[0];");
        let text = p.to_text();
        assert!(!text.contains("gate __"));
        assert!(text.contains("U(0, 0, 0) q[0];"));
    }

    #[test]
    fn test_zero_param_gate_emits_without_parens() {
        let p = parse("OPENQASM 2.0;\ngate h() a { U(pi, 0, pi) a; }");
        let text = p.to_text();
        assert!(text.contains("gate h a {"));
    }

    #[test]
    fn test_output_reparses() {
        let source = "OPENQASM 2.0;\n\
                      qreg q[2];\n\
                      creg c[2];\n\
                      gate rz(theta) a { U(0, 0, theta) a; }\n\
                      gate idle a { }\n\
                      rz(pi / 2) q[0];\n\
                      CX q[0], q[1];\n\
                      barrier q;\n\
                      measure q -> c;\n\
                      if (c == 3) reset q[0];\n";
        let first = parse(source);
        let text = first.to_text();

        let mut second = Parser::new();
        second.parse_str("emitted.qasm", &text).unwrap();
        assert_eq!(second.to_text(), text);
    }
}
