//! CLI command implementations.

pub mod check;
pub mod emit;
pub mod run;

use anyhow::Result;
use alsvid_qasm2::Parser;

/// Parse one source file into a fresh parser.
pub(crate) fn load(input: &str) -> Result<Parser> {
    let mut parser = Parser::new();
    parser.parse(input)?;
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_parses_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prog.qasm");
        std::fs::write(&path, "OPENQASM 2.0;\nqreg q[2];\nCX q[0], q[1];\n").unwrap();

        let parser = load(path.to_str().unwrap()).unwrap();
        assert_eq!(parser.qubit_space(), 2);
        assert_eq!(parser.program().instructions.len(), 1);
    }

    #[test]
    fn test_load_surfaces_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.qasm");
        std::fs::write(&path, "OPENQASM 2.0;\nqreg q[0];\n").unwrap();

        let err = load(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("cannot be 0"));
    }
}
