//! The five executable statement kinds.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::bigint::BigInt;
use crate::data::{Operand, Register};
use crate::error::Result;
use crate::expr::Expr;
use crate::gate::Gate;
use crate::program::ExecState;

/// An executable statement of a program or gate body.
#[derive(Debug, Clone)]
pub enum Instruction {
    /// An informational fence over a set of targets; no effect here.
    Barrier { targets: Vec<Operand> },
    /// Measure a quantum source into a classical destination.
    Measure { src: Operand, dst: Operand },
    /// Reset a quantum target.
    Reset { target: Operand },
    /// Invoke a gate with actual parameter expressions and qubit operands.
    Call {
        gate: Arc<Gate>,
        params: Vec<Arc<Expr>>,
        qubits: Vec<Operand>,
    },
    /// Run the wrapped instruction only if a classical register's bit
    /// pattern equals the literal.
    If {
        creg: Arc<Register>,
        value: BigInt,
        body: Box<Instruction>,
    },
}

impl Instruction {
    /// Execute against the given context.
    ///
    /// Barrier, measure and reset record intent only; their state effects
    /// belong to a downstream simulator. Calls bind arguments and walk
    /// the gate body. Conditionals compare the guard register's live bits
    /// against the literal before running the wrapped instruction.
    pub fn execute(&self, exec: &mut ExecState) -> Result<()> {
        match self {
            Instruction::Barrier { targets } => {
                trace!(n = targets.len(), "barrier");
                Ok(())
            }
            Instruction::Measure { src, dst } => {
                trace!(src = %src, dst = %dst, "measure");
                Ok(())
            }
            Instruction::Reset { target } => {
                trace!(target = %target, "reset");
                Ok(())
            }
            Instruction::Call {
                gate,
                params,
                qubits,
            } => gate.execute(exec, params, qubits),
            Instruction::If { creg, value, body } => {
                if guard_holds(exec, creg, value) {
                    body.execute(exec)
                } else {
                    trace!(creg = %creg.name, value = %value, "guard not satisfied");
                    Ok(())
                }
            }
        }
    }
}

/// Bit-for-bit equality of the register's live value and the literal.
/// Literal bits past the register width must all be zero.
fn guard_holds(exec: &ExecState, creg: &Register, value: &BigInt) -> bool {
    if value.bit_len() > creg.size {
        return false;
    }
    (0..creg.size).all(|i| exec.classical.get(creg.offset + i) == value.get_bit(i))
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Barrier { targets } => {
                write!(f, "barrier ")?;
                for (i, t) in targets.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ";")
            }
            Instruction::Measure { src, dst } => write!(f, "measure {src} -> {dst};"),
            Instruction::Reset { target } => write!(f, "reset {target};"),
            Instruction::Call {
                gate,
                params,
                qubits,
            } => {
                write!(f, "{}", gate.source_name())?;
                if !params.is_empty() {
                    write!(f, "(")?;
                    for (i, p) in params.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{p}")?;
                    }
                    write!(f, ")")?;
                }
                write!(f, " ")?;
                for (i, q) in qubits.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{q}")?;
                }
                write!(f, ";")
            }
            Instruction::If { creg, value, body } => {
                write!(f, "if ({} == {value}) {body}", creg.name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bit, RegKind};

    fn creg(name: &str, size: usize, offset: usize) -> Arc<Register> {
        Arc::new(Register::new(RegKind::Classical, name, size, offset))
    }

    fn qreg(name: &str, size: usize, offset: usize) -> Arc<Register> {
        Arc::new(Register::new(RegKind::Quantum, name, size, offset))
    }

    #[test]
    fn test_guard_zero_matches_cleared_state() {
        let exec = ExecState::new(2);
        let c = creg("c", 2, 0);
        assert!(guard_holds(&exec, &c, &BigInt::from_decimal("0")));
        assert!(!guard_holds(&exec, &c, &BigInt::from_decimal("3")));
    }

    #[test]
    fn test_guard_matches_set_bits() {
        let mut exec = ExecState::new(2);
        exec.classical.set(0, true);
        exec.classical.set(1, true);
        let c = creg("c", 2, 0);
        assert!(guard_holds(&exec, &c, &BigInt::from_decimal("3")));
        assert!(!guard_holds(&exec, &c, &BigInt::from_decimal("1")));
    }

    #[test]
    fn test_guard_rejects_literal_wider_than_register() {
        let exec = ExecState::new(2);
        let c = creg("c", 2, 0);
        assert!(!guard_holds(&exec, &c, &BigInt::from_decimal("4")));
    }

    #[test]
    fn test_if_gates_execution() {
        // if (c == 1) reset q[0];  with c all-zero: the body must not
        // run, which is observable here only through Ok(()).
        let c = creg("c", 1, 0);
        let q = qreg("q", 1, 0);
        let inst = Instruction::If {
            creg: c,
            value: BigInt::from_decimal("1"),
            body: Box::new(Instruction::Reset {
                target: Operand::Bit(Bit::new(q, 0)),
            }),
        };
        let mut exec = ExecState::new(1);
        inst.execute(&mut exec).unwrap();
    }

    #[test]
    fn test_display_forms() {
        let q = qreg("q", 2, 0);
        let c = creg("c", 2, 0);
        let m = Instruction::Measure {
            src: Operand::Bit(Bit::new(q.clone(), 0)),
            dst: Operand::Bit(Bit::new(c.clone(), 1)),
        };
        assert_eq!(m.to_string(), "measure q[0] -> c[1];");

        let b = Instruction::Barrier {
            targets: vec![Operand::Register(q.clone()), Operand::Bit(Bit::new(q, 1))],
        };
        assert_eq!(b.to_string(), "barrier q, q[1];");

        let i = Instruction::If {
            creg: c,
            value: BigInt::from_decimal("3"),
            body: Box::new(Instruction::Reset {
                target: Operand::Register(qreg("r", 1, 2)),
            }),
        };
        assert_eq!(i.to_string(), "if (c == 3) reset r;");
    }
}
