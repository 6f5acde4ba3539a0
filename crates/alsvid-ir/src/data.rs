//! Registers, bits and gate-body operands.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::program::Frame;

/// Whether a register holds classical bits or qubits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegKind {
    /// Classical bits.
    Classical,
    /// Qubits.
    Quantum,
}

/// A named, fixed-size range of same-typed bits.
///
/// Classical and quantum registers live in two disjoint flat address
/// spaces; `offset` is the register's position in its space, assigned
/// monotonically at declaration time. Size and offset never change after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    pub kind: RegKind,
    pub size: usize,
    pub offset: usize,
}

impl Register {
    pub fn new(kind: RegKind, name: impl Into<String>, size: usize, offset: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
            offset,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}

/// One addressable bit inside a register.
#[derive(Debug, Clone)]
pub struct Bit {
    pub register: Arc<Register>,
    pub index: usize,
}

impl Bit {
    pub fn new(register: Arc<Register>, index: usize) -> Self {
        Self { register, index }
    }

    /// Flat address: owning register's offset plus the index.
    pub fn offset(&self) -> usize {
        self.register.offset + self.index
    }
}

impl fmt::Display for Bit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register.name, self.index)
    }
}

/// A bit-addressable operand of an instruction.
///
/// Global program statements reference concrete registers and bits. Gate
/// bodies instead reference the gate's formal qubit slots by index; a
/// `Formal` is only meaningful while a call is active, when the live
/// [`Frame`] maps its slot to a concrete register or bit.
#[derive(Debug, Clone)]
pub enum Operand {
    Register(Arc<Register>),
    Bit(Bit),
    Formal { name: String, slot: usize },
}

impl Operand {
    /// The source name of the operand. A formal reports its formal name
    /// even when unbound.
    pub fn name(&self) -> &str {
        match self {
            Operand::Register(r) => &r.name,
            Operand::Bit(b) => &b.register.name,
            Operand::Formal { name, .. } => name,
        }
    }

    pub fn kind(&self) -> Result<RegKind> {
        match self {
            Operand::Register(r) => Ok(r.kind),
            Operand::Bit(b) => Ok(b.register.kind),
            Operand::Formal { name, .. } => Err(unbound(name)),
        }
    }

    pub fn size(&self) -> Result<usize> {
        match self {
            Operand::Register(r) => Ok(r.size),
            Operand::Bit(_) => Ok(1),
            Operand::Formal { name, .. } => Err(unbound(name)),
        }
    }

    pub fn offset(&self) -> Result<usize> {
        match self {
            Operand::Register(r) => Ok(r.offset),
            Operand::Bit(b) => Ok(b.offset()),
            Operand::Formal { name, .. } => Err(unbound(name)),
        }
    }

    pub fn is_reg(&self) -> Result<bool> {
        match self {
            Operand::Register(_) => Ok(true),
            Operand::Bit(_) => Ok(false),
            Operand::Formal { name, .. } => Err(unbound(name)),
        }
    }

    pub fn is_bit(&self) -> Result<bool> {
        Ok(!self.is_reg()?)
    }

    pub fn is_classical(&self) -> Result<bool> {
        Ok(self.kind()? == RegKind::Classical)
    }

    pub fn is_quantum(&self) -> Result<bool> {
        Ok(self.kind()? == RegKind::Quantum)
    }

    /// Resolve to a concrete register or bit against the caller's frame.
    ///
    /// Concrete operands resolve to themselves. A formal resolves to the
    /// value bound to its slot, which is itself concrete because frames
    /// are built from resolved operands; this is what lets a qubit thread
    /// through arbitrarily deep nested gate calls.
    pub fn resolve(&self, frame: Option<&Frame>) -> Result<Operand> {
        match self {
            Operand::Register(_) | Operand::Bit(_) => Ok(self.clone()),
            Operand::Formal { name, slot } => {
                let frame = frame.ok_or_else(|| unbound(name))?;
                frame
                    .qubits
                    .get(*slot)
                    .cloned()
                    .ok_or_else(|| unbound(name))
            }
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{}", r.name),
            Operand::Bit(b) => write!(f, "{b}"),
            Operand::Formal { name, .. } => write!(f, "{name}"),
        }
    }
}

fn unbound(name: &str) -> Error {
    Error::new(format!("formal argument {name} is not bound"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qreg(name: &str, size: usize, offset: usize) -> Arc<Register> {
        Arc::new(Register::new(RegKind::Quantum, name, size, offset))
    }

    #[test]
    fn test_register_capabilities() {
        let op = Operand::Register(qreg("q", 3, 2));
        assert_eq!(op.name(), "q");
        assert_eq!(op.size().unwrap(), 3);
        assert_eq!(op.offset().unwrap(), 2);
        assert!(op.is_reg().unwrap());
        assert!(!op.is_bit().unwrap());
        assert!(op.is_quantum().unwrap());
        assert!(!op.is_classical().unwrap());
    }

    #[test]
    fn test_bit_offset_is_derived() {
        let r = qreg("q", 4, 10);
        let op = Operand::Bit(Bit::new(r, 3));
        assert_eq!(op.size().unwrap(), 1);
        assert_eq!(op.offset().unwrap(), 13);
        assert!(op.is_bit().unwrap());
    }

    #[test]
    fn test_unbound_formal_errors() {
        let op = Operand::Formal {
            name: "a".into(),
            slot: 0,
        };
        assert_eq!(op.name(), "a");
        assert!(op.kind().is_err());
        assert!(op.size().is_err());
        assert!(op.offset().is_err());
        assert!(op.is_reg().is_err());
        assert!(op.resolve(None).is_err());
    }

    #[test]
    fn test_formal_resolves_through_frame() {
        let r = qreg("q", 2, 0);
        let frame = Frame {
            qubits: vec![Operand::Bit(Bit::new(r, 1))],
            params: vec![],
        };
        let op = Operand::Formal {
            name: "a".into(),
            slot: 0,
        };
        let resolved = op.resolve(Some(&frame)).unwrap();
        assert_eq!(resolved.offset().unwrap(), 1);
        assert!(resolved.is_bit().unwrap());
    }
}
