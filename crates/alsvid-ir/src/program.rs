//! The executable program and its execution context.

use std::sync::Arc;

use tracing::debug;

use crate::data::Operand;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::instruction::Instruction;

/// Default bound on gate-call nesting.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

/// One gate-call activation: the actual values bound to the callee's
/// formal slots for the duration of the call.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Concrete register/bit bound to each formal qubit slot. Never a
    /// `Formal`: binding resolves through the caller's own frame first.
    pub qubits: Vec<Operand>,
    /// Caller-side expression bound to each formal parameter slot, shared
    /// with the call site. Evaluated one frame below this one.
    pub params: Vec<Arc<Expr>>,
}

/// The stack of gate-call activations.
///
/// Each call pushes a fresh frame on entry and pops it on every exit
/// path, so recursive and re-entrant calls never observe a previous
/// call's bindings.
#[derive(Debug)]
pub struct CallStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::with_max_depth(DEFAULT_MAX_CALL_DEPTH)
    }
}

impl CallStack {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a new activation. Refuses to grow past the depth bound.
    pub fn push(&mut self, frame: Frame) -> Result<()> {
        if self.frames.len() >= self.max_depth {
            return Err(Error::new(format!(
                "gate call nesting exceeds the limit of {}",
                self.max_depth
            )));
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// The innermost activation, if any.
    pub fn top(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub(crate) fn frame(&self, idx: usize) -> &Frame {
        &self.frames[idx]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Live classical bit values over the flat classical address space.
///
/// Without a numerical simulator nothing ever sets a bit, so every guard
/// compares against an all-zero pattern; the store exists so that a host
/// embedding a simulator can feed measurement outcomes back in.
#[derive(Debug, Clone, Default)]
pub struct ClassicalState {
    bits: Vec<bool>,
}

impl ClassicalState {
    /// A store covering `len` classical bits, all cleared.
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    /// Read the bit at a flat classical offset. Offsets past the store
    /// read as zero.
    pub fn get(&self, offset: usize) -> bool {
        self.bits.get(offset).copied().unwrap_or(false)
    }

    /// Write the bit at a flat classical offset, growing the store as
    /// needed.
    pub fn set(&mut self, offset: usize, value: bool) {
        if offset >= self.bits.len() {
            self.bits.resize(offset + 1, false);
        }
        self.bits[offset] = value;
    }
}

/// Everything an executing instruction needs: the call stack and the
/// classical bit store. Threaded explicitly through `execute` instead of
/// back-pointers from instructions to their owning program.
#[derive(Debug, Default)]
pub struct ExecState {
    pub stack: CallStack,
    pub classical: ClassicalState,
}

impl ExecState {
    pub fn new(classical_bits: usize) -> Self {
        Self {
            stack: CallStack::default(),
            classical: ClassicalState::new(classical_bits),
        }
    }
}

/// The ordered instruction sequence of the global program.
#[derive(Debug, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Execute every instruction in order.
    ///
    /// The call stack is left empty afterwards, error or not, so a later
    /// `run` never observes bindings from this one.
    pub fn run(&self, exec: &mut ExecState) -> Result<()> {
        debug!(instructions = self.instructions.len(), "running program");
        let result = self
            .instructions
            .iter()
            .try_for_each(|inst| inst.execute(exec));
        exec.stack.clear();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_depth_limit() {
        let mut stack = CallStack::with_max_depth(2);
        let frame = || Frame {
            qubits: vec![],
            params: vec![],
        };
        stack.push(frame()).unwrap();
        stack.push(frame()).unwrap();
        assert!(stack.push(frame()).is_err());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_classical_state_defaults_to_zero() {
        let s = ClassicalState::new(4);
        assert!(!s.get(0));
        assert!(!s.get(100));
    }

    #[test]
    fn test_classical_state_set_get() {
        let mut s = ClassicalState::new(2);
        s.set(1, true);
        assert!(s.get(1));
        s.set(5, true);
        assert!(s.get(5));
        assert!(!s.get(4));
    }
}
