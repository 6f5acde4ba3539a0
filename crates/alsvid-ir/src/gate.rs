//! Gates: named, parameterized instruction templates.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::data::Operand;
use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::instruction::Instruction;
use crate::program::{ExecState, Frame};

/// Reserved name of the builtin single-qubit identity gate.
pub const IDENTITY_GATE: &str = "__identity__";
/// Reserved name of the builtin two-qubit controlled-not gate, spelled
/// `CX` in source.
pub const CNOT_GATE: &str = "__cnot__";
/// Reserved name of the builtin three-parameter single-qubit rotation,
/// spelled `U` in source.
pub const U_GATE: &str = "__u__";

/// A reusable, parameterized template of instructions.
///
/// Formal parameter and qubit names define the gate's own symbol scope;
/// the body references them by slot index. The body is written once at
/// definition time and never mutated afterwards.
#[derive(Debug)]
pub struct Gate {
    pub name: String,
    pub param_names: Vec<String>,
    pub qubit_names: Vec<String>,
    pub param_index: FxHashMap<String, usize>,
    pub qubit_index: FxHashMap<String, usize>,
    pub body: Vec<Instruction>,
}

impl Gate {
    pub fn new(
        name: impl Into<String>,
        param_names: Vec<String>,
        qubit_names: Vec<String>,
    ) -> Self {
        let param_index = param_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let qubit_index = qubit_names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self {
            name: name.into(),
            param_names,
            qubit_names,
            param_index,
            qubit_index,
            body: Vec::new(),
        }
    }

    /// The builtin gates registered before any source is parsed. Their
    /// bodies are empty on purpose: they are leaves of every call tree.
    pub fn builtins() -> Vec<Arc<Gate>> {
        vec![
            Arc::new(Gate::new(IDENTITY_GATE, vec![], vec!["a".into()])),
            Arc::new(Gate::new(CNOT_GATE, vec![], vec!["a".into(), "b".into()])),
            Arc::new(Gate::new(
                U_GATE,
                vec!["theta".into(), "phi".into(), "lambda".into()],
                vec!["a".into()],
            )),
        ]
    }

    pub fn nparams(&self) -> usize {
        self.param_names.len()
    }

    pub fn nqubits(&self) -> usize {
        self.qubit_names.len()
    }

    /// How the gate is spelled in source text. The builtin rotation and
    /// controlled-not have keyword spellings; everything else is called
    /// by its declared name.
    pub fn source_name(&self) -> &str {
        match self.name.as_str() {
            U_GATE => "U",
            CNOT_GATE => "CX",
            other => other,
        }
    }

    /// Bind actual arguments, walk the body, unbind.
    ///
    /// Parameters are bound by shared ownership, not copied. A qubit
    /// operand that is itself one of the caller's formals is resolved
    /// through the caller's frame before binding, so frames only ever
    /// hold concrete registers and bits no matter how deep the call
    /// chain. The frame is popped on every exit path; a failing body
    /// never leaks bindings into the next call.
    pub fn execute(
        &self,
        exec: &mut ExecState,
        params: &[Arc<Expr>],
        qubits: &[Operand],
    ) -> Result<()> {
        if params.len() != self.nparams() {
            return Err(Error::new(format!(
                "gate {} expects {} parameters, {} provided",
                self.name,
                self.nparams(),
                params.len()
            )));
        }
        if qubits.len() != self.nqubits() {
            return Err(Error::new(format!(
                "gate {} expects {} qubits, {} provided",
                self.name,
                self.nqubits(),
                qubits.len()
            )));
        }

        let mut bound = Vec::with_capacity(qubits.len());
        for q in qubits {
            bound.push(q.resolve(exec.stack.top())?);
        }

        // A leaf gate is where parameter laziness ends: force each bound
        // expression now, in the caller's context, so malformed literals
        // and unbound parameters surface during execution.
        if self.body.is_empty() {
            for (name, p) in self.param_names.iter().zip(params) {
                let value = p.evaluate(&exec.stack)?;
                trace!(gate = %self.name, param = %name, value, "evaluated parameter");
            }
        }

        debug!(gate = %self.name, depth = exec.stack.len(), "executing gate");
        exec.stack.push(Frame {
            qubits: bound,
            params: params.to_vec(),
        })?;
        let result = self.body.iter().try_for_each(|inst| inst.execute(exec));
        exec.stack.pop();
        result
    }
}
