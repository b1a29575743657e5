//! Kernel structure for QPC
//!
//! Gantree: L1_Kernel → Kernel
//!
//! A kernel is a named, ordered circuit of operations. Control-flow
//! marker kernels carry no operations, only their kind (and condition).

use crate::operation::{Operation, OperationKind};
use crate::types::Condition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel kind
/// Gantree: KernelKind // 커널 종류
///
/// Marker variants that guard a region carry the guard condition; the
/// condition exists nowhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelKind {
    /// Ordinary kernel with operations
    Static,
    /// Start of an if region
    IfStart(Condition),
    /// End of an if region
    IfEnd(Condition),
    /// Start of an else region
    ElseStart(Condition),
    /// End of an else region
    ElseEnd(Condition),
    /// Start of a do-while body
    DoWhileStart(Condition),
    /// End of a do-while body (loop-back test)
    DoWhileEnd(Condition),
    /// Start of a for body
    ForStart {
        /// Loop trip count
        iterations: usize,
    },
    /// End of a for body
    ForEnd,
}

impl KernelKind {
    /// Guard condition of a marker, if any
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            KernelKind::IfStart(c)
            | KernelKind::IfEnd(c)
            | KernelKind::ElseStart(c)
            | KernelKind::ElseEnd(c)
            | KernelKind::DoWhileStart(c)
            | KernelKind::DoWhileEnd(c) => Some(c),
            KernelKind::Static | KernelKind::ForStart { .. } | KernelKind::ForEnd => None,
        }
    }

    /// Check if this is a synthetic control-flow marker
    pub fn is_marker(&self) -> bool {
        !matches!(self, KernelKind::Static)
    }

    /// Upper-case tag used in listings
    pub fn tag(&self) -> &'static str {
        match self {
            KernelKind::Static => "STATIC",
            KernelKind::IfStart(_) => "IF_START",
            KernelKind::IfEnd(_) => "IF_END",
            KernelKind::ElseStart(_) => "ELSE_START",
            KernelKind::ElseEnd(_) => "ELSE_END",
            KernelKind::DoWhileStart(_) => "DO_WHILE_START",
            KernelKind::DoWhileEnd(_) => "DO_WHILE_END",
            KernelKind::ForStart { .. } => "FOR_START",
            KernelKind::ForEnd => "FOR_END",
        }
    }
}

/// Quantum kernel
/// Gantree: Kernel // 커널 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kernel {
    /// Kernel name, unique within a program
    /// Gantree: name: String // 이름
    name: String,

    /// Kernel kind
    kind: KernelKind,

    /// Operation sequence
    /// Gantree: circuit: Vec<Operation> // 연산 목록
    circuit: Vec<Operation>,

    /// Repetition count used when fusing a for body
    iterations: usize,
}

impl Kernel {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty static kernel
    /// Gantree: new(name) -> Self // 생성자
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: KernelKind::Static,
            circuit: Vec::new(),
            iterations: 1,
        }
    }

    /// Create an operation-free marker kernel
    pub fn marker(name: impl Into<String>, kind: KernelKind) -> Self {
        Self {
            name: name.into(),
            kind,
            circuit: Vec::new(),
            iterations: 1,
        }
    }

    /// Create a static kernel from operations
    pub fn from_operations(name: impl Into<String>, ops: Vec<Operation>) -> Self {
        Self {
            circuit: ops,
            ..Self::new(name)
        }
    }

    // ========================================================================
    // Basic Operations
    // ========================================================================

    /// Append an operation
    pub fn add(&mut self, op: Operation) {
        self.circuit.push(op);
    }

    /// Append several operations
    pub fn add_all(&mut self, ops: impl IntoIterator<Item = Operation>) {
        self.circuit.extend(ops);
    }

    /// Kernel name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kernel kind
    pub fn kind(&self) -> &KernelKind {
        &self.kind
    }

    /// Guard condition (markers only)
    pub fn condition(&self) -> Option<&Condition> {
        self.kind.condition()
    }

    /// Repetition count
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub(crate) fn set_iterations(&mut self, iterations: usize) {
        self.iterations = iterations;
    }

    /// Operations
    pub fn circuit(&self) -> &[Operation] {
        &self.circuit
    }

    /// Mutable operations (for in-place passes and scheduling)
    pub fn circuit_mut(&mut self) -> &mut Vec<Operation> {
        &mut self.circuit
    }

    /// Replace the whole circuit
    pub fn set_circuit(&mut self, circuit: Vec<Operation>) {
        self.circuit = circuit;
    }

    /// Check if kernel has no operations
    pub fn is_empty(&self) -> bool {
        self.circuit.is_empty()
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.circuit.len()
    }

    // ========================================================================
    // Kernel Analysis
    // ========================================================================

    /// Count operations of a kind
    pub fn count_kind(&self, kind: OperationKind) -> usize {
        self.circuit.iter().filter(|op| op.kind() == kind).count()
    }

    /// Count two-qubit gates
    pub fn count_2q(&self) -> usize {
        self.circuit.iter().filter(|op| op.is_two_qubit()).count()
    }

    /// Count measurements
    pub fn count_measurements(&self) -> usize {
        self.circuit.iter().filter(|op| op.is_measurement()).count()
    }

    /// Sum of declared durations (sequential execution time)
    pub fn total_duration(&self) -> u64 {
        self.circuit.iter().map(|op| op.duration()).sum()
    }

    // ========================================================================
    // Text Form
    // ========================================================================

    /// Section header: `.name` (or `.name(N)`) plus the marker comment
    pub fn qasm_header(&self) -> String {
        let mut out = if self.iterations > 1 {
            format!(".{}({})\n", self.name, self.iterations)
        } else {
            format!(".{}\n", self.name)
        };

        match &self.kind {
            KernelKind::Static => {}
            KernelKind::ForStart { iterations } => {
                out.push_str(&format!("    # {} {}\n", self.kind.tag(), iterations));
            }
            kind => match kind.condition() {
                Some(cond) => out.push_str(&format!("    # {} {}\n", kind.tag(), cond)),
                None => out.push_str(&format!("    # {}\n", kind.tag())),
            },
        }
        out
    }

    /// Render the kernel as a cQASM subcircuit
    /// Gantree: qasm(&self) -> String // QASM 출력
    pub fn qasm(&self) -> String {
        let mut out = self.qasm_header();
        for op in &self.circuit {
            out.push_str("    ");
            out.push_str(&op.to_qasm());
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kernel({}, {}, {} ops)",
            self.name,
            self.kind.tag(),
            self.circuit.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_kernel_defaults() {
        let k = Kernel::new("aKernel");
        assert_eq!(k.name(), "aKernel");
        assert_eq!(k.kind(), &KernelKind::Static);
        assert_eq!(k.iterations(), 1);
        assert!(k.is_empty());
        assert!(k.condition().is_none());
    }

    #[test]
    fn test_marker_condition() {
        let cond = Condition::new("==", [0, 1]);
        let m = Kernel::marker("k_if", KernelKind::IfStart(cond.clone()));
        assert!(m.kind().is_marker());
        assert_eq!(m.condition(), Some(&cond));

        let f = Kernel::marker("k_for0_start", KernelKind::ForStart { iterations: 3 });
        assert!(f.condition().is_none());
    }

    #[test]
    fn test_kernel_counts() {
        let mut k = Kernel::new("k");
        k.add(Operation::quantum("prepz", &[0], 100));
        k.add(Operation::quantum("cnot", &[0, 1], 40));
        k.add(Operation::classical("add", &[0, 1], 20));
        k.add(Operation::quantum("measure", &[1], 300));

        assert_eq!(k.len(), 4);
        assert_eq!(k.count_kind(OperationKind::Quantum), 3);
        assert_eq!(k.count_kind(OperationKind::Classical), 1);
        assert_eq!(k.count_2q(), 1);
        assert_eq!(k.count_measurements(), 1);
        assert_eq!(k.total_duration(), 460);
    }

    #[test]
    fn test_static_qasm() {
        let k = Kernel::from_operations(
            "bell",
            vec![
                Operation::quantum("h", &[0], 20),
                Operation::quantum("cnot", &[0, 1], 40),
            ],
        );
        assert_eq!(k.qasm(), ".bell\n    h q[0]\n    cnot q[0],q[1]\n");
    }

    #[test]
    fn test_marker_qasm() {
        let m = Kernel::marker("k_if", KernelKind::IfStart(Condition::new("==", [0, 1])));
        assert_eq!(m.qasm(), ".k_if\n    # IF_START r[0] == r[1]\n");

        let mut body = Kernel::new("body");
        body.set_iterations(4);
        assert!(body.qasm().starts_with(".body(4)\n"));
    }
}
