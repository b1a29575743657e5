//! Operation definitions for QPC
//!
//! Gantree: L1_Kernel → Operation
//!
//! An operation is a single quantum or classical instruction inside a
//! kernel's circuit. Apart from the cycle assigned by a scheduler it is
//! immutable after creation.

use crate::types::{Cycle, DurationNs};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation kind
/// Gantree: OperationKind // 연산 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Gate acting on qubits
    Quantum,
    /// Instruction acting on classical registers
    Classical,
    /// Explicit idle period on qubits
    Wait,
    /// Scheduling artifact (never emitted)
    Dummy,
}

impl OperationKind {
    /// Whether operands index classical registers
    pub fn is_classical(&self) -> bool {
        matches!(self, OperationKind::Classical)
    }

    /// Whether the bundler drops operations of this kind
    pub fn is_scheduling_artifact(&self) -> bool {
        matches!(self, OperationKind::Wait | OperationKind::Dummy)
    }
}

/// Quantum/classical operation
/// Gantree: Operation // 연산 구조체
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Instruction name (e.g. "x", "cnot", "measure", "add")
    /// Gantree: name: String // 이름
    name: String,

    /// Operation kind
    kind: OperationKind,

    /// Qubit or register indices
    /// Gantree: operands: Vec<usize> // 피연산자
    operands: Vec<usize>,

    /// Declared duration in nanoseconds
    /// Gantree: duration: DurationNs // 실행 시간
    duration: DurationNs,

    /// Rotation angle for parameterized gates
    angle: Option<f64>,

    /// Start cycle, assigned by a scheduler
    /// Gantree: cycle: Option<Cycle> // 시작 사이클
    cycle: Option<Cycle>,
}

impl Operation {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a quantum gate
    pub fn quantum(name: impl Into<String>, qubits: &[usize], duration: DurationNs) -> Self {
        Self::new(name, OperationKind::Quantum, qubits, duration)
    }

    /// Create a parameterized quantum gate
    pub fn rotation(name: impl Into<String>, qubit: usize, angle: f64, duration: DurationNs) -> Self {
        let mut op = Self::quantum(name, &[qubit], duration);
        op.angle = Some(angle);
        op
    }

    /// Create a classical instruction on registers
    pub fn classical(name: impl Into<String>, registers: &[usize], duration: DurationNs) -> Self {
        Self::new(name, OperationKind::Classical, registers, duration)
    }

    /// Create an explicit wait on qubits
    pub fn wait(qubits: &[usize], duration: DurationNs) -> Self {
        Self::new("wait", OperationKind::Wait, qubits, duration)
    }

    /// Create a dummy scheduling node
    pub fn dummy(name: impl Into<String>) -> Self {
        Self::new(name, OperationKind::Dummy, &[], 0)
    }

    fn new(
        name: impl Into<String>,
        kind: OperationKind,
        operands: &[usize],
        duration: DurationNs,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            operands: operands.to_vec(),
            duration,
            angle: None,
            cycle: None,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Instruction name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operation kind
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Operand indices
    pub fn operands(&self) -> &[usize] {
        &self.operands
    }

    /// Declared duration in nanoseconds
    pub fn duration(&self) -> DurationNs {
        self.duration
    }

    /// Rotation angle, if any
    pub fn angle(&self) -> Option<f64> {
        self.angle
    }

    /// Assigned start cycle
    pub fn cycle(&self) -> Option<Cycle> {
        self.cycle
    }

    /// Record the start cycle chosen by a scheduler
    pub fn set_cycle(&mut self, cycle: Cycle) {
        self.cycle = Some(cycle);
    }

    /// Check if the operation has been scheduled
    pub fn is_scheduled(&self) -> bool {
        self.cycle.is_some()
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Check if operation is a quantum gate
    pub fn is_quantum(&self) -> bool {
        self.kind == OperationKind::Quantum
    }

    /// Check if operation is classical
    pub fn is_classical(&self) -> bool {
        self.kind.is_classical()
    }

    /// Check if gate is two-qubit
    pub fn is_two_qubit(&self) -> bool {
        self.is_quantum() && self.operands.len() == 2
    }

    /// Check if gate is a measurement
    pub fn is_measurement(&self) -> bool {
        self.is_quantum() && self.name.starts_with("measure")
    }

    /// Check if this operation touches the given operand in the same space
    pub fn uses(&self, kind_is_classical: bool, index: usize) -> bool {
        self.is_classical() == kind_is_classical && self.operands.contains(&index)
    }

    // ========================================================================
    // Text Form
    // ========================================================================

    /// Render to cQASM-style text
    /// Gantree: to_qasm(&self) -> String // QASM 변환
    pub fn to_qasm(&self) -> String {
        match self.kind {
            OperationKind::Wait => format!("wait {}", self.duration),
            OperationKind::Dummy => format!("# {}", self.name),
            OperationKind::Quantum | OperationKind::Classical => {
                let prefix = if self.is_classical() { 'r' } else { 'q' };
                let operands: Vec<String> = self
                    .operands
                    .iter()
                    .map(|o| format!("{}[{}]", prefix, o))
                    .collect();
                let head = match self.angle {
                    Some(angle) => format!("{}({})", self.name, angle),
                    None => self.name.clone(),
                };
                if operands.is_empty() {
                    head
                } else {
                    format!("{} {}", head, operands.join(","))
                }
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_qasm())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantum_qasm() {
        assert_eq!(Operation::quantum("x", &[0], 20).to_qasm(), "x q[0]");
        assert_eq!(
            Operation::quantum("cnot", &[0, 2], 40).to_qasm(),
            "cnot q[0],q[2]"
        );
        assert_eq!(
            Operation::rotation("rx", 1, 0.5, 20).to_qasm(),
            "rx(0.5) q[1]"
        );
    }

    #[test]
    fn test_classical_qasm() {
        let op = Operation::classical("add", &[0, 1, 2], 20);
        assert!(op.is_classical());
        assert_eq!(op.to_qasm(), "add r[0],r[1],r[2]");
    }

    #[test]
    fn test_wait_and_dummy() {
        assert!(Operation::wait(&[0], 60).kind().is_scheduling_artifact());
        assert!(Operation::dummy("SOURCE").kind().is_scheduling_artifact());
        assert!(!OperationKind::Quantum.is_scheduling_artifact());
        assert_eq!(Operation::wait(&[], 60).to_qasm(), "wait 60");
    }

    #[test]
    fn test_cycle_assignment() {
        let mut op = Operation::quantum("h", &[0], 20);
        assert!(!op.is_scheduled());
        op.set_cycle(4);
        assert_eq!(op.cycle(), Some(4));
    }

    #[test]
    fn test_properties() {
        assert!(Operation::quantum("cz", &[0, 1], 40).is_two_qubit());
        assert!(Operation::quantum("measure", &[0], 300).is_measurement());
        let op = Operation::classical("mov", &[3], 20);
        assert!(op.uses(true, 3));
        assert!(!op.uses(false, 3));
    }
}
