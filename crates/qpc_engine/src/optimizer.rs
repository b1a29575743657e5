//! Peephole optimizer for QPC
//!
//! Gantree: L5_Engine → PeepholeOptimizer
//!
//! Streams a circuit into an output buffer. For each gate the last buffered
//! gate on the same qubits is its neighbour on those qubits' timelines; when
//! the pair reduces algebraically the buffer is rewritten in place. Wait,
//! classical and operand-less operations fence the buffer. Passes repeat
//! until nothing changes.

use qpc_core::{Kernel, Operation, OperationKind};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Angles closer to zero than this are treated as zero
const ANGLE_EPSILON: f64 = 1e-12;

/// Gates that are their own inverse
const SELF_INVERSE: [&str; 7] = ["h", "x", "y", "z", "cnot", "cz", "swap"];

/// Gates that do nothing
const IDENTITIES: [&str; 2] = ["i", "identity"];

/// Peephole statistics
/// Gantree: OptimizationStats // 최적화 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationStats {
    /// Gate count before optimization
    pub gates_before: usize,
    /// Gate count after optimization
    pub gates_after: usize,
    /// Gates removed over all passes
    pub gates_removed: usize,
    /// Passes until the fixed point
    pub passes: usize,
}

impl OptimizationStats {
    /// Fraction of gates eliminated
    pub fn reduction_ratio(&self) -> f64 {
        if self.gates_before == 0 {
            return 0.0;
        }
        self.gates_removed as f64 / self.gates_before as f64
    }

    /// Combine statistics of two circuits
    pub fn merge(self, other: Self) -> Self {
        Self {
            gates_before: self.gates_before + other.gates_before,
            gates_after: self.gates_after + other.gates_after,
            gates_removed: self.gates_removed + other.gates_removed,
            passes: self.passes.max(other.passes),
        }
    }
}

/// Peephole optimizer
/// Gantree: PeepholeOptimizer // 핍홀 최적화
pub struct PeepholeOptimizer;

impl PeepholeOptimizer {
    /// Optimize a circuit to a fixed point
    /// Gantree: optimize(circuit) -> (Vec<Operation>, Stats) // 최적화
    pub fn optimize(circuit: &[Operation]) -> (Vec<Operation>, OptimizationStats) {
        let gates_before = count_gates(circuit);
        let mut current = circuit.to_vec();
        let mut gates_removed = 0;
        let mut passes = 0;

        loop {
            let (next, removed) = run_pass(&current);
            passes += 1;
            gates_removed += removed;
            current = next;
            if removed == 0 {
                break;
            }
        }

        let stats = OptimizationStats {
            gates_before,
            gates_after: count_gates(&current),
            gates_removed,
            passes,
        };
        (current, stats)
    }

    /// Optimize a kernel's circuit in place
    pub fn optimize_kernel(kernel: &mut Kernel) -> OptimizationStats {
        if kernel.kind().is_marker() {
            return OptimizationStats::default();
        }
        let (circuit, stats) = Self::optimize(kernel.circuit());
        if stats.gates_removed > 0 {
            log::debug!(
                "peephole: kernel '{}' {} -> {} gates",
                kernel.name(),
                stats.gates_before,
                stats.gates_after
            );
        }
        kernel.set_circuit(circuit);
        stats
    }
}

// ============================================================================
// Single Pass
// ============================================================================

fn run_pass(circuit: &[Operation]) -> (Vec<Operation>, usize) {
    let mut out: Vec<Operation> = Vec::with_capacity(circuit.len());
    let mut fence = 0;
    let mut removed = 0;

    for op in circuit {
        if is_fence(op) {
            out.push(op.clone());
            fence = out.len();
            continue;
        }

        if is_identity(op) {
            removed += 1;
            continue;
        }

        if let Some(pos) = neighbour(&out[fence..], op).map(|p| p + fence) {
            if cancels(&out[pos], op) {
                out.remove(pos);
                removed += 2;
                continue;
            }
            match merge_rotations(&out[pos], op) {
                Some(None) => {
                    out.remove(pos);
                    removed += 2;
                    continue;
                }
                Some(Some(merged)) => {
                    out[pos] = merged;
                    removed += 1;
                    continue;
                }
                None => {}
            }
        }

        out.push(op.clone());
    }

    (out, removed)
}

// ============================================================================
// Helpers
// ============================================================================

fn count_gates(circuit: &[Operation]) -> usize {
    circuit.iter().filter(|op| op.is_quantum()).count()
}

fn is_fence(op: &Operation) -> bool {
    op.kind() != OperationKind::Quantum || op.operands().is_empty()
}

/// Normalize to (-π, π]
fn normalize_angle(theta: f64) -> f64 {
    let t = theta.rem_euclid(TAU);
    if t > PI {
        t - TAU
    } else {
        t
    }
}

fn is_rotation(op: &Operation) -> bool {
    matches!(op.name(), "rx" | "ry" | "rz") && op.angle().is_some()
}

fn is_identity(op: &Operation) -> bool {
    if IDENTITIES.contains(&op.name()) {
        return true;
    }
    match op.angle() {
        Some(theta) if is_rotation(op) => normalize_angle(theta).abs() < ANGLE_EPSILON,
        _ => false,
    }
}

/// Index of the buffered gate adjacent to `op` on every qubit it touches
fn neighbour(out: &[Operation], op: &Operation) -> Option<usize> {
    let mut found: Option<usize> = None;
    for &q in op.operands() {
        let last = out.iter().rposition(|prev| prev.operands().contains(&q))?;
        match found {
            None => found = Some(last),
            Some(pos) if pos == last => {}
            Some(_) => return None,
        }
    }
    let pos = found?;
    (out[pos].operands().len() == op.operands().len()).then_some(pos)
}

fn cancels(prev: &Operation, op: &Operation) -> bool {
    if prev.operands() != op.operands() {
        return false;
    }
    let (a, b) = (prev.name(), op.name());
    (a == b && SELF_INVERSE.contains(&a))
        || matches!((a, b), ("s", "sdag") | ("sdag", "s") | ("t", "tdag") | ("tdag", "t"))
}

/// `Some(None)` when the rotations cancel, `Some(Some(merged))` when they
/// combine, `None` when they do not apply
fn merge_rotations(prev: &Operation, op: &Operation) -> Option<Option<Operation>> {
    if !is_rotation(prev) || prev.name() != op.name() || prev.operands() != op.operands() {
        return None;
    }
    let theta = normalize_angle(prev.angle()? + op.angle()?);
    if theta.abs() < ANGLE_EPSILON {
        return Some(None);
    }
    Some(Some(Operation::rotation(
        prev.name(),
        prev.operands()[0],
        theta,
        prev.duration().max(op.duration()),
    )))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qpc_core::{KernelBuilder, KernelKind, Platform};

    fn names(circuit: &[Operation]) -> Vec<&str> {
        circuit.iter().map(|op| op.name()).collect()
    }

    #[test]
    fn test_self_inverse_pair_removed() {
        let platform = Platform::qx(2);
        let kernel = KernelBuilder::new("k", &platform).h(0).h(0).x(1).build();
        let (out, stats) = PeepholeOptimizer::optimize(kernel.circuit());

        assert_eq!(names(&out), vec!["x"]);
        assert_eq!(stats.gates_before, 3);
        assert_eq!(stats.gates_after, 1);
        assert_eq!(stats.gates_removed, 2);
    }

    #[test]
    fn test_cascade_reaches_fixed_point() {
        let platform = Platform::qx(1);
        let kernel = KernelBuilder::new("k", &platform)
            .h(0)
            .x(0)
            .x(0)
            .h(0)
            .build();
        let (out, stats) = PeepholeOptimizer::optimize(kernel.circuit());
        assert!(out.is_empty());
        assert_eq!(stats.gates_removed, 4);
    }

    #[test]
    fn test_commuting_gate_between_pair() {
        let platform = Platform::qx(2);
        let kernel = KernelBuilder::new("k", &platform)
            .cnot(0, 1)
            .x(1)
            .cnot(0, 1)
            .h(0)
            .y(1)
            .h(0)
            .build();
        let (out, _) = PeepholeOptimizer::optimize(kernel.circuit());
        assert_eq!(names(&out), vec!["cnot", "x", "cnot", "y"]);
    }

    #[test]
    fn test_two_qubit_pair_removed() {
        let platform = Platform::qx(3);
        let kernel = KernelBuilder::new("k", &platform)
            .cnot(0, 1)
            .h(2)
            .cnot(0, 1)
            .cnot(1, 0)
            .build();
        let (out, _) = PeepholeOptimizer::optimize(kernel.circuit());
        assert_eq!(names(&out), vec!["h", "cnot"]);
        assert_eq!(out[1].operands(), &[1, 0]);
    }

    #[test]
    fn test_inverse_phase_pairs() {
        let platform = Platform::qx(1);
        let kernel = KernelBuilder::new("k", &platform)
            .t(0)
            .tdag(0)
            .sdag(0)
            .s(0)
            .build();
        let (out, _) = PeepholeOptimizer::optimize(kernel.circuit());
        assert!(out.is_empty());
    }

    #[test]
    fn test_identity_and_zero_rotation_removed() {
        let platform = Platform::qx(1);
        let kernel = KernelBuilder::new("k", &platform)
            .identity(0)
            .rz(0, TAU)
            .x(0)
            .build();
        let (out, stats) = PeepholeOptimizer::optimize(kernel.circuit());
        assert_eq!(names(&out), vec!["x"]);
        assert_relative_eq!(stats.reduction_ratio(), 2.0 / 3.0);
    }

    #[test]
    fn test_rotation_merge() {
        let platform = Platform::qx(1);
        let kernel = KernelBuilder::new("k", &platform)
            .rx(0, 0.25)
            .rx(0, 0.5)
            .ry(0, 1.0)
            .ry(0, -1.0)
            .build();
        let (out, _) = PeepholeOptimizer::optimize(kernel.circuit());
        assert_eq!(out.len(), 1);
        assert_relative_eq!(out[0].angle().unwrap(), 0.75);
    }

    #[test]
    fn test_measure_and_classical_block() {
        let platform = Platform::qx(1);
        let kernel = KernelBuilder::new("k", &platform)
            .x(0)
            .measure(0)
            .x(0)
            .classical("add", &[0])
            .x(0)
            .build();
        let (out, stats) = PeepholeOptimizer::optimize(kernel.circuit());
        assert_eq!(out.len(), 5);
        assert_eq!(stats.gates_removed, 0);
        assert_eq!(stats.passes, 1);
    }

    #[test]
    fn test_optimize_kernel_skips_markers() {
        let mut marker = Kernel::marker("m_for0_end", KernelKind::ForEnd);
        assert_eq!(
            PeepholeOptimizer::optimize_kernel(&mut marker),
            OptimizationStats::default()
        );

        let platform = Platform::qx(1);
        let mut kernel = KernelBuilder::new("k", &platform).z(0).z(0).build();
        let stats = PeepholeOptimizer::optimize_kernel(&mut kernel);
        assert!(kernel.is_empty());
        assert_eq!(stats.merge(stats).gates_removed, 4);
    }
}
