//! Kernel statistics for QPC
//!
//! Gantree: L3_Scheduling → Statistics
//!
//! Gate counts, qubit usage and circuit depth, collected before and after
//! the prescheduler and written as comment-prefixed report text.

use crate::bundler::Bundler;
use qpc_core::{DurationNs, Kernel, OperationKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Statistics of one kernel
/// Gantree: KernelStatistics // 커널 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelStatistics {
    /// Kernel name
    pub name: String,
    /// Quantum gates
    pub quantum_gates: usize,
    /// Gates on two or more qubits
    pub multi_qubit_gates: usize,
    /// Classical operations
    pub classical_operations: usize,
    /// Measurements
    pub measurements: usize,
    /// Distinct qubits touched
    pub qubits_used: usize,
    /// Depth in cycles, known once the kernel has been scheduled
    pub depth: Option<usize>,
}

impl KernelStatistics {
    /// Collect statistics for a kernel
    /// Gantree: collect(kernel,cycle_time) -> Self // 통계 수집
    pub fn collect(kernel: &Kernel, cycle_time: DurationNs) -> Self {
        let circuit = kernel.circuit();
        let qubits: BTreeSet<usize> = circuit
            .iter()
            .filter(|op| op.is_quantum())
            .flat_map(|op| op.operands().iter().copied())
            .collect();

        let scheduled = circuit
            .iter()
            .filter(|op| !op.kind().is_scheduling_artifact())
            .all(|op| op.is_scheduled());
        let depth = if scheduled && cycle_time > 0 {
            match Bundler::bundle(circuit, cycle_time) {
                Ok(bundles) => Some(Bundler::depth(&bundles)),
                Err(e) => {
                    log::warn!("no depth for kernel '{}': {}", kernel.name(), e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            name: kernel.name().to_string(),
            quantum_gates: kernel.count_kind(OperationKind::Quantum),
            multi_qubit_gates: circuit
                .iter()
                .filter(|op| op.is_quantum() && op.operands().len() > 1)
                .count(),
            classical_operations: kernel.count_kind(OperationKind::Classical),
            measurements: kernel.count_measurements(),
            qubits_used: qubits.len(),
            depth,
        }
    }

    /// Report lines, each starting with `prefix`
    pub fn to_report(&self, prefix: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}Kernel: {}", prefix, self.name);
        self.write_counts(&mut out, prefix);
        out
    }

    fn write_counts(&self, out: &mut String, prefix: &str) {
        let _ = writeln!(out, "{}Total no. of quantum gates: {}", prefix, self.quantum_gates);
        let _ = writeln!(
            out,
            "{}Total no. of non single qubit gates: {}",
            prefix, self.multi_qubit_gates
        );
        let _ = writeln!(
            out,
            "{}Total no. of classical operations: {}",
            prefix, self.classical_operations
        );
        let _ = writeln!(out, "{}Total no. of measurements: {}", prefix, self.measurements);
        let _ = writeln!(out, "{}Qubits used: {}", prefix, self.qubits_used);
        match self.depth {
            Some(depth) => {
                let _ = writeln!(out, "{}Circuit depth: {}", prefix, depth);
            }
            None => {
                let _ = writeln!(out, "{}Circuit depth: unscheduled", prefix);
            }
        }
    }
}

/// Report over all kernels of a program
/// Gantree: report_statistics(name,kernels,stage,pass) -> String // 통계 보고
///
/// Totals sum the per-kernel counts; qubit usage and depth of the totals
/// are the maximum over kernels.
pub fn report_statistics(
    program_name: &str,
    kernels: &[Kernel],
    cycle_time: DurationNs,
    stage: &str,
    pass: &str,
    prefix: &str,
) -> String {
    let stats: Vec<KernelStatistics> = kernels
        .iter()
        .map(|k| KernelStatistics::collect(k, cycle_time))
        .collect();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}Statistics of program '{}' {} {}",
        prefix, program_name, stage, pass
    );
    for s in &stats {
        out.push_str(&s.to_report(prefix));
    }

    let total = stats.iter().fold(
        KernelStatistics {
            name: "total".into(),
            depth: Some(0),
            ..Default::default()
        },
        |mut acc, s| {
            acc.quantum_gates += s.quantum_gates;
            acc.multi_qubit_gates += s.multi_qubit_gates;
            acc.classical_operations += s.classical_operations;
            acc.measurements += s.measurements;
            acc.qubits_used = acc.qubits_used.max(s.qubits_used);
            acc.depth = match (acc.depth, s.depth) {
                (Some(a), Some(b)) => Some(a.max(b)),
                _ => None,
            };
            acc
        },
    );
    let _ = writeln!(out, "{}Kernels: {}", prefix, stats.len());
    total.write_counts(&mut out, prefix);
    out
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{ListScheduler, Scheduler};
    use qpc_core::{KernelBuilder, Operation, Platform};

    fn bell(platform: &Platform) -> Kernel {
        KernelBuilder::new("bell", platform)
            .prepz(0)
            .h(0)
            .cnot(0, 1)
            .classical("add", &[0, 1])
            .measure(0)
            .measure(1)
            .build()
    }

    #[test]
    fn test_collect_unscheduled() {
        let platform = Platform::qx(2);
        let stats = KernelStatistics::collect(&bell(&platform), platform.cycle_time);

        assert_eq!(stats.quantum_gates, 5);
        assert_eq!(stats.multi_qubit_gates, 1);
        assert_eq!(stats.classical_operations, 1);
        assert_eq!(stats.measurements, 2);
        assert_eq!(stats.qubits_used, 2);
        assert_eq!(stats.depth, None);
    }

    #[test]
    fn test_collect_scheduled_depth() {
        let platform = Platform::qx(2);
        let mut kernel = bell(&platform);
        ListScheduler::asap().schedule(&mut kernel, &platform).unwrap();

        let stats = KernelStatistics::collect(&kernel, platform.cycle_time);
        // prepz, h, cnot, then both measurements in parallel
        assert_eq!(stats.depth, Some(4));
    }

    #[test]
    fn test_collect_out_of_order_has_no_depth() {
        let mut kernel = Kernel::new("k");
        for (name, cycle) in [("x", 2), ("y", 1)] {
            let mut op = Operation::quantum(name, &[0], 20);
            op.set_cycle(cycle);
            kernel.circuit_mut().push(op);
        }

        let stats = KernelStatistics::collect(&kernel, 20);
        assert_eq!(stats.quantum_gates, 2);
        assert_eq!(stats.depth, None);
    }

    #[test]
    fn test_report_text() {
        let platform = Platform::qx(2);
        let kernels = vec![bell(&platform), Kernel::new("empty")];
        let report = report_statistics("prog", &kernels, platform.cycle_time, "in", "prescheduler", "# ");

        assert!(report.starts_with("# Statistics of program 'prog' in prescheduler\n"));
        assert!(report.contains("# Kernel: bell\n"));
        assert!(report.contains("# Kernel: empty\n"));
        assert!(report.contains("# Kernels: 2\n"));
        assert!(report.lines().all(|l| l.starts_with("# ")));
        assert!(report.ends_with("# Circuit depth: unscheduled\n"));
    }

    #[test]
    fn test_statistics_json() {
        let platform = Platform::qx(2);
        let stats = KernelStatistics::collect(&bell(&platform), platform.cycle_time);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"quantum_gates\":5"));
        assert!(json.contains("\"depth\":null"));

        let back: KernelStatistics = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
