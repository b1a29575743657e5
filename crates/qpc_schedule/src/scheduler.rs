//! Kernel scheduler for QPC
//!
//! Gantree: L3_Scheduling → Scheduler
//!
//! Resource-constrained list scheduling. Operations sharing a qubit or a
//! classical register keep their program order; everything else may
//! overlap. Cycles start at 1.

use qpc_core::{duration_in_cycles, Cycle, Kernel, Operation, Platform, QpcError, QpcResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

/// First cycle handed out by the schedulers
pub const FIRST_CYCLE: Cycle = 1;

// ============================================================================
// Scheduler Contract
// ============================================================================

/// DOT diagnostics produced while scheduling one kernel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleDiagnostics {
    /// Dependency graph of the kernel
    pub dependency_dot: String,
    /// Operations ranked by their assigned cycle
    pub scheduled_dot: String,
}

/// Scheduler contract
/// Gantree: Scheduler // 스케줄러 트레잇
pub trait Scheduler {
    /// Name used in artifact names ("ASAP", "ALAP")
    fn name(&self) -> &'static str;

    /// Assign a cycle to every operation and order the circuit by cycle
    fn schedule(&self, kernel: &mut Kernel, platform: &Platform) -> QpcResult<ScheduleDiagnostics>;
}

// ============================================================================
// Scheduler Kind
// ============================================================================

/// Scheduling direction
/// Gantree: SchedulerKind // 스케줄 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulerKind {
    /// As soon as possible
    Asap,
    /// As late as possible
    Alap,
}

impl SchedulerKind {
    /// Option value
    pub fn as_str(&self) -> &'static str {
        match self {
            SchedulerKind::Asap => "ASAP",
            SchedulerKind::Alap => "ALAP",
        }
    }
}

impl FromStr for SchedulerKind {
    type Err = QpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASAP" => Ok(SchedulerKind::Asap),
            "ALAP" => Ok(SchedulerKind::Alap),
            other => Err(QpcError::UnknownOption {
                option: "scheduler".into(),
                value: other.into(),
            }),
        }
    }
}

impl fmt::Display for SchedulerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Resources
// ============================================================================

/// A qubit or a classical register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Resource {
    Qubit(usize),
    Creg(usize),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Qubit(q) => write!(f, "q{}", q),
            Resource::Creg(r) => write!(f, "r{}", r),
        }
    }
}

/// Resources touched by an operation; `None` means every resource
fn resources(op: &Operation) -> Option<Vec<Resource>> {
    if op.operands().is_empty() {
        return None;
    }
    let wrap = if op.is_classical() {
        Resource::Creg
    } else {
        Resource::Qubit
    };
    Some(op.operands().iter().map(|&i| wrap(i)).collect())
}

/// Cycles an operation occupies its resources
fn occupancy(op: &Operation, cycle_time: u64) -> usize {
    let cycles = duration_in_cycles(op.duration(), cycle_time);
    if op.kind().is_scheduling_artifact() {
        cycles
    } else {
        cycles.max(1)
    }
}

/// Earliest free cycle over the touched resources
fn ready_at(
    touched: &Option<Vec<Resource>>,
    free: &HashMap<Resource, usize>,
    barrier: usize,
) -> usize {
    match touched {
        Some(list) => list
            .iter()
            .map(|r| free.get(r).copied().unwrap_or(0))
            .fold(barrier, usize::max),
        None => free.values().copied().fold(barrier, usize::max),
    }
}

fn occupy(
    touched: &Option<Vec<Resource>>,
    free: &mut HashMap<Resource, usize>,
    barrier: &mut usize,
    until: usize,
) {
    match touched {
        Some(list) => {
            for r in list {
                free.insert(*r, until);
            }
        }
        None => {
            for v in free.values_mut() {
                *v = until;
            }
            *barrier = until;
        }
    }
}

// ============================================================================
// List Scheduler
// ============================================================================

/// ASAP/ALAP list scheduler
/// Gantree: ListScheduler // 리스트 스케줄러
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListScheduler {
    kind: SchedulerKind,
}

impl ListScheduler {
    /// Create a scheduler for a direction
    pub fn new(kind: SchedulerKind) -> Self {
        Self { kind }
    }

    /// ASAP scheduler
    pub fn asap() -> Self {
        Self::new(SchedulerKind::Asap)
    }

    /// ALAP scheduler
    pub fn alap() -> Self {
        Self::new(SchedulerKind::Alap)
    }

    /// Scheduling direction
    pub fn kind(&self) -> SchedulerKind {
        self.kind
    }

    /// Start cycles in program order, as soon as possible
    fn asap_cycles(circuit: &[Operation], cycle_time: u64) -> Vec<Cycle> {
        let mut free = HashMap::new();
        let mut barrier = FIRST_CYCLE;
        circuit
            .iter()
            .map(|op| {
                let touched = resources(op);
                let start = ready_at(&touched, &free, barrier).max(FIRST_CYCLE);
                occupy(&touched, &mut free, &mut barrier, start + occupancy(op, cycle_time));
                start
            })
            .collect()
    }

    /// Start cycles in program order, as late as possible
    ///
    /// Schedules the reversed circuit ASAP and mirrors the result so that
    /// the latest finishing operation ends with the ASAP makespan.
    fn alap_cycles(circuit: &[Operation], cycle_time: u64) -> Vec<Cycle> {
        let mut free = HashMap::new();
        let mut barrier = 0;
        let mut finish = vec![0; circuit.len()];

        for (i, op) in circuit.iter().enumerate().rev() {
            let touched = resources(op);
            let start = ready_at(&touched, &free, barrier);
            let end = start + occupancy(op, cycle_time);
            occupy(&touched, &mut free, &mut barrier, end);
            finish[i] = end;
        }

        let makespan = finish.iter().copied().max().unwrap_or(0);
        finish
            .iter()
            .map(|&end| FIRST_CYCLE + makespan - end)
            .collect()
    }

    fn dependency_dot(kernel: &Kernel) -> String {
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph \"{}\" {{", kernel.name());
        let _ = writeln!(dot, "  SOURCE [shape=box];");
        let _ = writeln!(dot, "  SINK [shape=box];");

        let mut last_user: HashMap<Resource, String> = HashMap::new();
        let mut all_users: Vec<String> = Vec::new();

        for (i, op) in kernel.circuit().iter().enumerate() {
            let node = format!("n{}", i);
            let _ = writeln!(dot, "  {} [label=\"{}\"];", node, op.to_qasm());

            match resources(op) {
                Some(list) => {
                    for r in list {
                        let from = last_user
                            .insert(r, node.clone())
                            .unwrap_or_else(|| "SOURCE".to_string());
                        let _ = writeln!(dot, "  {} -> {} [label=\"{}\"];", from, node, r);
                    }
                }
                None => {
                    for from in &all_users {
                        let _ = writeln!(dot, "  {} -> {};", from, node);
                    }
                    for v in last_user.values_mut() {
                        *v = node.clone();
                    }
                }
            }
            all_users.push(node);
        }

        let mut tails: Vec<&String> = last_user.values().collect();
        tails.sort();
        tails.dedup();
        for from in tails {
            let _ = writeln!(dot, "  {} -> SINK;", from);
        }
        dot.push_str("}\n");
        dot
    }

    fn scheduled_dot(&self, kernel: &Kernel) -> String {
        let mut dot = String::new();
        let _ = writeln!(dot, "digraph \"{}{}\" {{", kernel.name(), self.kind);
        let _ = writeln!(dot, "  rankdir=TB;");

        let mut by_cycle: Vec<(Cycle, Vec<(usize, &Operation)>)> = Vec::new();
        for (i, op) in kernel.circuit().iter().enumerate() {
            let cycle = op.cycle().unwrap_or(0);
            if let Some((c, ops)) = by_cycle.last_mut() {
                if *c == cycle {
                    ops.push((i, op));
                    continue;
                }
            }
            by_cycle.push((cycle, vec![(i, op)]));
        }

        for (cycle, ops) in &by_cycle {
            let _ = writeln!(dot, "  {{ rank=same; c{} [shape=plaintext];", cycle);
            for (i, op) in ops {
                let _ = writeln!(dot, "    n{} [label=\"{}\"];", i, op.to_qasm());
            }
            dot.push_str("  }\n");
        }
        for pair in by_cycle.windows(2) {
            let _ = writeln!(dot, "  c{} -> c{} [style=invis];", pair[0].0, pair[1].0);
        }
        dot.push_str("}\n");
        dot
    }
}

impl Scheduler for ListScheduler {
    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    fn schedule(&self, kernel: &mut Kernel, platform: &Platform) -> QpcResult<ScheduleDiagnostics> {
        platform.validate()?;
        let dependency_dot = Self::dependency_dot(kernel);

        let cycles = match self.kind {
            SchedulerKind::Asap => Self::asap_cycles(kernel.circuit(), platform.cycle_time),
            SchedulerKind::Alap => Self::alap_cycles(kernel.circuit(), platform.cycle_time),
        };

        let circuit = kernel.circuit_mut();
        for (op, cycle) in circuit.iter_mut().zip(cycles) {
            op.set_cycle(cycle);
        }
        circuit.sort_by_key(|op| op.cycle());

        log::debug!(
            "{} scheduled kernel '{}' ({} operations)",
            self.kind,
            kernel.name(),
            kernel.len()
        );

        Ok(ScheduleDiagnostics {
            dependency_dot,
            scheduled_dot: self.scheduled_dot(kernel),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qpc_core::{ErrorKind, KernelBuilder};

    fn cycles_of(kernel: &Kernel) -> Vec<(String, Cycle)> {
        kernel
            .circuit()
            .iter()
            .map(|op| (op.to_qasm(), op.cycle().unwrap()))
            .collect()
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("ASAP".parse::<SchedulerKind>().unwrap(), SchedulerKind::Asap);
        assert_eq!("ALAP".parse::<SchedulerKind>().unwrap(), SchedulerKind::Alap);
        let err = "asap".parse::<SchedulerKind>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(err, QpcError::UnknownOption { .. }));
    }

    #[test]
    fn test_asap_parallel_and_chain() {
        let platform = Platform::qx(3);
        let mut kernel = KernelBuilder::new("k", &platform)
            .x(0)
            .x(1)
            .cnot(0, 1)
            .y(2)
            .build();

        ListScheduler::asap().schedule(&mut kernel, &platform).unwrap();

        assert_eq!(
            cycles_of(&kernel),
            vec![
                ("x q[0]".to_string(), 1),
                ("x q[1]".to_string(), 1),
                ("y q[2]".to_string(), 1),
                ("cnot q[0],q[1]".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_alap_pushes_independent_work_late() {
        let platform = Platform::qx(3);
        let mut kernel = KernelBuilder::new("k", &platform)
            .x(0)
            .cnot(0, 1)
            .y(2)
            .build();

        ListScheduler::alap().schedule(&mut kernel, &platform).unwrap();

        assert_eq!(
            cycles_of(&kernel),
            vec![
                ("x q[0]".to_string(), 1),
                ("cnot q[0],q[1]".to_string(), 2),
                ("y q[2]".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_durations_in_cycles() {
        let platform = Platform::surface7();
        let mut kernel = KernelBuilder::new("k", &platform)
            .measure(0)
            .x(0)
            .build();

        ListScheduler::asap().schedule(&mut kernel, &platform).unwrap();
        // measure takes 300 ns = 15 cycles of 20 ns
        assert_eq!(kernel.circuit()[1].cycle(), Some(16));
    }

    #[test]
    fn test_classical_registers_separate_from_qubits() {
        let platform = Platform::qx(2);
        let mut kernel = KernelBuilder::new("k", &platform)
            .x(0)
            .classical("add", &[0])
            .build();

        ListScheduler::asap().schedule(&mut kernel, &platform).unwrap();
        assert!(kernel.circuit().iter().all(|op| op.cycle() == Some(1)));
    }

    #[test]
    fn test_wait_without_operands_is_barrier() {
        let platform = Platform::qx(2);
        let mut kernel = KernelBuilder::new("k", &platform)
            .x(0)
            .wait(&[], 40)
            .x(1)
            .build();

        ListScheduler::asap().schedule(&mut kernel, &platform).unwrap();
        let x1 = kernel
            .circuit()
            .iter()
            .find(|op| op.to_qasm() == "x q[1]")
            .unwrap();
        assert_eq!(x1.cycle(), Some(4));
    }

    #[test]
    fn test_diagnostics() {
        let platform = Platform::qx(2);
        let mut kernel = KernelBuilder::new("bell", &platform).h(0).cnot(0, 1).build();

        let diag = ListScheduler::alap().schedule(&mut kernel, &platform).unwrap();

        assert!(diag.dependency_dot.starts_with("digraph \"bell\""));
        assert!(diag.dependency_dot.contains("n0 -> n1 [label=\"q0\"]"));
        assert!(diag.dependency_dot.contains("SOURCE -> n1 [label=\"q1\"]"));
        assert!(diag.scheduled_dot.starts_with("digraph \"bellALAP\""));
        assert!(diag.scheduled_dot.contains("c1 -> c2"));
    }

    #[test]
    fn test_empty_kernel() {
        let platform = Platform::qx(1);
        let mut kernel = Kernel::new("empty");
        let diag = ListScheduler::asap().schedule(&mut kernel, &platform).unwrap();
        assert!(kernel.is_empty());
        assert!(diag.dependency_dot.ends_with("}\n"));
    }
}
