//! Time bundle for QPC
//!
//! Gantree: L3_Scheduling → Bundle
//!
//! A bundle groups the operations that start in the same cycle. It borrows
//! the operations from the kernel circuit it was built from.

use qpc_core::{Cycle, Operation};
use std::fmt;

/// Operations starting in the same cycle
/// Gantree: Bundle // 번들
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle<'a> {
    /// Cycle in which every operation of the bundle starts
    /// Gantree: start_cycle: Cycle // 시작 사이클
    pub start_cycle: Cycle,

    /// Longest contained operation, in whole cycles
    /// Gantree: duration_in_cycles: usize // 사이클 길이
    pub duration_in_cycles: usize,

    /// Parallel sections, one operation each as built by the bundler
    pub sections: Vec<Vec<&'a Operation>>,
}

impl<'a> Bundle<'a> {
    /// Create an empty bundle starting at `start_cycle`
    pub fn new(start_cycle: Cycle) -> Self {
        Self {
            start_cycle,
            duration_in_cycles: 0,
            sections: Vec::new(),
        }
    }

    /// Append an operation as its own section
    pub fn push_section(&mut self, op: &'a Operation, cycles: usize) {
        self.sections.push(vec![op]);
        self.duration_in_cycles = self.duration_in_cycles.max(cycles);
    }

    /// All operations, section by section
    pub fn operations(&self) -> impl Iterator<Item = &'a Operation> + '_ {
        self.sections.iter().flatten().copied()
    }

    /// Number of operations across all sections
    pub fn operation_count(&self) -> usize {
        self.sections.iter().map(Vec::len).sum()
    }

    /// Check if no operation was added
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// First cycle after the bundle
    pub fn end_cycle(&self) -> Cycle {
        self.start_cycle + self.duration_in_cycles
    }

    /// Bundle line without indentation: `{ a | b }` or a bare operation
    /// Gantree: to_qasm(&self) -> String // 번들 출력
    pub fn to_qasm(&self) -> String {
        let ops: Vec<String> = self.operations().map(Operation::to_qasm).collect();
        if ops.len() > 1 {
            format!("{{ {} }}", ops.join(" | "))
        } else {
            ops.concat()
        }
    }
}

impl fmt::Display for Bundle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}+{}] {}",
            self.start_cycle,
            self.duration_in_cycles,
            self.to_qasm()
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
    fn test_push_tracks_longest_operation() {
        let a = Operation::quantum("x", &[0], 20);
        let b = Operation::quantum("measure", &[1], 300);
        let mut bundle = Bundle::new(4);
        bundle.push_section(&a, 1);
        bundle.push_section(&b, 15);
        bundle.push_section(&a, 1);

        assert_eq!(bundle.duration_in_cycles, 15);
        assert_eq!(bundle.sections.len(), 3);
        assert_eq!(bundle.operation_count(), 3);
        assert_eq!(bundle.end_cycle(), 19);
    }

    #[test]
    fn test_bundle_qasm() {
        let a = Operation::quantum("x", &[0], 20);
        let b = Operation::quantum("cz", &[1, 2], 40);

        let mut single = Bundle::new(1);
        single.push_section(&a, 1);
        assert_eq!(single.to_qasm(), "x q[0]");

        let mut pair = Bundle::new(1);
        pair.push_section(&a, 1);
        pair.push_section(&b, 2);
        assert_eq!(pair.to_qasm(), "{ x q[0] | cz q[1],q[2] }");
    }

    #[test]
    fn test_bundle_borrows_without_copy() {
        let ops = vec![Operation::quantum("h", &[0], 20)];
        let mut bundle = Bundle::new(0);
        bundle.push_section(&ops[0], 1);
        assert!(std::ptr::eq(bundle.sections[0][0], &ops[0]));
    }
}
