//! Core types for QPC
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases and small value types shared across the compiler.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Classical register identifier (0-indexed)
pub type CregId = usize;

/// Hardware cycle number
/// Gantree: Cycle // pub type Cycle = usize
pub type Cycle = usize;

/// Device time in nanoseconds
pub type DurationNs = u64;

/// Convert a duration into whole cycles, rounding up
#[inline]
pub fn duration_in_cycles(duration: DurationNs, cycle_time: DurationNs) -> usize {
    debug_assert!(cycle_time > 0);
    duration.div_ceil(cycle_time) as usize
}

// ============================================================================
// Condition
// ============================================================================

/// Guard condition carried by control-flow marker kernels.
///
/// The core never evaluates a condition; it only moves it from the
/// construct into the marker kernels so a backend can emit the branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    operator: String,
    operands: Vec<CregId>,
}

impl Condition {
    /// Create a condition from an operator name and register operands
    pub fn new(operator: impl Into<String>, operands: impl Into<Vec<CregId>>) -> Self {
        Self {
            operator: operator.into(),
            operands: operands.into(),
        }
    }

    /// Operator name (e.g. "==", "!=", "<")
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Register operands
    pub fn operands(&self) -> &[CregId] {
        &self.operands
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operands.as_slice() {
            [lhs, rhs] => write!(f, "r[{}] {} r[{}]", lhs, self.operator, rhs),
            [single] => write!(f, "{} r[{}]", self.operator, single),
            _ => {
                let regs: Vec<String> = self.operands.iter().map(|r| format!("r[{}]", r)).collect();
                write!(f, "{}({})", self.operator, regs.join(","))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_in_cycles() {
        assert_eq!(duration_in_cycles(20, 20), 1);
        assert_eq!(duration_in_cycles(21, 20), 2);
        assert_eq!(duration_in_cycles(0, 20), 0);
        assert_eq!(duration_in_cycles(300, 20), 15);
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(Condition::new("==", [0, 1]).to_string(), "r[0] == r[1]");
        assert_eq!(Condition::new("!", [2]).to_string(), "! r[2]");
        assert_eq!(Condition::new("true", Vec::new()).to_string(), "true()");
    }
}
