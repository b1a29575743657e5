//! Cycle bundler for QPC
//!
//! Gantree: L3_Scheduling → Bundler
//!
//! Turns a circuit whose operations carry non-decreasing cycles into
//! contiguous time bundles in one forward pass.

use crate::bundle::Bundle;
use qpc_core::{duration_in_cycles, DurationNs, Operation, QpcError, QpcResult};

/// Cycle bundler
/// Gantree: Bundler // 번들러
pub struct Bundler;

impl Bundler {
    // ========================================================================
    // Bundling
    // ========================================================================

    /// Group a scheduled circuit into bundles
    /// Gantree: bundle(circuit,cycle_time) -> Result<Vec<Bundle>> // 번들링
    ///
    /// Wait and dummy operations are dropped; every other operation becomes
    /// its own section of the bundle for its cycle. The circuit must be
    /// ordered by cycle.
    pub fn bundle(circuit: &[Operation], cycle_time: DurationNs) -> QpcResult<Vec<Bundle<'_>>> {
        if cycle_time == 0 {
            return Err(QpcError::Configuration(
                "cycle time must be positive for bundling".into(),
            ));
        }

        let mut bundles = Vec::new();
        let mut current_cycle = 0;
        let mut current = Bundle::new(current_cycle);

        for op in circuit.iter().filter(|op| !op.kind().is_scheduling_artifact()) {
            let cycle = op
                .cycle()
                .ok_or_else(|| QpcError::Unscheduled(op.name().to_string()))?;

            if cycle < current_cycle {
                log::error!(
                    "bundler: '{}' at cycle {} follows cycle {}",
                    op.name(),
                    cycle,
                    current_cycle
                );
                return Err(QpcError::OrderingViolation {
                    operation: op.to_qasm(),
                    cycle,
                    current: current_cycle,
                });
            }

            if cycle > current_cycle {
                let finished = std::mem::replace(&mut current, Bundle::new(cycle));
                if !finished.is_empty() {
                    bundles.push(finished);
                }
                current_cycle = cycle;
            }

            current.push_section(op, duration_in_cycles(op.duration(), cycle_time));
        }

        if !current.is_empty() {
            bundles.push(current);
        }

        log::debug!(
            "bundler: {} bundles, depth {}",
            bundles.len(),
            Self::depth(&bundles)
        );
        Ok(bundles)
    }

    // ========================================================================
    // Analysis
    // ========================================================================

    /// Cycles from the first bundle start to the end of the last bundle
    /// Gantree: depth(bundles) -> usize // 회로 깊이
    pub fn depth(bundles: &[Bundle<'_>]) -> usize {
        match (bundles.first(), bundles.last()) {
            (Some(first), Some(last)) => last.end_cycle() - first.start_cycle,
            _ => 0,
        }
    }

    /// Operation count over all bundles
    pub fn operation_count(bundles: &[Bundle<'_>]) -> usize {
        bundles.iter().map(Bundle::operation_count).sum()
    }

    /// Average number of operations started per bundle
    pub fn average_parallelism(bundles: &[Bundle<'_>]) -> f64 {
        if bundles.is_empty() {
            return 0.0;
        }
        Self::operation_count(bundles) as f64 / bundles.len() as f64
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qpc_core::ErrorKind;

    fn scheduled(name: &str, qubit: usize, duration: DurationNs, cycle: usize) -> Operation {
        let mut op = Operation::quantum(name, &[qubit], duration);
        op.set_cycle(cycle);
        op
    }

    #[test]
    fn test_bundle_groups_by_cycle() {
        let circuit = vec![
            scheduled("x", 0, 1, 0),
            scheduled("y", 1, 1, 0),
            scheduled("z", 0, 2, 1),
            scheduled("h", 1, 1, 3),
        ];
        let bundles = Bundler::bundle(&circuit, 1).unwrap();

        let starts: Vec<usize> = bundles.iter().map(|b| b.start_cycle).collect();
        assert_eq!(starts, vec![0, 1, 3]);
        assert_eq!(bundles[0].sections.len(), 2);
        assert_eq!(bundles[1].duration_in_cycles, 2);
        assert_eq!(Bundler::depth(&bundles), 4);
        assert_relative_eq!(Bundler::average_parallelism(&bundles), 4.0 / 3.0);
    }

    #[test]
    fn test_bundle_ordering_violation() {
        let circuit = vec![scheduled("x", 0, 1, 2), scheduled("y", 0, 1, 1)];
        let err = Bundler::bundle(&circuit, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OrderingViolation);
        assert!(matches!(
            err,
            QpcError::OrderingViolation {
                cycle: 1,
                current: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_bundle_unscheduled_operation() {
        let circuit = vec![Operation::quantum("x", &[0], 20)];
        let err = Bundler::bundle(&circuit, 20).unwrap_err();
        assert_eq!(err, QpcError::Unscheduled("x".into()));
    }

    #[test]
    fn test_bundle_skips_waits_and_dummies() {
        let mut wait = Operation::wait(&[0], 40);
        wait.set_cycle(1);
        let mut source = Operation::dummy("SOURCE");
        source.set_cycle(0);

        let circuit = vec![source, scheduled("x", 0, 20, 1), wait, scheduled("y", 0, 20, 3)];
        let bundles = Bundler::bundle(&circuit, 20).unwrap();

        assert_eq!(bundles.len(), 2);
        assert_eq!(Bundler::operation_count(&bundles), 2);
    }

    #[test]
    fn test_bundle_rounds_duration_up() {
        let circuit = vec![scheduled("measure", 0, 300, 1), scheduled("x", 1, 10, 1)];
        let bundles = Bundler::bundle(&circuit, 20).unwrap();
        assert_eq!(bundles[0].duration_in_cycles, 15);
        assert_eq!(Bundler::depth(&bundles), 15);
    }

    #[test]
    fn test_bundle_empty_and_zero_cycle_time() {
        assert!(Bundler::bundle(&[], 20).unwrap().is_empty());
        assert_eq!(Bundler::depth(&[]), 0);

        let circuit = vec![scheduled("x", 0, 20, 0)];
        assert!(Bundler::bundle(&circuit, 0).unwrap_err().is_configuration_error());
    }
}
