//! Toffoli decomposition for QPC
//!
//! Gantree: L5_Engine → ToffoliDecomposition
//!
//! Expands three-qubit `toffoli` gates into CNOT, T/T† and H gates so that
//! backends limited to two-qubit instructions can take them.

use qpc_core::{Kernel, Operation, Platform, QpcError, QpcResult, QubitId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decomposition strategy
/// Gantree: DecompositionStrategy // 분해 전략
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DecompositionStrategy {
    /// Leave Toffoli gates in place
    #[default]
    No,
    /// T-depth 3 circuit with seven CNOTs (Amy, Maslov et al.)
    AmyMaslov,
    /// Textbook circuit with six CNOTs (Nielsen & Chuang)
    NielsenChuang,
}

impl DecompositionStrategy {
    /// Option value
    pub fn as_str(&self) -> &'static str {
        match self {
            DecompositionStrategy::No => "no",
            DecompositionStrategy::AmyMaslov => "AM",
            DecompositionStrategy::NielsenChuang => "NC",
        }
    }

    /// Gate sequence for `toffoli(a, b, c)` with `c` the target
    fn sequence(&self, a: QubitId, b: QubitId, c: QubitId) -> Vec<(&'static str, Vec<QubitId>)> {
        match self {
            DecompositionStrategy::No => vec![("toffoli", vec![a, b, c])],
            DecompositionStrategy::AmyMaslov => vec![
                ("h", vec![c]),
                ("t", vec![a]),
                ("t", vec![b]),
                ("t", vec![c]),
                ("cnot", vec![b, a]),
                ("cnot", vec![c, b]),
                ("cnot", vec![a, c]),
                ("tdag", vec![b]),
                ("cnot", vec![a, b]),
                ("tdag", vec![a]),
                ("tdag", vec![b]),
                ("t", vec![c]),
                ("cnot", vec![c, b]),
                ("cnot", vec![a, c]),
                ("cnot", vec![b, a]),
                ("h", vec![c]),
            ],
            DecompositionStrategy::NielsenChuang => vec![
                ("h", vec![c]),
                ("cnot", vec![b, c]),
                ("tdag", vec![c]),
                ("cnot", vec![a, c]),
                ("t", vec![c]),
                ("cnot", vec![b, c]),
                ("tdag", vec![c]),
                ("cnot", vec![a, c]),
                ("t", vec![b]),
                ("t", vec![c]),
                ("h", vec![c]),
                ("cnot", vec![a, b]),
                ("t", vec![a]),
                ("tdag", vec![b]),
                ("cnot", vec![a, b]),
            ],
        }
    }
}

impl FromStr for DecompositionStrategy {
    type Err = QpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no" => Ok(DecompositionStrategy::No),
            "AM" => Ok(DecompositionStrategy::AmyMaslov),
            "NC" => Ok(DecompositionStrategy::NielsenChuang),
            other => Err(QpcError::UnknownOption {
                option: "decompose_toffoli".into(),
                value: other.into(),
            }),
        }
    }
}

impl fmt::Display for DecompositionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Replace every Toffoli gate of a kernel
/// Gantree: decompose_toffoli(kernel,strategy,platform) -> Result<usize> // 토폴리 분해
///
/// Returns the number of gates replaced. Gate durations come from the
/// platform.
pub fn decompose_toffoli(
    kernel: &mut Kernel,
    strategy: DecompositionStrategy,
    platform: &Platform,
) -> QpcResult<usize> {
    if strategy == DecompositionStrategy::No || kernel.kind().is_marker() {
        return Ok(0);
    }

    let mut replaced = 0;
    let mut circuit = Vec::with_capacity(kernel.len());
    for op in kernel.circuit() {
        if !op.is_quantum() || op.name() != "toffoli" {
            circuit.push(op.clone());
            continue;
        }
        let [a, b, c] = op.operands() else {
            return Err(QpcError::Configuration(format!(
                "toffoli in kernel '{}' has {} operands",
                kernel.name(),
                op.operands().len()
            )));
        };
        circuit.extend(
            strategy
                .sequence(*a, *b, *c)
                .into_iter()
                .map(|(name, qubits)| Operation::quantum(name, &qubits, platform.duration_of(name))),
        );
        replaced += 1;
    }

    if replaced > 0 {
        log::debug!(
            "decomposed {} toffoli gate(s) in kernel '{}' using {}",
            replaced,
            kernel.name(),
            strategy
        );
    }
    kernel.set_circuit(circuit);
    Ok(replaced)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qpc_core::{ErrorKind, KernelBuilder};

    fn count(kernel: &Kernel, names: &[&str]) -> usize {
        kernel
            .circuit()
            .iter()
            .filter(|op| names.contains(&op.name()))
            .count()
    }

    fn toffoli_kernel(platform: &Platform) -> Kernel {
        KernelBuilder::new("k", platform)
            .x(0)
            .toffoli(0, 1, 2)
            .measure(2)
            .build()
    }

    #[test]
    fn test_parse_strategy() {
        assert_eq!("AM".parse::<DecompositionStrategy>().unwrap(), DecompositionStrategy::AmyMaslov);
        assert_eq!("NC".parse::<DecompositionStrategy>().unwrap(), DecompositionStrategy::NielsenChuang);
        assert_eq!("no".parse::<DecompositionStrategy>().unwrap(), DecompositionStrategy::No);

        let err = "am".parse::<DecompositionStrategy>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("decompose_toffoli"));
    }

    #[test]
    fn test_amy_maslov_counts() {
        let platform = Platform::surface7();
        let mut kernel = toffoli_kernel(&platform);
        let replaced =
            decompose_toffoli(&mut kernel, DecompositionStrategy::AmyMaslov, &platform).unwrap();

        assert_eq!(replaced, 1);
        assert_eq!(count(&kernel, &["toffoli"]), 0);
        assert_eq!(count(&kernel, &["cnot"]), 7);
        assert_eq!(count(&kernel, &["t", "tdag"]), 7);
        assert_eq!(count(&kernel, &["h"]), 2);
        assert_eq!(kernel.len(), 1 + 16 + 1);
        assert_eq!(kernel.circuit()[0].name(), "x");
        assert_eq!(kernel.circuit()[17].name(), "measure");
    }

    #[test]
    fn test_nielsen_chuang_counts() {
        let platform = Platform::surface7();
        let mut kernel = toffoli_kernel(&platform);
        decompose_toffoli(&mut kernel, DecompositionStrategy::NielsenChuang, &platform).unwrap();

        assert_eq!(count(&kernel, &["cnot"]), 6);
        assert_eq!(count(&kernel, &["t", "tdag"]), 7);
        assert_eq!(count(&kernel, &["h"]), 2);
        assert!(kernel
            .circuit()
            .iter()
            .filter(|op| op.name() == "cnot")
            .all(|op| op.duration() == 40));
    }

    #[test]
    fn test_no_strategy_keeps_toffoli() {
        let platform = Platform::surface7();
        let mut kernel = toffoli_kernel(&platform);
        assert_eq!(
            decompose_toffoli(&mut kernel, DecompositionStrategy::No, &platform).unwrap(),
            0
        );
        assert_eq!(count(&kernel, &["toffoli"]), 1);
    }

    #[test]
    fn test_malformed_toffoli() {
        let platform = Platform::surface7();
        let mut kernel = Kernel::from_operations("k", vec![Operation::quantum("toffoli", &[0, 1], 20)]);
        assert!(decompose_toffoli(&mut kernel, DecompositionStrategy::NielsenChuang, &platform).is_err());
    }
}
