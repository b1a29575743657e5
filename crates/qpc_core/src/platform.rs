//! Platform description for QPC
//!
//! Gantree: L0_Foundation → Platform
//!
//! Qubit capacity, cycle time, instruction durations and the backend
//! selector of the target hardware. Reading these from a hardware
//! configuration file is left to the caller; the struct derives serde so
//! it can be built from any JSON value.

use crate::error::{QpcError, QpcResult};
use crate::types::DurationNs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Backend Kind
// ============================================================================

/// Backend family selected by the platform's `eqasm_compiler` string
/// Gantree: BackendKind // 백엔드 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// `none`: no backend pass
    None,
    /// `qx`: simulator target, no backend pass
    Qx,
    /// `qumis_compiler`: legacy microcode backend (fused circuit input)
    Qumis,
    /// `cc_light_compiler`: eQASM for CC-Light (kernel list input)
    CcLight,
    /// `eqasm_backend_cc`: eQASM for the CC (kernel list input)
    Cc,
}

impl BackendKind {
    /// Whether compile() has to dispatch to a backend
    pub fn requires_backend(&self) -> bool {
        !matches!(self, BackendKind::None | BackendKind::Qx)
    }

    /// Whether the backend consumes the per-kernel list instead of a fused circuit
    pub fn accepts_kernel_list(&self) -> bool {
        matches!(self, BackendKind::CcLight | BackendKind::Cc)
    }

    /// Configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::None => "none",
            BackendKind::Qx => "qx",
            BackendKind::Qumis => "qumis_compiler",
            BackendKind::CcLight => "cc_light_compiler",
            BackendKind::Cc => "eqasm_backend_cc",
        }
    }
}

impl FromStr for BackendKind {
    type Err = QpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err(QpcError::Configuration(
                "eqasm compiler name must be specified in the hardware configuration".into(),
            )),
            "none" => Ok(BackendKind::None),
            "qx" => Ok(BackendKind::Qx),
            "qumis_compiler" => Ok(BackendKind::Qumis),
            "cc_light_compiler" => Ok(BackendKind::CcLight),
            "eqasm_backend_cc" => Ok(BackendKind::Cc),
            other => Err(QpcError::Configuration(format!(
                "the '{}' eqasm compiler backend is not supported",
                other
            ))),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Platform
// ============================================================================

/// Target hardware description
/// Gantree: Platform // 플랫폼
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Platform name
    pub name: String,

    /// Number of qubits available
    /// Gantree: qubit_number: usize // 큐비트 용량
    pub qubit_number: usize,

    /// Cycle time in nanoseconds
    /// Gantree: cycle_time: DurationNs // 사이클 시간
    pub cycle_time: DurationNs,

    /// Backend selector string
    pub eqasm_compiler: String,

    /// Per-instruction duration overrides (ns)
    #[serde(default)]
    pub instruction_durations: HashMap<String, DurationNs>,
}

impl Platform {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a platform
    pub fn new(
        name: impl Into<String>,
        qubit_number: usize,
        cycle_time: DurationNs,
        eqasm_compiler: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            qubit_number,
            cycle_time,
            eqasm_compiler: eqasm_compiler.into(),
            instruction_durations: HashMap::new(),
        }
    }

    /// Seven-qubit transmon platform driven by the CC-Light backend
    pub fn surface7() -> Self {
        Self::new("surface7", 7, 20, "cc_light_compiler")
            .with_duration("cnot", 40)
            .with_duration("cz", 40)
            .with_duration("measure", 300)
            .with_duration("prepz", 200)
    }

    /// Single-qubit platform for the legacy microcode backend
    pub fn starmon() -> Self {
        Self::new("starmon", 1, 5, "qumis_compiler")
            .with_duration("measure", 300)
            .with_duration("prepz", 100)
    }

    /// Simulator platform without a backend pass
    pub fn qx(qubits: usize) -> Self {
        Self::new("qx_simulator", qubits, 20, "qx")
    }

    /// Set duration for one instruction
    pub fn with_duration(mut self, instruction: &str, duration: DurationNs) -> Self {
        self.instruction_durations
            .insert(instruction.to_lowercase(), duration);
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Duration of an instruction, defaulting to one cycle
    pub fn duration_of(&self, instruction: &str) -> DurationNs {
        self.instruction_durations
            .get(&instruction.to_lowercase())
            .copied()
            .unwrap_or(self.cycle_time)
    }

    /// Parse the backend selector
    pub fn backend_kind(&self) -> QpcResult<BackendKind> {
        self.eqasm_compiler.parse()
    }

    /// Check the platform is usable for compilation
    pub fn validate(&self) -> QpcResult<()> {
        if self.cycle_time == 0 {
            return Err(QpcError::Configuration(format!(
                "platform '{}' has a cycle time of 0",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Platform({}, {} qubits, {} ns/cycle, {})",
            self.name, self.qubit_number, self.cycle_time, self.eqasm_compiler
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_backend_kind_parse() {
        assert_eq!("none".parse::<BackendKind>().unwrap(), BackendKind::None);
        assert_eq!("qx".parse::<BackendKind>().unwrap(), BackendKind::Qx);
        assert_eq!(
            "qumis_compiler".parse::<BackendKind>().unwrap(),
            BackendKind::Qumis
        );
        assert_eq!(
            "eqasm_backend_cc".parse::<BackendKind>().unwrap(),
            BackendKind::Cc
        );
    }

    #[test]
    fn test_backend_kind_errors() {
        let empty = "".parse::<BackendKind>().unwrap_err();
        assert_eq!(empty.kind(), ErrorKind::Configuration);

        let unknown = "cbox".parse::<BackendKind>().unwrap_err();
        assert!(unknown.to_string().contains("cbox"));
        assert_eq!(unknown.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_backend_requirements() {
        assert!(!BackendKind::None.requires_backend());
        assert!(!BackendKind::Qx.requires_backend());
        assert!(BackendKind::Qumis.requires_backend());
        assert!(!BackendKind::Qumis.accepts_kernel_list());
        assert!(BackendKind::CcLight.accepts_kernel_list());
    }

    #[test]
    fn test_durations() {
        let platform = Platform::surface7();
        assert_eq!(platform.duration_of("cnot"), 40);
        assert_eq!(platform.duration_of("CNOT"), 40);
        assert_eq!(platform.duration_of("x"), 20);
    }

    #[test]
    fn test_platform_from_json() {
        let json = r#"{
            "name": "demo",
            "qubit_number": 2,
            "cycle_time": 10,
            "eqasm_compiler": "none"
        }"#;
        let platform: Platform = serde_json::from_str(json).unwrap();
        assert_eq!(platform.backend_kind().unwrap(), BackendKind::None);
        assert!(platform.instruction_durations.is_empty());
        assert!(platform.validate().is_ok());
    }

    #[test]
    fn test_zero_cycle_time_rejected() {
        let platform = Platform::new("broken", 1, 0, "none");
        assert!(platform.validate().is_err());
    }
}
