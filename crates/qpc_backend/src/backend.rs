//! Backend contract for QPC
//!
//! Gantree: L4_Backend → BackendTrait
//!
//! A backend turns the compiled kernels of a program into target
//! instructions. Kernel-list backends see the kernels (markers included);
//! fused backends see one circuit with for bodies unrolled.

use qpc_core::{Kernel, Operation, Platform, QpcError, QpcResult};
use qpc_schedule::SchedulerKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// Backend Input
// ============================================================================

/// Input form a backend consumes
/// Gantree: InputForm // 입력 형태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputForm {
    /// Per-kernel list, control-flow markers included
    KernelList,
    /// Single circuit, kernels concatenated
    Fused,
}

impl fmt::Display for InputForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputForm::KernelList => write!(f, "kernel list"),
            InputForm::Fused => write!(f, "fused circuit"),
        }
    }
}

/// What a backend is handed at dispatch
#[derive(Debug, Clone, Copy)]
pub enum BackendInput<'a> {
    /// Kernels in program order
    Kernels(&'a [Kernel]),
    /// Fused circuit
    Fused(&'a [Operation]),
}

impl BackendInput<'_> {
    /// Form of this input
    pub fn form(&self) -> InputForm {
        match self {
            BackendInput::Kernels(_) => InputForm::KernelList,
            BackendInput::Fused(_) => InputForm::Fused,
        }
    }
}

/// Concatenate every kernel's circuit, repeated per its iteration count
/// Gantree: fuse_kernels(kernels) -> Vec<Operation> // 커널 융합
pub fn fuse_kernels(kernels: &[Kernel]) -> Vec<Operation> {
    let capacity = kernels.iter().map(|k| k.len() * k.iterations()).sum();
    let mut fused = Vec::with_capacity(capacity);
    for kernel in kernels {
        for _ in 0..kernel.iterations() {
            fused.extend_from_slice(kernel.circuit());
        }
    }
    fused
}

// ============================================================================
// Backend Trait
// ============================================================================

/// Code-generation backend
/// Gantree: Backend // 백엔드 인터페이스
pub trait Backend: Send {
    /// Backend name
    fn name(&self) -> &str;

    /// Input form this backend expects
    fn input_form(&self) -> InputForm;

    /// File extension of the instruction artifact
    fn instruction_extension(&self) -> &'static str;

    /// Generate instructions for a program
    /// Gantree: compile(name,input,platform) -> Result // 코드 생성
    fn compile(
        &mut self,
        program_name: &str,
        input: BackendInput<'_>,
        platform: &Platform,
    ) -> QpcResult<()>;

    /// Instructions produced by the last compile
    fn instructions(&self) -> &str;

    /// Scheduling direction for backends that reschedule their input
    fn set_scheduler(&mut self, _kind: SchedulerKind) {}

    /// Timing traces produced by the last compile, if the backend has any
    fn traces(&self) -> Option<&str> {
        None
    }

    /// Write the instructions to `path`
    fn write_instructions(&self, path: &Path) -> QpcResult<()> {
        log::info!("writing {} instructions to '{}'", self.name(), path.display());
        fs::write(path, self.instructions())?;
        Ok(())
    }

    /// Write the timing traces to `path` (empty when there are none)
    fn write_traces(&self, path: &Path) -> QpcResult<()> {
        log::info!("writing {} traces to '{}'", self.name(), path.display());
        fs::write(path, self.traces().unwrap_or_default())?;
        Ok(())
    }
}

/// Reject inputs a backend cannot take
pub(crate) fn expect_form(backend: &str, expected: InputForm, input: &BackendInput<'_>) -> QpcResult<()> {
    if input.form() != expected {
        return Err(QpcError::Backend(format!(
            "{} expects a {} but was given a {}",
            backend,
            expected,
            input.form()
        )));
    }
    Ok(())
}

/// Reject operations on more than two qubits (undecomposed Toffoli etc.)
pub(crate) fn check_arity(backend: &str, op: &Operation) -> QpcResult<()> {
    if op.is_quantum() && op.operands().len() > 2 {
        return Err(QpcError::Backend(format!(
            "instruction '{}' with {} operands is not supported by {}",
            op.name(),
            op.operands().len(),
            backend
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
