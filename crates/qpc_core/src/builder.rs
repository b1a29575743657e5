//! Kernel builder for QPC
//!
//! Gantree: L1_Kernel → KernelBuilder
//!
//! Fluent builder that takes instruction durations from the platform.

use crate::kernel::Kernel;
use crate::operation::Operation;
use crate::platform::Platform;
use crate::types::{CregId, DurationNs, QubitId};

/// Fluent kernel builder (consuming self pattern)
/// Gantree: KernelBuilder // 빌더 패턴
pub struct KernelBuilder<'p> {
    /// Kernel being built
    kernel: Kernel,

    /// Source of default durations
    platform: &'p Platform,
}

impl<'p> KernelBuilder<'p> {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new kernel builder
    /// Gantree: new(name, platform) -> Self // 생성자
    pub fn new(name: impl Into<String>, platform: &'p Platform) -> Self {
        Self {
            kernel: Kernel::new(name),
            platform,
        }
    }

    // ========================================================================
    // Generic
    // ========================================================================

    /// Add any quantum gate by name
    pub fn gate(mut self, name: &str, qubits: &[QubitId]) -> Self {
        let duration = self.platform.duration_of(name);
        self.kernel.add(Operation::quantum(name, qubits, duration));
        self
    }

    /// Add a classical instruction
    pub fn classical(mut self, name: &str, registers: &[CregId]) -> Self {
        let duration = self.platform.duration_of(name);
        self.kernel
            .add(Operation::classical(name, registers, duration));
        self
    }

    /// Add an explicit wait on qubits
    pub fn wait(mut self, qubits: &[QubitId], duration: DurationNs) -> Self {
        self.kernel.add(Operation::wait(qubits, duration));
        self
    }

    fn rotation(mut self, name: &str, qubit: QubitId, angle: f64) -> Self {
        let duration = self.platform.duration_of(name);
        self.kernel
            .add(Operation::rotation(name, qubit, angle, duration));
        self
    }

    // ========================================================================
    // Single-Qubit Gates
    // ========================================================================

    /// Prepare in |0>
    pub fn prepz(self, qubit: QubitId) -> Self {
        self.gate("prepz", &[qubit])
    }

    /// Identity
    pub fn identity(self, qubit: QubitId) -> Self {
        self.gate("i", &[qubit])
    }

    /// Hadamard
    pub fn h(self, qubit: QubitId) -> Self {
        self.gate("h", &[qubit])
    }

    /// Pauli-X
    pub fn x(self, qubit: QubitId) -> Self {
        self.gate("x", &[qubit])
    }

    /// Pauli-Y
    pub fn y(self, qubit: QubitId) -> Self {
        self.gate("y", &[qubit])
    }

    /// Pauli-Z
    pub fn z(self, qubit: QubitId) -> Self {
        self.gate("z", &[qubit])
    }

    /// Phase gate
    pub fn s(self, qubit: QubitId) -> Self {
        self.gate("s", &[qubit])
    }

    /// Inverse phase gate
    pub fn sdag(self, qubit: QubitId) -> Self {
        self.gate("sdag", &[qubit])
    }

    /// T gate
    pub fn t(self, qubit: QubitId) -> Self {
        self.gate("t", &[qubit])
    }

    /// Inverse T gate
    pub fn tdag(self, qubit: QubitId) -> Self {
        self.gate("tdag", &[qubit])
    }

    /// Rotation around X
    pub fn rx(self, qubit: QubitId, angle: f64) -> Self {
        self.rotation("rx", qubit, angle)
    }

    /// Rotation around Y
    pub fn ry(self, qubit: QubitId, angle: f64) -> Self {
        self.rotation("ry", qubit, angle)
    }

    /// Rotation around Z
    pub fn rz(self, qubit: QubitId, angle: f64) -> Self {
        self.rotation("rz", qubit, angle)
    }

    /// Measurement
    pub fn measure(self, qubit: QubitId) -> Self {
        self.gate("measure", &[qubit])
    }

    // ========================================================================
    // Multi-Qubit Gates
    // ========================================================================

    /// Controlled-NOT
    pub fn cnot(self, control: QubitId, target: QubitId) -> Self {
        self.gate("cnot", &[control, target])
    }

    /// Controlled-Z
    pub fn cz(self, control: QubitId, target: QubitId) -> Self {
        self.gate("cz", &[control, target])
    }

    /// Swap
    pub fn swap(self, a: QubitId, b: QubitId) -> Self {
        self.gate("swap", &[a, b])
    }

    /// Toffoli (decomposed by the compiler if requested)
    pub fn toffoli(self, c1: QubitId, c2: QubitId, target: QubitId) -> Self {
        self.gate("toffoli", &[c1, c2, target])
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build and return the kernel
    pub fn build(self) -> Kernel {
        self.kernel
    }

    /// Reference to the kernel under construction
    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }
}

// ============================================================================
// Tests
// ============================================================================
