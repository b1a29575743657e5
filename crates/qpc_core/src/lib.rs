//! # QPC Core
//!
//! Operations, kernels and programs for the Quantum Program Compiler.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qpc_core // L0+L1+L2: Foundation + Kernel + Program
//!     L0_Foundation // 기반 타입/에러/플랫폼
//!         CoreTypes // 핵심 타입
//!         Errors // 에러 타입
//!         Platform // 플랫폼, 백엔드 종류
//!     L1_Kernel // 커널 구조
//!         Operation // 연산
//!         Kernel // 커널, 마커 커널
//!         KernelBuilder // 빌더 패턴
//!     L2_Program // 프로그램
//!         Program // 커널 목록, 제어 흐름 변환
//!         ConstructCounter // 구조 카운터
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qpc_core::prelude::*;
//!
//! let platform = Platform::surface7();
//! let mut program = Program::new("bell", platform.clone(), 2, 0).unwrap();
//!
//! let kernel = KernelBuilder::new("entangle", &platform)
//!     .prepz(0)
//!     .h(0)
//!     .cnot(0, 1)
//!     .measure(1)
//!     .build();
//!
//! program.add(kernel).unwrap();
//! println!("{}", program.qasm());
//! ```
//!
//! ## Control Flow
//!
//! ```rust
//! use qpc_core::prelude::*;
//!
//! let platform = Platform::qx(2);
//! let counter = ConstructCounter::new();
//! let mut program = Program::with_counter("loop", platform.clone(), 2, 2, counter).unwrap();
//! let body = KernelBuilder::new("body", &platform).x(0).build();
//!
//! program.add_for(body, 10).unwrap();
//!
//! let names: Vec<&str> = program.kernels().iter().map(|k| k.name()).collect();
//! assert_eq!(names, ["body_for0_start", "body", "body_for0_end"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Platform description (Gantree: L0_Foundation → Platform)
pub mod platform;

/// Operations (Gantree: L1_Kernel → Operation)
pub mod operation;

/// Kernels (Gantree: L1_Kernel → Kernel)
pub mod kernel;

/// Kernel builder (Gantree: L1_Kernel → KernelBuilder)
pub mod builder;

/// Programs and control-flow lowering (Gantree: L2_Program → Program)
pub mod program;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::KernelBuilder;
pub use error::{ErrorKind, QpcError, QpcResult};
pub use kernel::{Kernel, KernelKind};
pub use operation::{Operation, OperationKind};
pub use platform::{BackendKind, Platform};
pub use program::{qasm_header, Body, ConstructCounter, Program};
pub use types::{duration_in_cycles, Condition, CregId, Cycle, DurationNs, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qpc_core::prelude::*;
    //! ```

    pub use crate::builder::KernelBuilder;
    pub use crate::error::{ErrorKind, QpcError, QpcResult};
    pub use crate::kernel::{Kernel, KernelKind};
    pub use crate::operation::{Operation, OperationKind};
    pub use crate::platform::{BackendKind, Platform};
    pub use crate::program::{Body, ConstructCounter, Program};
    pub use crate::types::{Condition, CregId, Cycle, DurationNs, QubitId};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_nested_constructs_over_subprograms() {
        let platform = Platform::surface7();
        let counter = ConstructCounter::new();

        let mut inner = Program::with_counter("inner", platform.clone(), 3, 2, counter.clone())
            .unwrap();
        let then_k = KernelBuilder::new("then", &platform).x(0).build();
        let else_k = KernelBuilder::new("else", &platform).y(0).build();
        inner
            .add_if_else(then_k, else_k, Condition::new("==", [0, 1]))
            .unwrap();

        let mut outer = Program::with_counter("outer", platform.clone(), 3, 2, counter).unwrap();
        outer
            .add_do_while(inner, Condition::new("<", [0, 1]))
            .unwrap();

        let names: Vec<&str> = outer.kernels().iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            [
                "inner_do_while1_start",
                "then_if0",
                "then",
                "then_if0_end",
                "else_else0",
                "else",
                "else_else0_end",
                "inner_do_while1",
            ]
        );
    }

    #[test]
    fn test_markers_never_hold_operations() {
        let platform = Platform::qx(3);
        let mut program = Program::new("p", platform.clone(), 3, 2).unwrap();
        let body = KernelBuilder::new("b", &platform).h(0).cnot(0, 1).build();

        program.add_for(body.clone(), 3).unwrap();
        program
            .add_if(
                Kernel::from_operations("c", body.circuit().to_vec()),
                Condition::new("!", [1]),
            )
            .unwrap();

        for kernel in program.kernels() {
            if kernel.kind().is_marker() {
                assert!(kernel.is_empty(), "{} holds operations", kernel.name());
            } else {
                assert_eq!(kernel.len(), 2);
            }
        }
    }

    #[test]
    fn test_error_kinds_through_prelude() {
        let platform = Platform::qx(2);
        let mut program = Program::new("p", platform, 2, 0).unwrap();
        let bad = Kernel::from_operations("k", vec![Operation::classical("add", &[0], 20)]);

        let err = program.add(bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OperandRange);
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_program_listing_includes_markers() {
        let platform = Platform::qx(2);
        let mut program =
            Program::with_counter("p", platform.clone(), 2, 2, ConstructCounter::new()).unwrap();
        let k = KernelBuilder::new("k", &platform).x(1).build();
        program.add_for(k, 4).unwrap();

        let qasm = program.qasm();
        assert!(qasm.contains(".k_for0_start\n    # FOR_START 4\n"));
        assert!(qasm.contains(".k(4)\n    x q[1]\n"));
        assert!(qasm.contains(".k_for0_end\n    # FOR_END\n"));
    }
}
