//! # QPC Backend
//!
//! Backend contract, registry and reference code generators for the
//! Quantum Program Compiler.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qpc_backend // L4: Backend
//!     L4_Backend // 백엔드
//!         BackendTrait // 백엔드 인터페이스, 커널 융합
//!         BackendRegistry // 레지스트리, 백엔드 선택
//!         MicrocodeBackend // 마이크로코드 (fused 입력)
//!         EqasmBackend // eQASM (커널 목록 입력)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qpc_backend::prelude::*;
//! use qpc_core::{BackendKind, KernelBuilder, Platform, Program};
//!
//! let platform = Platform::surface7();
//! let mut program = Program::new("demo", platform.clone(), 2, 0).unwrap();
//! program
//!     .add(KernelBuilder::new("k", &platform).h(0).cnot(0, 1).build())
//!     .unwrap();
//!
//! let registry = BackendRegistry::with_defaults();
//! if let BackendSelection::Ready(mut backend) = registry.select(BackendKind::CcLight) {
//!     backend
//!         .compile("demo", BackendInput::Kernels(program.kernels()), &platform)
//!         .unwrap();
//!     println!("{}", backend.instructions());
//! }
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Backend contract and kernel fusion (Gantree: L4_Backend → BackendTrait)
pub mod backend;

/// Backend registry (Gantree: L4_Backend → BackendRegistry)
pub mod registry;

/// Microcode backend (Gantree: L4_Backend → MicrocodeBackend)
pub mod microcode;

/// eQASM backends (Gantree: L4_Backend → EqasmBackend)
pub mod eqasm;

// ============================================================================
// Re-exports
// ============================================================================

pub use backend::{fuse_kernels, Backend, BackendInput, InputForm};
pub use eqasm::{EqasmBackend, EqasmFlavor};
pub use microcode::MicrocodeBackend;
pub use registry::{BackendFactory, BackendRegistry, BackendSelection};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qpc_backend::prelude::*;
    //! ```

    pub use crate::backend::{fuse_kernels, Backend, BackendInput, InputForm};
    pub use crate::eqasm::{EqasmBackend, EqasmFlavor};
    pub use crate::microcode::MicrocodeBackend;
    pub use crate::registry::{BackendRegistry, BackendSelection};
}

// ============================================================================
// Integration Tests
// ============================================================================
