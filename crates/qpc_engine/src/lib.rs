//! # QPC Engine
//!
//! Compilation pipeline of the Quantum Program Compiler.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qpc_engine // L5: Engine
//!     CompileOptions // 컴파일 옵션
//!         typed fields, set()/get() option table, JSON loading
//!     PeepholeOptimizer // 핍홀 최적화
//!     ToffoliDecomposition // 토폴리 분해 (AM, NC)
//!     UniqueVersion // 산출물 버전
//!     ArtifactWriter // 산출물 작성
//!     Compiler // 파이프라인
//!         optimize → decompose → rename → preschedule → dispatch → sweep points
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qpc_engine::prelude::*;
//! use qpc_core::{KernelBuilder, Platform, Program};
//!
//! let platform = Platform::qx(2);
//! let mut program = Program::new("bell", platform.clone(), 2, 0).unwrap();
//! program
//!     .add(KernelBuilder::new("k", &platform).h(0).cnot(0, 1).build())
//!     .unwrap();
//!
//! let compiler = Compiler::new(CompileOptions::default().with_optimize(true));
//! let report = compiler.compile(&mut program).unwrap();
//! assert_eq!(report.status, CompileStatus::NoBackendRequired);
//! ```
//!
//! ## String Options
//!
//! ```rust
//! use qpc_engine::prelude::*;
//!
//! let mut options = CompileOptions::default();
//! options.set("decompose_toffoli", "NC").unwrap();
//! options.set("scheduler", "ASAP").unwrap();
//! assert!(options.validate().is_ok());
//! assert!(options.set("optimize", "maybe").is_err());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Compile options (Gantree: L5_Engine → CompileOptions)
pub mod config;

/// Peephole optimizer (Gantree: L5_Engine → PeepholeOptimizer)
pub mod optimizer;

/// Toffoli decomposition (Gantree: L5_Engine → ToffoliDecomposition)
pub mod decompose;

/// Artifact versions (Gantree: L5_Engine → UniqueVersion)
pub mod unique;

/// Artifact output (Gantree: L5_Engine → ArtifactWriter)
pub mod artifacts;

/// Compilation pipeline (Gantree: L5_Engine → Compiler)
pub mod compiler;

// ============================================================================
// Re-exports
// ============================================================================

pub use artifacts::ArtifactWriter;
pub use compiler::{CompileReport, CompileStatus, Compiler, PipelineStage};
pub use config::{CompileOptions, DEFAULT_OUTPUT_DIR, OPTION_KEYS};
pub use decompose::{decompose_toffoli, DecompositionStrategy};
pub use optimizer::{OptimizationStats, PeepholeOptimizer};
pub use unique::{bump_unique_file_version, unique_file_path};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qpc_engine::prelude::*;
    //! ```

    pub use crate::compiler::{CompileReport, CompileStatus, Compiler, PipelineStage};
    pub use crate::config::CompileOptions;
    pub use crate::decompose::DecompositionStrategy;
    pub use crate::optimizer::{OptimizationStats, PeepholeOptimizer};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qpc_backend::{Backend, BackendInput, BackendRegistry, InputForm};
    use qpc_core::{BackendKind, ErrorKind, KernelBuilder, Platform, Program, QpcError, QpcResult};
    use std::fs;

    fn options_in(dir: &tempfile::TempDir) -> CompileOptions {
        CompileOptions::default().with_output_dir(dir.path())
    }

    #[test]
    fn test_empty_program_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut program = Program::new("empty", Platform::surface7(), 2, 0).unwrap();
        let options = CompileOptions::verbose_output(dir.path()).with_unique_output(true);

        let err = Compiler::new(options).compile(&mut program).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyProgram);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unique_output_versions() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::qx(1);
        let compiler = Compiler::new(
            options_in(&dir)
                .with_unique_output(true)
                .with_qasm_files(true),
        );

        let mut names = Vec::new();
        for _ in 0..2 {
            let mut program = Program::new("rb", platform.clone(), 1, 0).unwrap();
            program
                .add(KernelBuilder::new("k", &platform).x(0).build())
                .unwrap();
            let report = compiler.compile(&mut program).unwrap();
            assert_eq!(program.name(), "rb");
            names.push(report.artifact_name);
        }

        assert_eq!(names, vec!["rb", "rb2"]);
        assert!(dir.path().join("rb.qasm").exists());
        assert!(dir.path().join("rb2.qasm").exists());
        assert_eq!(fs::read_to_string(dir.path().join("rb.unique")).unwrap(), "2");
    }

    #[test]
    fn test_fused_backend_repeats_for_body() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::starmon();
        let mut program = Program::new("loop", platform.clone(), 1, 0).unwrap();
        program
            .add(KernelBuilder::new("init", &platform).prepz(0).build())
            .unwrap();
        program
            .add_for(KernelBuilder::new("body", &platform).x(0).build(), 3)
            .unwrap();

        let report = Compiler::new(options_in(&dir)).compile(&mut program).unwrap();
        assert_eq!(report.status, CompileStatus::Compiled);

        let asm = fs::read_to_string(dir.path().join("loop.asm")).unwrap();
        assert_eq!(asm.matches("     x q[0]\n").count(), 3);
        assert_eq!(asm.matches("     prepz q[0]\n").count(), 1);

        let traces = fs::read_to_string(dir.path().join("trace.dat")).unwrap();
        assert_eq!(traces.lines().count(), 4);
    }

    #[test]
    fn test_kernel_list_backend_writes_instructions() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::surface7();
        let mut program = Program::with_counter(
            "ctrl",
            platform.clone(),
            2,
            2,
            qpc_core::ConstructCounter::new(),
        )
        .unwrap();
        let then_k = KernelBuilder::new("then", &platform).x(0).build();
        let else_k = KernelBuilder::new("else", &platform).y(1).build();
        program
            .add_if_else(then_k, else_k, qpc_core::Condition::new("==", [0, 1]))
            .unwrap();
        program.set_sweep_points(&[1.0, 2.0, 4.0]);

        let report = Compiler::new(options_in(&dir)).compile(&mut program).unwrap();
        assert_eq!(report.exit_code(), 0);
        assert!(report.reached(PipelineStage::Done));

        let qisa = fs::read_to_string(dir.path().join("ctrl.qisa")).unwrap();
        assert!(qisa.contains("then_if0_end"));

        let text = fs::read_to_string(dir.path().join("ctrl_config.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["measurement_points"], serde_json::json!([1.0, 2.0, 4.0]));
    }

    #[test]
    fn test_missing_backend_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::new("cc_box", 2, 20, "eqasm_backend_cc");
        let mut program = Program::new("p", platform.clone(), 2, 0).unwrap();
        program
            .add(KernelBuilder::new("k", &platform).h(0).build())
            .unwrap();
        program.set_sweep_points(&[1.0]);

        let mut registry = BackendRegistry::with_defaults();
        registry.unregister(BackendKind::Cc);
        let compiler = Compiler::with_registry(options_in(&dir), registry);

        let report = compiler.compile(&mut program).unwrap();
        assert_eq!(report.status, CompileStatus::BackendMissing);
        assert_eq!(report.exit_code(), 1);
        assert!(!report.reached(PipelineStage::Dispatched));
        assert!(!dir.path().join("p_config.json").exists());
    }

    #[test]
    fn test_backend_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::new("trio", 3, 20, "qumis_compiler");
        let build = || {
            let mut program = Program::new("tof", platform.clone(), 3, 0).unwrap();
            program
                .add(KernelBuilder::new("k", &platform).toffoli(0, 1, 2).build())
                .unwrap();
            program
        };

        let err = Compiler::new(options_in(&dir))
            .compile(&mut build())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendFailure);
        assert!(!dir.path().join("tof.asm").exists());

        let compiler = Compiler::new(options_in(&dir).with_decompose_toffoli("NC"));
        let report = compiler.compile(&mut build()).unwrap();
        assert_eq!(report.toffolis_decomposed, 1);
        assert!(dir.path().join("tof.asm").exists());
    }

    struct Refusing;

    impl Backend for Refusing {
        fn name(&self) -> &str {
            "refusing"
        }

        fn input_form(&self) -> InputForm {
            InputForm::KernelList
        }

        fn instruction_extension(&self) -> &'static str {
            "txt"
        }

        fn compile(&mut self, _: &str, _: BackendInput<'_>, _: &Platform) -> QpcResult<()> {
            Err(QpcError::Backend("refused".into()))
        }

        fn instructions(&self) -> &str {
            ""
        }
    }

    #[test]
    fn test_registered_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::surface7();
        let mut program = Program::new("p", platform.clone(), 1, 0).unwrap();
        program
            .add(KernelBuilder::new("k", &platform).x(0).build())
            .unwrap();

        let mut compiler = Compiler::new(options_in(&dir));
        compiler
            .registry_mut()
            .register(BackendKind::CcLight, || Box::new(Refusing));

        let err = compiler.compile(&mut program).unwrap_err();
        assert_eq!(err, QpcError::Backend("refused".into()));
    }

    #[test]
    fn test_missing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let platform = Platform::surface7();
        let mut program = Program::new("p", platform.clone(), 1, 0).unwrap();
        program
            .add(KernelBuilder::new("k", &platform).x(0).build())
            .unwrap();

        let options = CompileOptions::default().with_output_dir(dir.path().join("absent"));
        let err = Compiler::new(options).compile(&mut program).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IoFailure);
    }
}
