//! Compilation pipeline for QPC
//!
//! Gantree: L5_Engine → Compiler
//!
//! Sequences optimization, decomposition, renaming, prescheduling, backend
//! dispatch and sweep-point output for one program. Stages run in a fixed
//! order; the report lists the stages a compile went through.

use crate::artifacts::ArtifactWriter;
use crate::config::CompileOptions;
use crate::decompose::{decompose_toffoli, DecompositionStrategy};
use crate::optimizer::{OptimizationStats, PeepholeOptimizer};
use crate::unique::bump_unique_file_version;
use qpc_backend::{fuse_kernels, Backend, BackendInput, BackendRegistry, BackendSelection, InputForm};
use qpc_core::{qasm_header, Kernel, Program, QpcError, QpcResult};
use qpc_schedule::{render_kernel, report_statistics, ListScheduler, Scheduler};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Prefix of statistics report lines
const REPORT_PREFIX: &str = "# ";

/// Traces file of fused backends
const TRACE_FILE: &str = "trace.dat";

// ============================================================================
// Pipeline State
// ============================================================================

/// Pipeline stage
/// Gantree: PipelineStage // 파이프라인 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Program accepted for compilation
    Constructed,
    /// Peephole pass applied
    Optimized,
    /// Toffoli gates decomposed
    Decomposed,
    /// Artifact name versioned
    Renamed,
    /// Kernels prescheduled
    Scheduled,
    /// Backend produced instructions
    Dispatched,
    /// All artifacts written
    Done,
}

/// Outcome of a successful compile
/// Gantree: CompileStatus // 컴파일 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompileStatus {
    /// Backend ran and artifacts were written
    Compiled,
    /// Platform needs no backend pass
    NoBackendRequired,
    /// Platform needs a backend that is not registered
    BackendMissing,
}

impl fmt::Display for CompileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileStatus::Compiled => write!(f, "compiled"),
            CompileStatus::NoBackendRequired => write!(f, "no backend required"),
            CompileStatus::BackendMissing => write!(f, "backend missing"),
        }
    }
}

/// Compile report
/// Gantree: CompileReport // 컴파일 보고
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileReport {
    /// Outcome
    pub status: CompileStatus,

    /// Stages visited, in order
    pub stages: Vec<PipelineStage>,

    /// Base name used for program-level artifacts
    pub artifact_name: String,

    /// Files written
    pub files_written: Vec<PathBuf>,

    /// Peephole statistics over all kernels
    pub optimization: Option<OptimizationStats>,

    /// Toffoli gates replaced
    pub toffolis_decomposed: usize,
}

impl CompileReport {
    /// Process exit code for the outcome
    pub fn exit_code(&self) -> i32 {
        match self.status {
            CompileStatus::BackendMissing => 1,
            CompileStatus::Compiled | CompileStatus::NoBackendRequired => 0,
        }
    }

    /// Check if a stage was visited
    pub fn reached(&self, stage: PipelineStage) -> bool {
        self.stages.contains(&stage)
    }

    /// Last visited stage
    pub fn last_stage(&self) -> PipelineStage {
        self.stages
            .last()
            .copied()
            .unwrap_or(PipelineStage::Constructed)
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Program compiler
/// Gantree: Compiler // 컴파일러
#[derive(Debug, Default)]
pub struct Compiler {
    /// Options
    options: CompileOptions,

    /// Backend constructors
    registry: BackendRegistry,
}

impl Compiler {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a compiler with the built-in backends
    pub fn new(options: CompileOptions) -> Self {
        Self::with_registry(options, BackendRegistry::with_defaults())
    }

    /// Create a compiler with a custom registry
    pub fn with_registry(options: CompileOptions, registry: BackendRegistry) -> Self {
        Self { options, registry }
    }

    /// Options
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Options, for changing them between compiles
    pub fn options_mut(&mut self) -> &mut CompileOptions {
        &mut self.options
    }

    /// Backend registry
    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Backend registry, for registering backends
    pub fn registry_mut(&mut self) -> &mut BackendRegistry {
        &mut self.registry
    }

    // ========================================================================
    // Compile
    // ========================================================================

    /// Compile a program
    /// Gantree: compile(program) -> Result<CompileReport> // 컴파일
    ///
    /// Kernels are optimized and decomposed in place. Files already written
    /// stay on disk when a later stage fails.
    pub fn compile(&self, program: &mut Program) -> QpcResult<CompileReport> {
        if program.is_empty() {
            log::error!("compiling a program with no kernels: '{}'", program.name());
            return Err(QpcError::EmptyProgram(program.name().to_string()));
        }
        log::info!("compiling program '{}' with {}", program.name(), self.options);

        let mut report = CompileReport {
            status: CompileStatus::Compiled,
            stages: vec![PipelineStage::Constructed],
            artifact_name: program.name().to_string(),
            files_written: Vec::new(),
            optimization: None,
            toffolis_decomposed: 0,
        };
        let mut writer = ArtifactWriter::new(self.options.output_dir.clone(), program.name());

        if self.options.optimize {
            report.optimization = Some(self.optimize(program));
            report.stages.push(PipelineStage::Optimized);
        }

        let strategy = self.options.decomposition()?;
        if strategy != DecompositionStrategy::No {
            report.toffolis_decomposed = self.decompose(program, strategy)?;
            report.stages.push(PipelineStage::Decomposed);
        }

        if self.options.unique_output {
            let version = bump_unique_file_version(writer.dir()?, program.name())?;
            if version > 1 {
                writer.rename(format!("{}{}", program.name(), version));
            }
            report.stages.push(PipelineStage::Renamed);
        }
        report.artifact_name = writer.artifact_name().to_string();

        if self.options.write_qasm_files {
            writer.write_artifact(".qasm", &program.qasm())?;
        }

        if self.options.prescheduler {
            self.preschedule(program, &mut writer)?;
            report.stages.push(PipelineStage::Scheduled);
        }

        let status = self.dispatch(program, &mut writer)?;
        if status != CompileStatus::Compiled {
            report.status = status;
            report.files_written = writer.into_written();
            return Ok(report);
        }
        report.stages.push(PipelineStage::Dispatched);

        self.write_sweep_points(program, &mut writer)?;
        report.stages.push(PipelineStage::Done);
        report.files_written = writer.into_written();

        log::info!(
            "compiled '{}' into {} file(s)",
            program.name(),
            report.files_written.len()
        );
        Ok(report)
    }

    // ========================================================================
    // Passes
    // ========================================================================

    fn optimize(&self, program: &mut Program) -> OptimizationStats {
        log::info!("optimizing program '{}'", program.name());
        program
            .kernels_mut()
            .iter_mut()
            .map(PeepholeOptimizer::optimize_kernel)
            .fold(OptimizationStats::default(), OptimizationStats::merge)
    }

    fn decompose(&self, program: &mut Program, strategy: DecompositionStrategy) -> QpcResult<usize> {
        log::info!(
            "decomposing toffoli gates of '{}' using {}",
            program.name(),
            strategy
        );
        let platform = program.platform().clone();
        let mut replaced = 0;
        for kernel in program.kernels_mut() {
            replaced += decompose_toffoli(kernel, strategy, &platform)?;
        }
        Ok(replaced)
    }

    /// Schedule copies of the kernels and write listings, graphs and reports
    fn preschedule(&self, program: &Program, writer: &mut ArtifactWriter) -> QpcResult<()> {
        let scheduler = ListScheduler::new(self.options.scheduler_kind()?);
        let platform = program.platform();
        log::info!(
            "prescheduling program '{}' with {}",
            program.name(),
            scheduler.name()
        );

        if self.options.write_report_files {
            let text = report_statistics(
                program.name(),
                program.kernels(),
                platform.cycle_time,
                "in",
                "prescheduler",
                REPORT_PREFIX,
            );
            writer.write_artifact("_prescheduler_in.report", &text)?;
        }

        let mut scheduled: Vec<Kernel> = program.kernels().to_vec();
        let mut listing = qasm_header(program.qubit_count());
        for kernel in &mut scheduled {
            if !kernel.kind().is_marker() {
                let diagnostics = scheduler.schedule(kernel, platform)?;
                if self.options.print_dot_graphs {
                    writer.write(
                        &format!("{}_dependence_graph.dot", kernel.name()),
                        &diagnostics.dependency_dot,
                    )?;
                    writer.write(
                        &format!("{}{}_scheduled.dot", kernel.name(), scheduler.name()),
                        &diagnostics.scheduled_dot,
                    )?;
                }
            }
            listing.push('\n');
            listing.push_str(&render_kernel(kernel, platform.cycle_time)?);
        }

        if self.options.write_qasm_files {
            writer.write_artifact("_scheduled.qasm", &listing)?;
        }

        if self.options.write_report_files {
            let text = report_statistics(
                program.name(),
                &scheduled,
                platform.cycle_time,
                "out",
                "prescheduler",
                REPORT_PREFIX,
            );
            writer.write_artifact("_prescheduler_out.report", &text)?;
        }
        Ok(())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn dispatch(&self, program: &Program, writer: &mut ArtifactWriter) -> QpcResult<CompileStatus> {
        let kind = program.backend_kind();
        let mut backend = match self.registry.select(kind) {
            BackendSelection::NotRequired => {
                log::warn!(
                    "platform '{}' needs no backend pass, compilation of '{}' ends here",
                    program.platform().name,
                    program.name()
                );
                return Ok(CompileStatus::NoBackendRequired);
            }
            BackendSelection::Missing(kind) => {
                log::warn!("no backend registered for '{}', skipping code generation", kind);
                return Ok(CompileStatus::BackendMissing);
            }
            BackendSelection::Ready(backend) => backend,
        };

        backend.set_scheduler(self.options.scheduler_kind()?);
        log::info!(
            "dispatching '{}' to {} as '{}'",
            program.name(),
            backend.name(),
            writer.artifact_name()
        );
        let name = writer.artifact_name().to_string();
        match backend.input_form() {
            InputForm::KernelList => {
                run_backend(
                    backend.as_mut(),
                    &name,
                    program,
                    BackendInput::Kernels(program.kernels()),
                )?;
                let ext = backend.instruction_extension();
                let path = writer.artifact_path(&format!(".{}", ext))?;
                backend.write_instructions(&path)?;
                writer.record(path);
            }
            InputForm::Fused => {
                let fused = fuse_kernels(program.kernels());
                run_backend(backend.as_mut(), &name, program, BackendInput::Fused(&fused))?;
                let path = writer.artifact_path(".asm")?;
                backend.write_instructions(&path)?;
                writer.record(path);
                let path = writer.file_path(TRACE_FILE)?;
                backend.write_traces(&path)?;
                writer.record(path);
            }
        }
        Ok(CompileStatus::Compiled)
    }

    fn write_sweep_points(&self, program: &Program, writer: &mut ArtifactWriter) -> QpcResult<()> {
        if program.sweep_points().is_empty() {
            return Ok(());
        }
        let json = serde_json::to_string(&SweepPoints {
            measurement_points: program.sweep_points(),
        })?;
        match program.config_file_name() {
            Some(file_name) => writer.write(file_name, &json)?,
            None => writer.write_artifact("_config.json", &json)?,
        };
        Ok(())
    }
}

#[derive(Serialize)]
struct SweepPoints<'a> {
    measurement_points: &'a [f64],
}

fn run_backend(
    backend: &mut dyn Backend,
    name: &str,
    program: &Program,
    input: BackendInput<'_>,
) -> QpcResult<()> {
    backend
        .compile(name, input, program.platform())
        .map_err(|err| {
            log::error!("{} failed on '{}': {}", backend.name(), name, err);
            err
        })
}

// ============================================================================
// Tests
// ============================================================================
