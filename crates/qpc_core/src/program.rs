//! Program composition and control-flow lowering for QPC
//!
//! Gantree: L2_Program → Program
//!
//! A program is a flat, uniquely named list of kernels. Structured
//! control flow (if, if/else, do-while, for) is lowered into that list by
//! wrapping the body with operation-free marker kernels.

use crate::error::{QpcError, QpcResult};
use crate::kernel::{Kernel, KernelKind};
use crate::platform::{BackendKind, Platform};
use crate::types::Condition;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Generated-file banner used by every textual program listing
pub const QASM_VERSION: &str = "version 1.0";

/// Header shared by the unscheduled and scheduled program listings
pub fn qasm_header(qubit_count: usize) -> String {
    format!(
        "{}\n# this file has been automatically generated by the QPC compiler please do not modify it manually.\nqubits {}\n",
        QASM_VERSION, qubit_count
    )
}

// ============================================================================
// Construct Counter
// ============================================================================

/// Source of construct ids for marker names
/// Gantree: ConstructCounter // 구조 카운터
///
/// Cloning shares the counter. Programs created with [`Program::new`] draw
/// from one session counter, so marker names of separately built programs
/// never collide when they are composed.
#[derive(Debug, Clone, Default)]
pub struct ConstructCounter(Arc<AtomicUsize>);

/// Counter behind [`ConstructCounter::session`]
static SESSION_COUNTER: OnceLock<ConstructCounter> = OnceLock::new();

impl ConstructCounter {
    /// Create an isolated counter starting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter shared by every program of this process
    /// Gantree: session() -> Self // 세션 카운터
    pub fn session() -> Self {
        SESSION_COUNTER.get_or_init(ConstructCounter::new).clone()
    }

    /// Check if two handles share one counter
    pub fn shares_with(&self, other: &ConstructCounter) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Take the next id
    pub fn next_id(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// Next id without consuming it
    pub fn peek(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Construct Bodies
// ============================================================================

/// Body of a control-flow construct: one kernel or a whole sub-program
#[derive(Debug, Clone)]
pub enum Body {
    /// Single kernel
    Kernel(Kernel),
    /// Sub-program; its kernels are added in order
    Program(Program),
}

impl Body {
    /// Base name used to derive marker names
    pub fn name(&self) -> &str {
        match self {
            Body::Kernel(k) => k.name(),
            Body::Program(p) => p.name(),
        }
    }
}

impl From<Kernel> for Body {
    fn from(kernel: Kernel) -> Self {
        Body::Kernel(kernel)
    }
}

impl From<Program> for Body {
    fn from(program: Program) -> Self {
        Body::Program(program)
    }
}

/// One element of a lowered construct
enum Part {
    Marker(Kernel),
    Body(Body),
}

// ============================================================================
// Program
// ============================================================================

/// Quantum program
/// Gantree: Program // 프로그램
#[derive(Debug, Clone)]
pub struct Program {
    /// Program name (base of all artifact names)
    name: String,

    /// Target platform
    platform: Platform,

    /// Declared qubits
    /// Gantree: qubit_count: usize // 큐비트 수
    qubit_count: usize,

    /// Declared classical registers
    /// Gantree: creg_count: usize // 레지스터 수
    creg_count: usize,

    /// Flat kernel list, markers included
    /// Gantree: kernels: Vec<Kernel> // 커널 목록
    kernels: Vec<Kernel>,

    /// Backend family, fixed at construction
    backend: BackendKind,

    /// Measurement sweep points
    sweep_points: Vec<f64>,

    /// Explicit sweep-point file name
    config_file_name: Option<String>,

    /// Marker id source
    constructs: ConstructCounter,
}

impl Program {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a program drawing construct ids from the session counter
    /// Gantree: new(name,platform,nq,nc) -> Result<Self> // 생성자
    pub fn new(
        name: impl Into<String>,
        platform: Platform,
        qubit_count: usize,
        creg_count: usize,
    ) -> QpcResult<Self> {
        Self::with_counter(
            name,
            platform,
            qubit_count,
            creg_count,
            ConstructCounter::session(),
        )
    }

    /// Create a program with an explicit construct counter
    ///
    /// Pass [`ConstructCounter::new`] for an isolated session.
    pub fn with_counter(
        name: impl Into<String>,
        platform: Platform,
        qubit_count: usize,
        creg_count: usize,
        constructs: ConstructCounter,
    ) -> QpcResult<Self> {
        let name = name.into();
        platform.validate()?;
        let backend = platform.backend_kind()?;

        if qubit_count > platform.qubit_number {
            return Err(QpcError::QubitCapacityExceeded {
                requested: qubit_count,
                available: platform.qubit_number,
            });
        }

        log::debug!(
            "created program '{}' ({} qubits, {} cregs, backend {})",
            name,
            qubit_count,
            creg_count,
            backend
        );

        Ok(Self {
            name,
            platform,
            qubit_count,
            creg_count,
            kernels: Vec::new(),
            backend,
            sweep_points: Vec::new(),
            config_file_name: None,
            constructs,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Program name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target platform
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Declared qubit count
    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// Declared classical register count
    pub fn creg_count(&self) -> usize {
        self.creg_count
    }

    /// Backend family
    pub fn backend_kind(&self) -> BackendKind {
        self.backend
    }

    /// Kernels in program order
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    /// Kernels for in-place passes
    pub fn kernels_mut(&mut self) -> &mut [Kernel] {
        &mut self.kernels
    }

    /// Find a kernel by name
    pub fn kernel(&self, name: &str) -> Option<&Kernel> {
        self.kernels.iter().find(|k| k.name() == name)
    }

    /// Check if a kernel name is taken
    pub fn contains_kernel(&self, name: &str) -> bool {
        self.kernels.iter().any(|k| k.name() == name)
    }

    /// Check if the program has no kernels
    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }

    /// Construct counter handle (clone to share it)
    pub fn construct_counter(&self) -> &ConstructCounter {
        &self.constructs
    }

    // ========================================================================
    // Sweep Points
    // ========================================================================

    /// Replace the sweep points
    pub fn set_sweep_points(&mut self, points: &[f64]) {
        self.sweep_points = points.to_vec();
    }

    /// Sweep points in insertion order
    pub fn sweep_points(&self) -> &[f64] {
        &self.sweep_points
    }

    /// Write sweep points to this file (relative to the output directory)
    pub fn set_config_file(&mut self, file_name: impl Into<String>) {
        self.config_file_name = Some(file_name.into());
    }

    /// Explicit sweep-point file name, if any
    pub fn config_file_name(&self) -> Option<&str> {
        self.config_file_name.as_deref()
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Add a kernel
    /// Gantree: add(kernel) -> Result // 커널 추가
    ///
    /// Operands are checked against the declared qubit/register counts;
    /// they are never checked again afterwards.
    pub fn add(&mut self, kernel: Kernel) -> QpcResult<()> {
        self.check_operands(&kernel)?;
        self.check_name(kernel.name())?;
        log::debug!("adding kernel '{}' to program '{}'", kernel.name(), self.name);
        self.kernels.push(kernel);
        Ok(())
    }

    /// Add every kernel of a sub-program, in order
    ///
    /// Kernels added before a failing one stay in the program.
    pub fn add_program(&mut self, program: Program) -> QpcResult<()> {
        for kernel in program.kernels {
            self.add(kernel)?;
        }
        Ok(())
    }

    /// Add a body guarded by `condition`
    /// Gantree: add_if(body,cond) // if 구조
    pub fn add_if(&mut self, body: impl Into<Body>, condition: Condition) -> QpcResult<()> {
        let body = body.into();
        let base = body.name().to_string();
        self.append_parts(vec![
            Part::Marker(Kernel::marker(
                format!("{}_if", base),
                KernelKind::IfStart(condition.clone()),
            )),
            Part::Body(body),
            Part::Marker(Kernel::marker(
                format!("{}_if_end", base),
                KernelKind::IfEnd(condition),
            )),
        ])
    }

    /// Add an if/else pair guarded by `condition`
    /// Gantree: add_if_else(if,else,cond) // if-else 구조
    pub fn add_if_else(
        &mut self,
        if_body: impl Into<Body>,
        else_body: impl Into<Body>,
        condition: Condition,
    ) -> QpcResult<()> {
        let (if_body, else_body) = (if_body.into(), else_body.into());
        let n = self.constructs.next_id();
        let if_base = format!("{}_if{}", if_body.name(), n);
        let else_base = format!("{}_else{}", else_body.name(), n);

        self.append_parts(vec![
            Part::Marker(Kernel::marker(
                if_base.clone(),
                KernelKind::IfStart(condition.clone()),
            )),
            Part::Body(if_body),
            Part::Marker(Kernel::marker(
                format!("{}_end", if_base),
                KernelKind::IfEnd(condition.clone()),
            )),
            Part::Marker(Kernel::marker(
                else_base.clone(),
                KernelKind::ElseStart(condition.clone()),
            )),
            Part::Body(else_body),
            Part::Marker(Kernel::marker(
                format!("{}_end", else_base),
                KernelKind::ElseEnd(condition),
            )),
        ])
    }

    /// Add a do-while loop around `body`
    /// Gantree: add_do_while(body,cond) // do-while 구조
    pub fn add_do_while(&mut self, body: impl Into<Body>, condition: Condition) -> QpcResult<()> {
        let body = body.into();
        let n = self.constructs.next_id();
        let base = format!("{}_do_while{}", body.name(), n);

        self.append_parts(vec![
            Part::Marker(Kernel::marker(
                format!("{}_start", base),
                KernelKind::DoWhileStart(condition.clone()),
            )),
            Part::Body(body),
            Part::Marker(Kernel::marker(base, KernelKind::DoWhileEnd(condition))),
        ])
    }

    /// Add a counted loop around `body`
    /// Gantree: add_for(body,iterations) // for 구조
    ///
    /// A zero trip count elides the construct. Sub-programs that already
    /// contain a for loop are rejected.
    pub fn add_for(&mut self, body: impl Into<Body>, iterations: usize) -> QpcResult<()> {
        let mut body = body.into();

        if let Body::Program(p) = &body {
            let nested = p
                .kernels
                .iter()
                .any(|k| matches!(k.kind(), KernelKind::ForStart { .. }));
            if nested {
                log::error!("nested for not yet implemented (body '{}')", p.name());
                return Err(QpcError::UnsupportedFeature(
                    "nested for not yet implemented".into(),
                ));
            }
        }

        if iterations == 0 {
            log::debug!("for over '{}' with 0 iterations elided", body.name());
            return Ok(());
        }

        if let Body::Kernel(k) = &mut body {
            k.set_iterations(iterations);
        }

        let n = self.constructs.next_id();
        let base = format!("{}_for{}", body.name(), n);

        self.append_parts(vec![
            Part::Marker(Kernel::marker(
                format!("{}_start", base),
                KernelKind::ForStart { iterations },
            )),
            Part::Body(body),
            Part::Marker(Kernel::marker(format!("{}_end", base), KernelKind::ForEnd)),
        ])
    }

    // ========================================================================
    // Text Form
    // ========================================================================

    /// Unscheduled program listing
    /// Gantree: qasm(&self) -> String // QASM 출력
    pub fn qasm(&self) -> String {
        let mut out = qasm_header(self.qubit_count);
        for kernel in &self.kernels {
            out.push('\n');
            out.push_str(&kernel.qasm());
        }
        out
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check every operand of every operation against the declared counts
    fn check_operands(&self, kernel: &Kernel) -> QpcResult<()> {
        for op in kernel.circuit() {
            let limit = if op.is_classical() {
                self.creg_count
            } else {
                self.qubit_count
            };
            if let Some(&operand) = op.operands().iter().find(|&&o| o >= limit) {
                log::error!(
                    "out of range operand {} for '{}' in kernel '{}'",
                    operand,
                    op.name(),
                    kernel.name()
                );
                return Err(QpcError::OperandOutOfRange {
                    operation: op.name().to_string(),
                    operand,
                    qubit_count: self.qubit_count,
                    creg_count: self.creg_count,
                });
            }
        }
        Ok(())
    }

    fn check_name(&self, name: &str) -> QpcResult<()> {
        if self.contains_kernel(name) {
            return Err(QpcError::DuplicateKernel(name.to_string()));
        }
        Ok(())
    }

    fn push_marker(&mut self, marker: Kernel) -> QpcResult<()> {
        self.check_name(marker.name())?;
        self.kernels.push(marker);
        Ok(())
    }

    /// Append a lowered construct.
    ///
    /// Without sub-program bodies the whole construct is validated first,
    /// so a failure leaves the program unchanged.
    fn append_parts(&mut self, parts: Vec<Part>) -> QpcResult<()> {
        let has_subprogram = parts
            .iter()
            .any(|p| matches!(p, Part::Body(Body::Program(_))));
        if !has_subprogram {
            self.check_parts(&parts)?;
        }

        for part in parts {
            match part {
                Part::Marker(marker) => self.push_marker(marker)?,
                Part::Body(Body::Kernel(kernel)) => self.add(kernel)?,
                Part::Body(Body::Program(program)) => self.add_program(program)?,
            }
        }
        Ok(())
    }

    fn check_parts(&self, parts: &[Part]) -> QpcResult<()> {
        let mut seen = HashSet::new();
        for part in parts {
            let kernel = match part {
                Part::Marker(marker) => marker,
                Part::Body(Body::Kernel(kernel)) => {
                    self.check_operands(kernel)?;
                    kernel
                }
                Part::Body(Body::Program(_)) => continue,
            };
            self.check_name(kernel.name())?;
            if !seen.insert(kernel.name()) {
                return Err(QpcError::DuplicateKernel(kernel.name().to_string()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program: {}", self.name)?;
        writeln!(f, "  Qubits: {}", self.qubit_count)?;
        writeln!(f, "  Cregs: {}", self.creg_count)?;
        writeln!(f, "  Backend: {}", self.backend)?;
        writeln!(f, "  Kernels: {}", self.kernels.len())?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
