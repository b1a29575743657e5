//! eQASM backends for QPC
//!
//! Gantree: L4_Backend → EqasmBackend
//!
//! Kernel-list backends for the CC-Light and CC controllers. Static kernels
//! are rescheduled with the backend's own scheduler and emitted as timed
//! bundles; marker kernels become labels and branches.

use crate::backend::{check_arity, expect_form, Backend, BackendInput, InputForm};
use qpc_core::{Condition, Kernel, KernelKind, Platform, QpcError, QpcResult};
use qpc_schedule::{Bundler, ListScheduler, Scheduler, SchedulerKind};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Register holding the loop counter of a for construct
const LOOP_COUNTER: &str = "r30";

/// Register holding the trip count of a for construct
const LOOP_LIMIT: &str = "r31";

/// Controller family
/// Gantree: EqasmFlavor // eQASM 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EqasmFlavor {
    /// `cc_light_compiler`
    CcLight,
    /// `eqasm_backend_cc`
    Cc,
}

impl EqasmFlavor {
    fn backend_name(&self) -> &'static str {
        match self {
            EqasmFlavor::CcLight => "cc_light_compiler",
            EqasmFlavor::Cc => "eqasm_backend_cc",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            EqasmFlavor::CcLight => "qisa",
            EqasmFlavor::Cc => "vq1asm",
        }
    }
}

/// eQASM backend
/// Gantree: EqasmBackend // eQASM 백엔드
#[derive(Debug, Clone)]
pub struct EqasmBackend {
    flavor: EqasmFlavor,
    scheduler: ListScheduler,
    code: String,
}

impl EqasmBackend {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a backend for a flavor (ALAP scheduling)
    pub fn new(flavor: EqasmFlavor) -> Self {
        Self {
            flavor,
            scheduler: ListScheduler::alap(),
            code: String::new(),
        }
    }

    /// CC-Light backend
    pub fn cc_light() -> Self {
        Self::new(EqasmFlavor::CcLight)
    }

    /// CC backend
    pub fn cc() -> Self {
        Self::new(EqasmFlavor::Cc)
    }

    /// Controller family
    pub fn flavor(&self) -> EqasmFlavor {
        self.flavor
    }

    // ========================================================================
    // Code Generation
    // ========================================================================

    fn prologue(&self, program_name: &str) -> String {
        match self.flavor {
            EqasmFlavor::CcLight => format!(
                "# CC-Light eQASM for '{}', generated by the QPC compiler\nstart:\n",
                program_name
            ),
            EqasmFlavor::Cc => format!(
                "# CC program '{}', generated by the QPC compiler\n.CODE\nmainLoop:\n",
                program_name
            ),
        }
    }

    fn epilogue(&self) -> &'static str {
        match self.flavor {
            EqasmFlavor::CcLight => "    br always, start\n    nop\n    nop\n",
            EqasmFlavor::Cc => "    jmp @mainLoop\n",
        }
    }

    /// `cmp` + branch taken when `condition` holds (or fails, if `negate`)
    fn branch(&self, condition: &Condition, negate: bool, target: &str) -> QpcResult<String> {
        let flag = match (condition.operator(), condition.operands().len()) {
            ("==", 2) => "eq",
            ("!=", 2) => "ne",
            ("<", 2) => "lt",
            (">", 2) => "gt",
            ("<=", 2) => "le",
            (">=", 2) => "ge",
            ("always", 0) | ("true", 0) => "always",
            ("never", 0) | ("false", 0) => "never",
            (op, n) => {
                return Err(QpcError::Backend(format!(
                    "{} cannot branch on condition '{}' with {} operands",
                    self.name(),
                    op,
                    n
                )))
            }
        };
        let flag = if negate { inverse(flag) } else { flag };

        let mut out = String::new();
        if let [a, b] = condition.operands() {
            let _ = writeln!(out, "    cmp r{}, r{}", a, b);
            out.push_str("    nop\n");
        }
        let _ = writeln!(out, "    br {}, {}", flag, target);
        Ok(out)
    }

    fn emit_marker(&self, kernel: &Kernel) -> QpcResult<String> {
        let name = kernel.name();
        let mut out = format!("{}:\n", name);
        match kernel.kind() {
            KernelKind::Static => {}
            // skip the region when the guard fails (if) or holds (else)
            KernelKind::IfStart(c) => out.push_str(&self.branch(c, true, &format!("{}_end", name))?),
            KernelKind::ElseStart(c) => {
                out.push_str(&self.branch(c, false, &format!("{}_end", name))?)
            }
            KernelKind::IfEnd(_) | KernelKind::ElseEnd(_) | KernelKind::DoWhileStart(_) => {}
            KernelKind::DoWhileEnd(c) => {
                out.push_str(&self.branch(c, false, &format!("{}_start", name))?)
            }
            KernelKind::ForStart { iterations } => {
                let _ = writeln!(out, "    ldi {}, 0", LOOP_COUNTER);
                let _ = writeln!(out, "    ldi {}, {}", LOOP_LIMIT, iterations);
                let _ = writeln!(out, "{}_loop:", name);
            }
            KernelKind::ForEnd => {
                let base = name.strip_suffix("_end").unwrap_or(name);
                let _ = writeln!(out, "    addi {0}, {0}, 1", LOOP_COUNTER);
                let _ = writeln!(out, "    cmp {}, {}", LOOP_COUNTER, LOOP_LIMIT);
                out.push_str("    nop\n");
                let _ = writeln!(out, "    br lt, {}_start_loop", base);
            }
        }
        Ok(out)
    }

    fn emit_static(&self, kernel: &Kernel, platform: &Platform) -> QpcResult<String> {
        for op in kernel.circuit() {
            check_arity(self.name(), op)?;
        }

        let mut scheduled = kernel.clone();
        self.scheduler.schedule(&mut scheduled, platform)?;
        let bundles = Bundler::bundle(scheduled.circuit(), platform.cycle_time)?;

        let mut out = format!("{}:\n", kernel.name());
        let mut previous = None;
        for bundle in &bundles {
            let gap = previous.map_or(1, |p| bundle.start_cycle - p);
            let ops: Vec<String> = bundle.operations().map(|op| op.to_qasm()).collect();
            let _ = writeln!(out, "    bs {} {}", gap, ops.join(" | "));
            previous = Some(bundle.start_cycle);
        }
        if let Some(last) = bundles.last() {
            if last.duration_in_cycles > 1 {
                let _ = writeln!(out, "    qwait {}", last.duration_in_cycles - 1);
            }
        }
        Ok(out)
    }
}

fn inverse(flag: &'static str) -> &'static str {
    match flag {
        "eq" => "ne",
        "ne" => "eq",
        "lt" => "ge",
        "ge" => "lt",
        "gt" => "le",
        "le" => "gt",
        "always" => "never",
        _ => "always",
    }
}

impl Backend for EqasmBackend {
    fn name(&self) -> &str {
        self.flavor.backend_name()
    }

    fn input_form(&self) -> InputForm {
        InputForm::KernelList
    }

    fn instruction_extension(&self) -> &'static str {
        self.flavor.extension()
    }

    fn set_scheduler(&mut self, kind: SchedulerKind) {
        self.scheduler = ListScheduler::new(kind);
    }

    fn compile(
        &mut self,
        program_name: &str,
        input: BackendInput<'_>,
        platform: &Platform,
    ) -> QpcResult<()> {
        let BackendInput::Kernels(kernels) = input else {
            return expect_form(self.name(), InputForm::KernelList, &input);
        };
        platform.validate()?;

        log::info!(
            "{}: generating eQASM for '{}' ({} kernels)",
            self.name(),
            program_name,
            kernels.len()
        );

        let mut code = self.prologue(program_name);
        for kernel in kernels {
            let section = if kernel.kind().is_marker() {
                self.emit_marker(kernel)?
            } else {
                self.emit_static(kernel, platform)?
            };
            code.push_str(&section);
        }
        code.push_str(self.epilogue());

        self.code = code;
        Ok(())
    }

    fn instructions(&self) -> &str {
        &self.code
    }
}

// ============================================================================
// Tests
// ============================================================================
