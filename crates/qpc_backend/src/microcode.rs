//! Legacy microcode backend for QPC
//!
//! Gantree: L4_Backend → MicrocodeBackend
//!
//! Consumes the fused circuit and emits sequential microcode: every
//! instruction is followed by a wait covering its duration, and the program
//! body repeats in an infinite loop. A trace line per instruction records
//! its start time in nanoseconds.

use crate::backend::{check_arity, expect_form, Backend, BackendInput, InputForm};
use qpc_core::{duration_in_cycles, Operation, OperationKind, Platform, QpcResult};
use std::fmt::Write as _;

/// Microcode backend (`qumis_compiler`)
/// Gantree: MicrocodeBackend // 마이크로코드 백엔드
#[derive(Debug, Clone, Default)]
pub struct MicrocodeBackend {
    /// Generated microcode
    code: String,

    /// `<start ns>\t<instruction>` per emitted instruction
    traces: String,
}

impl MicrocodeBackend {
    /// Create a backend with empty output
    pub fn new() -> Self {
        Self::default()
    }

    fn header(program_name: &str) -> String {
        format!(
            "# auto-generated microcode for '{}' by the QPC compiler, please do not modify it manually\n\
             mov r11, 0       # counter\n\
             mov r3,  10      # max iterations\n\
             mov r0,  20000   # relaxation time / 2\n\
             loop:\n",
            program_name
        )
    }

    fn emit(&mut self, op: &Operation, cycle_time: u64, now: &mut u64) {
        let cycles = duration_in_cycles(op.duration(), cycle_time);
        match op.kind() {
            OperationKind::Dummy => return,
            OperationKind::Wait => {}
            OperationKind::Quantum | OperationKind::Classical => {
                let _ = writeln!(self.code, "     {}", op.to_qasm());
                let _ = writeln!(self.traces, "{}\t{}", now, op.to_qasm());
            }
        }
        if cycles > 0 {
            let _ = writeln!(self.code, "     wait {}", cycles);
        }
        *now += cycles as u64 * cycle_time;
    }
}

impl Backend for MicrocodeBackend {
    fn name(&self) -> &str {
        "qumis_compiler"
    }

    fn input_form(&self) -> InputForm {
        InputForm::Fused
    }

    fn instruction_extension(&self) -> &'static str {
        "asm"
    }

    fn compile(
        &mut self,
        program_name: &str,
        input: BackendInput<'_>,
        platform: &Platform,
    ) -> QpcResult<()> {
        let BackendInput::Fused(circuit) = input else {
            return expect_form(self.name(), InputForm::Fused, &input);
        };
        platform.validate()?;

        for op in circuit {
            check_arity(self.name(), op)?;
        }

        log::info!(
            "generating microcode for '{}' ({} instructions)",
            program_name,
            circuit.len()
        );

        self.code = Self::header(program_name);
        self.traces.clear();
        let mut now = 0;
        for op in circuit {
            self.emit(op, platform.cycle_time, &mut now);
        }
        self.code.push_str("     beq  r3,  r3, loop   # infinite loop\n");
        Ok(())
    }

    fn instructions(&self) -> &str {
        &self.code
    }

    fn traces(&self) -> Option<&str> {
        Some(&self.traces)
    }
}

// ============================================================================
// Tests
// ============================================================================
