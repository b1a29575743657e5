//! Compile options for QPC
//!
//! Gantree: L5_Engine → CompileOptions
//!
//! Typed compiler options with serde loading and the classic string-keyed
//! option table (`set("optimize", "yes")`).

use qpc_core::{QpcError, QpcResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "test_output";

/// Keys understood by [`CompileOptions::set`] and [`CompileOptions::get`]
pub const OPTION_KEYS: [&str; 9] = [
    "output_dir",
    "optimize",
    "decompose_toffoli",
    "unique_output",
    "write_qasm_files",
    "write_report_files",
    "prescheduler",
    "scheduler",
    "print_dot_graphs",
];

/// Compiler options
/// Gantree: CompileOptions // 컴파일 옵션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    // ========================================================================
    // Output
    // ========================================================================
    /// Directory every artifact is written to
    pub output_dir: Option<PathBuf>,

    /// Append a persisted version number to artifact names
    pub unique_output: bool,

    /// Write unscheduled and scheduled program listings
    pub write_qasm_files: bool,

    /// Write statistics reports around the prescheduler
    pub write_report_files: bool,

    /// Write dependency and schedule graphs
    pub print_dot_graphs: bool,

    // ========================================================================
    // Passes
    // ========================================================================
    /// Run the peephole optimizer
    pub optimize: bool,

    /// Toffoli decomposition strategy ("no", "AM", "NC")
    pub decompose_toffoli: String,

    /// Schedule kernels before dispatch
    pub prescheduler: bool,

    /// Scheduling direction ("ASAP", "ALAP")
    pub scheduler: String,
}

impl CompileOptions {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that write every artifact into `dir`
    pub fn verbose_output(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
            write_qasm_files: true,
            write_report_files: true,
            print_dot_graphs: true,
            ..Self::default()
        }
    }

    /// Parse options from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> QpcResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load options from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> QpcResult<Self> {
        let path = path.as_ref();
        log::debug!("loading compile options from '{}'", path.display());
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Enable peephole optimization
    pub fn with_optimize(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    /// Set Toffoli decomposition strategy
    pub fn with_decompose_toffoli(mut self, strategy: impl Into<String>) -> Self {
        self.decompose_toffoli = strategy.into();
        self
    }

    /// Enable versioned artifact names
    pub fn with_unique_output(mut self, enabled: bool) -> Self {
        self.unique_output = enabled;
        self
    }

    /// Enable program listings
    pub fn with_qasm_files(mut self, enabled: bool) -> Self {
        self.write_qasm_files = enabled;
        self
    }

    /// Enable statistics reports
    pub fn with_report_files(mut self, enabled: bool) -> Self {
        self.write_report_files = enabled;
        self
    }

    /// Enable prescheduling
    pub fn with_prescheduler(mut self, enabled: bool) -> Self {
        self.prescheduler = enabled;
        self
    }

    /// Set scheduling direction
    pub fn with_scheduler(mut self, scheduler: impl Into<String>) -> Self {
        self.scheduler = scheduler.into();
        self
    }

    /// Enable DOT graph output
    pub fn with_dot_graphs(mut self, enabled: bool) -> Self {
        self.print_dot_graphs = enabled;
        self
    }

    // ========================================================================
    // String Options
    // ========================================================================

    /// Set an option by name
    /// Gantree: set(key,value) -> Result // 옵션 설정
    ///
    /// Boolean options take "yes" or "no". Strategy and scheduler values are
    /// stored as given and checked when a program is compiled.
    pub fn set(&mut self, key: &str, value: &str) -> QpcResult<()> {
        match key {
            "output_dir" => {
                self.output_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "optimize" => self.optimize = parse_flag(key, value)?,
            "decompose_toffoli" => self.decompose_toffoli = value.to_string(),
            "unique_output" => self.unique_output = parse_flag(key, value)?,
            "write_qasm_files" => self.write_qasm_files = parse_flag(key, value)?,
            "write_report_files" => self.write_report_files = parse_flag(key, value)?,
            "prescheduler" => self.prescheduler = parse_flag(key, value)?,
            "scheduler" => self.scheduler = value.to_string(),
            "print_dot_graphs" => self.print_dot_graphs = parse_flag(key, value)?,
            _ => return Err(unknown_key(key, value)),
        }
        log::debug!("option {} = {}", key, value);
        Ok(())
    }

    /// Get an option by name, formatted as [`set`](Self::set) accepts it
    pub fn get(&self, key: &str) -> QpcResult<String> {
        let value = match key {
            "output_dir" => self
                .output_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            "optimize" => flag(self.optimize),
            "decompose_toffoli" => self.decompose_toffoli.clone(),
            "unique_output" => flag(self.unique_output),
            "write_qasm_files" => flag(self.write_qasm_files),
            "write_report_files" => flag(self.write_report_files),
            "prescheduler" => flag(self.prescheduler),
            "scheduler" => self.scheduler.clone(),
            "print_dot_graphs" => flag(self.print_dot_graphs),
            _ => return Err(unknown_key(key, "")),
        };
        Ok(value)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the strategy and scheduler values
    pub fn validate(&self) -> QpcResult<()> {
        self.decomposition()?;
        self.scheduler_kind()?;
        Ok(())
    }

    /// Parsed Toffoli decomposition strategy
    pub fn decomposition(&self) -> QpcResult<crate::decompose::DecompositionStrategy> {
        self.decompose_toffoli.parse()
    }

    /// Parsed scheduling direction
    pub fn scheduler_kind(&self) -> QpcResult<qpc_schedule::SchedulerKind> {
        self.scheduler.parse()
    }
}

fn parse_flag(key: &str, value: &str) -> QpcResult<bool> {
    match value {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => Err(QpcError::UnknownOption {
            option: key.into(),
            value: value.into(),
        }),
    }
}

fn flag(enabled: bool) -> String {
    let value = if enabled { "yes" } else { "no" };
    value.to_string()
}

fn unknown_key(key: &str, value: &str) -> QpcError {
    log::error!("unknown option '{}'", key);
    QpcError::UnknownOption {
        option: key.into(),
        value: value.into(),
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            output_dir: Some(PathBuf::from(DEFAULT_OUTPUT_DIR)),
            unique_output: false,
            write_qasm_files: false,
            write_report_files: false,
            print_dot_graphs: false,
            optimize: false,
            decompose_toffoli: "no".into(),
            prescheduler: true,
            scheduler: "ALAP".into(),
        }
    }
}

impl fmt::Display for CompileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CompileOptions(optimize={}, decompose_toffoli={}, prescheduler={}, scheduler={})",
            flag(self.optimize),
            self.decompose_toffoli,
            flag(self.prescheduler),
            self.scheduler
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
