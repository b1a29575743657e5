//! Error types for QPC
//!
//! Gantree: L0_Foundation → Errors
//!
//! One error enum shared by every compiler stage, grouped into the
//! error kinds the pipeline reports to its caller.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for QPC
/// Gantree: QpcError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QpcError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Missing or unknown backend name, malformed platform
    /// Gantree: Configuration(String) // 설정
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Program requests more qubits than the platform provides
    #[error("Number of qubits requested in program ({requested}) is greater than the qubits available in platform ({available})")]
    QubitCapacityExceeded { requested: usize, available: usize },

    /// Unknown option key or value
    /// Gantree: UnknownOption{{option,value}} // 옵션
    #[error("Unknown option '{value}' set for {option}")]
    UnknownOption { option: String, value: String },

    // ========================================================================
    // Composition Errors
    // ========================================================================
    /// Operand index outside the declared qubit/register range
    /// Gantree: OperandOutOfRange{{op,operand}} // 피연산자 범위
    #[error("Out of range operand(s) for operation: '{operation}' (op={operand}, qubit_count={qubit_count}, creg_count={creg_count})")]
    OperandOutOfRange {
        operation: String,
        operand: usize,
        qubit_count: usize,
        creg_count: usize,
    },

    /// Kernel name already present in the program
    #[error("Cannot add kernel. Duplicate kernel name: {0}")]
    DuplicateKernel(String),

    /// Construct the lowering does not support (nested for)
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// compile() called on a program without kernels
    #[error("Compiling a program with no kernels: {0}")]
    EmptyProgram(String),

    // ========================================================================
    // Scheduling Errors
    // ========================================================================
    /// Bundler input not ordered by cycle
    /// Gantree: OrderingViolation{{cycle,current}} // 순서 위반
    #[error("Circuit not ordered by cycle value: operation '{operation}' at cycle {cycle} follows cycle {current}")]
    OrderingViolation {
        operation: String,
        cycle: usize,
        current: usize,
    },

    /// Bundler input contains an operation without a cycle
    #[error("Operation '{0}' has not been scheduled")]
    Unscheduled(String),

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// Error raised by a backend during dispatch
    /// Gantree: Backend(String) // 백엔드
    #[error("Backend error: {0}")]
    Backend(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error (missing or unwritable output directory)
    #[error("File error: {0}")]
    Io(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(String),
}

/// Result type alias for QPC operations
/// Gantree: QpcResult<T> // type alias
pub type QpcResult<T> = Result<T, QpcError>;

// ============================================================================
// Error Kinds
// ============================================================================

/// Coarse error classification reported by every public operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Backend name, platform capacity or option problems
    Configuration,
    /// Operand exceeds declared qubit/register count
    OperandRange,
    /// Kernel name collision
    DuplicateKernel,
    /// Nested for constructs
    UnsupportedFeature,
    /// No kernels to compile
    EmptyProgram,
    /// Bundler precondition violated
    OrderingViolation,
    /// Backend raised an error
    BackendFailure,
    /// Artifact could not be written
    IoFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "ConfigurationError",
            ErrorKind::OperandRange => "OperandRangeError",
            ErrorKind::DuplicateKernel => "DuplicateKernelError",
            ErrorKind::UnsupportedFeature => "UnsupportedFeatureError",
            ErrorKind::EmptyProgram => "EmptyProgramError",
            ErrorKind::OrderingViolation => "OrderingViolationError",
            ErrorKind::BackendFailure => "BackendFailure",
            ErrorKind::IoFailure => "IOFailure",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QpcError {
    fn from(err: serde_json::Error) -> Self {
        QpcError::Json(err.to_string())
    }
}

impl From<std::io::Error> for QpcError {
    fn from(err: std::io::Error) -> Self {
        QpcError::Io(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QpcError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QpcError::Configuration(_)
            | QpcError::QubitCapacityExceeded { .. }
            | QpcError::UnknownOption { .. } => ErrorKind::Configuration,
            QpcError::OperandOutOfRange { .. } => ErrorKind::OperandRange,
            QpcError::DuplicateKernel(_) => ErrorKind::DuplicateKernel,
            QpcError::UnsupportedFeature(_) => ErrorKind::UnsupportedFeature,
            QpcError::EmptyProgram(_) => ErrorKind::EmptyProgram,
            QpcError::OrderingViolation { .. } | QpcError::Unscheduled(_) => {
                ErrorKind::OrderingViolation
            }
            QpcError::Backend(_) => ErrorKind::BackendFailure,
            QpcError::Io(_) | QpcError::Json(_) => ErrorKind::IoFailure,
        }
    }

    /// Check if error comes from configuration
    pub fn is_configuration_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Check if error is a structural validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::OperandRange
                | ErrorKind::DuplicateKernel
                | ErrorKind::UnsupportedFeature
                | ErrorKind::EmptyProgram
                | ErrorKind::OrderingViolation
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
