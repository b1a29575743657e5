//! # QPC Schedule
//!
//! Cycle bundling, list scheduling and kernel statistics for the Quantum
//! Program Compiler.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qpc_schedule // L3: Scheduling
//!     L3_Scheduling // 스케줄링
//!         Bundle // 번들
//!         Bundler // 사이클 번들러
//!         Render // 번들 출력, wait 복원
//!         Scheduler // ASAP/ALAP 리스트 스케줄러
//!         Statistics // 커널 통계
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qpc_schedule::prelude::*;
//! use qpc_core::{KernelBuilder, Platform};
//!
//! let platform = Platform::surface7();
//! let mut kernel = KernelBuilder::new("bell", &platform)
//!     .h(0)
//!     .cnot(0, 1)
//!     .measure(0)
//!     .measure(1)
//!     .build();
//!
//! ListScheduler::asap().schedule(&mut kernel, &platform).unwrap();
//!
//! let bundles = Bundler::bundle(kernel.circuit(), platform.cycle_time).unwrap();
//! println!("{}", render_bundles(&bundles));
//! println!("Depth: {} cycles", Bundler::depth(&bundles));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Time bundles (Gantree: L3_Scheduling → Bundle)
pub mod bundle;

/// Cycle bundler (Gantree: L3_Scheduling → Bundler)
pub mod bundler;

/// Bundle rendering (Gantree: L3_Scheduling → Render)
pub mod render;

/// Scheduler contract and list scheduler (Gantree: L3_Scheduling → Scheduler)
pub mod scheduler;

/// Kernel statistics (Gantree: L3_Scheduling → Statistics)
pub mod stats;

// ============================================================================
// Re-exports
// ============================================================================

pub use bundle::Bundle;
pub use bundler::Bundler;
pub use render::{bundle_start_cycles, render_bundles, render_kernel};
pub use scheduler::{ListScheduler, ScheduleDiagnostics, Scheduler, SchedulerKind, FIRST_CYCLE};
pub use stats::{report_statistics, KernelStatistics};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qpc_schedule::prelude::*;
    //! ```

    pub use crate::bundle::Bundle;
    pub use crate::bundler::Bundler;
    pub use crate::render::{bundle_start_cycles, render_bundles, render_kernel};
    pub use crate::scheduler::{ListScheduler, ScheduleDiagnostics, Scheduler, SchedulerKind};
    pub use crate::stats::{report_statistics, KernelStatistics};
}

// ============================================================================
// Integration Tests
// ============================================================================
