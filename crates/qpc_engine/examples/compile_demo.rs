//! QPC Compile Demo
//!
//! Builds a small program with every control-flow construct and compiles it
//! for the CC-Light platform, writing all artifacts into a scratch directory.
//!
//! Run with `RUST_LOG=info` to follow the pipeline.

use qpc_core::{Condition, KernelBuilder, Platform, Program};
use qpc_engine::prelude::*;
use std::fs;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let output_dir = std::env::temp_dir().join("qpc_compile_demo");
    fs::create_dir_all(&output_dir)?;

    let platform = Platform::surface7();
    let mut program = Program::new("demo", platform.clone(), 3, 2)?;

    let init = KernelBuilder::new("init", &platform)
        .prepz(0)
        .prepz(1)
        .prepz(2)
        .build();
    program.add(init)?;

    let flip = KernelBuilder::new("flip", &platform).x(0).h(1).h(1).build();
    let keep = KernelBuilder::new("keep", &platform).identity(0).y(2).build();
    program.add_if_else(flip, keep, Condition::new("==", [0, 1]))?;

    let body = KernelBuilder::new("body", &platform)
        .h(0)
        .toffoli(0, 1, 2)
        .measure(2)
        .build();
    program.add_for(body, 4)?;

    let poll = KernelBuilder::new("poll", &platform)
        .measure(0)
        .classical("add", &[0, 1])
        .build();
    program.add_do_while(poll, Condition::new("<", [0, 1]))?;

    program.set_sweep_points(&[0.0, 0.25, 0.5, 0.75]);

    let options = CompileOptions::verbose_output(&output_dir)
        .with_optimize(true)
        .with_decompose_toffoli("AM")
        .with_unique_output(true);
    println!("{}", options);

    let compiler = Compiler::new(options);
    let report = compiler.compile(&mut program)?;

    println!("Status: {}", report.status);
    println!("Stages: {:?}", report.stages);
    if let Some(stats) = report.optimization {
        println!(
            "Peephole: {} -> {} gates ({:.1}% removed)",
            stats.gates_before,
            stats.gates_after,
            stats.reduction_ratio() * 100.0
        );
    }
    println!("Toffoli gates decomposed: {}", report.toffolis_decomposed);
    println!("Artifacts ({}):", report.artifact_name);
    for path in &report.files_written {
        println!("  {}", path.display());
    }

    std::process::exit(report.exit_code());
}
