//! Bundle rendering for QPC
//!
//! Gantree: L3_Scheduling → Render
//!
//! Renders bundles as indented text lines with explicit `wait` gaps, and
//! re-reads the start cycles from such text.

use crate::bundle::Bundle;
use crate::bundler::Bundler;
use qpc_core::{Cycle, DurationNs, Kernel, QpcResult};

/// Indentation of bundle and wait lines
const INDENT: &str = "    ";

/// Render bundles with explicit idle gaps
/// Gantree: render_bundles(bundles) -> String // 번들 출력
///
/// The cursor starts at cycle 1. A gap of more than one cycle between the
/// cursor and a bundle start is written as `wait (gap - 1)`; a last bundle
/// longer than one cycle is followed by `wait (duration - 1)`.
pub fn render_bundles(bundles: &[Bundle<'_>]) -> String {
    let mut out = String::new();
    let mut cursor: i64 = 1;

    for bundle in bundles {
        let delta = bundle.start_cycle as i64 - cursor;
        if delta > 1 {
            out.push_str(&format!("{}wait {}\n", INDENT, delta - 1));
        }
        out.push_str(INDENT);
        out.push_str(&bundle.to_qasm());
        out.push('\n');
        cursor += delta;
    }

    if let Some(last) = bundles.last() {
        if last.duration_in_cycles > 1 {
            out.push_str(&format!("{}wait {}\n", INDENT, last.duration_in_cycles - 1));
        }
    }
    out
}

/// Scheduled kernel section: header followed by its bundles
/// Gantree: render_kernel(kernel,cycle_time) -> Result<String> // 커널 출력
pub fn render_kernel(kernel: &Kernel, cycle_time: DurationNs) -> QpcResult<String> {
    let bundles = Bundler::bundle(kernel.circuit(), cycle_time)?;
    let mut out = kernel.qasm_header();
    out.push_str(&render_bundles(&bundles));
    Ok(out)
}

/// Reconstruct bundle start cycles from rendered text
/// Gantree: bundle_start_cycles(text) -> Vec<Cycle> // 시작 사이클 복원
///
/// Kernel headers, comments and the program header are ignored. The first
/// bundle without a preceding wait starts at cycle 1, later ones one cycle
/// after their predecessor; `wait N` moves the next start N + 1 cycles
/// ahead. A trailing wait is ignored.
///
/// Only a first start of 1 or from 3 on is encoded in the text. A schedule
/// whose first bundle starts at cycle 0 or 2 reads back with that bundle at
/// cycle 1 and every later start shifted by the same amount.
pub fn bundle_start_cycles(text: &str) -> Vec<Cycle> {
    let mut starts = Vec::new();
    let mut cursor: Cycle = 1;
    let mut pending_wait: Option<Cycle> = None;

    for line in text.lines().map(str::trim) {
        if line.is_empty()
            || line.starts_with('.')
            || line.starts_with('#')
            || line.starts_with("version")
            || line.starts_with("qubits")
        {
            continue;
        }

        if let Some(n) = line.strip_prefix("wait ") {
            if let Ok(n) = n.trim().parse::<Cycle>() {
                *pending_wait.get_or_insert(0) += n;
            }
            continue;
        }

        let start = match pending_wait.take() {
            Some(n) => cursor + n + 1,
            None if starts.is_empty() => cursor,
            None => cursor + 1,
        };
        starts.push(start);
        cursor = start;
    }
    starts
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qpc_core::{Condition, KernelKind, Operation};

    fn circuit(cycles: &[(usize, u64)]) -> Vec<Operation> {
        cycles
            .iter()
            .enumerate()
            .map(|(i, &(cycle, duration))| {
                let mut op = Operation::quantum("x", &[i], duration);
                op.set_cycle(cycle);
                op
            })
            .collect()
    }

    #[test]
    fn test_render_single_gap() {
        let ops = circuit(&[(0, 1), (0, 1), (1, 2), (3, 1)]);
        let bundles = Bundler::bundle(&ops, 1).unwrap();
        let text = render_bundles(&bundles);

        assert_eq!(
            text,
            "    { x q[0] | x q[1] }\n    x q[2]\n    wait 1\n    x q[3]\n"
        );
        assert_eq!(text.matches("wait").count(), 1);
    }

    #[test]
    fn test_start_cycles_of_schedule_from_zero_are_shifted() {
        let ops = circuit(&[(0, 1), (0, 1), (1, 2), (3, 1)]);
        let bundles = Bundler::bundle(&ops, 1).unwrap();
        let starts: Vec<Cycle> = bundles.iter().map(|b| b.start_cycle).collect();
        assert_eq!(starts, vec![0, 1, 3]);

        let read_back = bundle_start_cycles(&render_bundles(&bundles));
        assert_eq!(read_back, vec![1, 2, 4]);
    }

    #[test]
    fn test_render_trailing_wait() {
        let ops = circuit(&[(1, 20), (2, 300)]);
        let bundles = Bundler::bundle(&ops, 20).unwrap();
        let text = render_bundles(&bundles);
        assert!(text.ends_with("    x q[1]\n    wait 14\n"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_bundles(&[]), "");
        assert!(bundle_start_cycles("").is_empty());
    }

    #[test]
    fn test_reread_start_cycles() {
        for starts in [vec![1, 2, 5, 6, 10], vec![3, 4, 9], vec![1], vec![7, 20]] {
            let ops = circuit(&starts.iter().map(|&c| (c, 1)).collect::<Vec<_>>());
            let bundles = Bundler::bundle(&ops, 1).unwrap();
            let text = render_bundles(&bundles);
            assert_eq!(bundle_start_cycles(&text), starts, "{}", text);
        }
    }

    #[test]
    fn test_reread_skips_headers() {
        let text = "version 1.0\n# comment\nqubits 2\n\n.k\n    x q[0]\n    wait 2\n    x q[1]\n";
        assert_eq!(bundle_start_cycles(text), vec![1, 4]);
    }

    #[test]
    fn test_render_kernel() {
        let kernel = Kernel::from_operations("k", circuit(&[(1, 20), (1, 20), (4, 20)]));
        let text = render_kernel(&kernel, 20).unwrap();
        assert_eq!(text, ".k\n    { x q[0] | x q[1] }\n    wait 2\n    x q[2]\n");

        let marker = Kernel::marker("k_if", KernelKind::IfStart(Condition::new("==", [0, 1])));
        assert_eq!(
            render_kernel(&marker, 20).unwrap(),
            ".k_if\n    # IF_START r[0] == r[1]\n"
        );
    }
}
