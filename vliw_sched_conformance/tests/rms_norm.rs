// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use vliw_sched::program::Program;
use vliw_sched::schedule::{IssuePolicy, SchedConfig, Schedule};
use vliw_sched::trace::TraceMask;
use vliw_sched::value::Value;
use vliw_sched::vm::Vm;
use vliw_sched_conformance::WIDTHS;
use vliw_sched_conformance::programs::{
    dot_product, rms_inputs, rms_norm_newton, rms_norm_quake, scheduling_demo,
};
use vliw_sched_conformance::reference::{self, RmsInputs};

fn norms(program: &Program, width: usize) -> [f64; 3] {
    let s = Schedule::build(program, &SchedConfig::new(width)).unwrap();
    let run = Vm::default()
        .run(
            program,
            &s,
            &rms_inputs(&RmsInputs::SAMPLE),
            TraceMask::NONE,
            None,
        )
        .unwrap();
    assert_eq!(run.outputs.len(), 3);
    core::array::from_fn(|i| match run.outputs.get(&format!("norm{i}")) {
        Some(Value::F64(v)) => v,
        other => panic!("norm{i}: {other:?}"),
    })
}

#[test]
fn newton_kernel_matches_direct_computation() {
    let expected = reference::rms_norm_newton(&RmsInputs::SAMPLE);
    for width in [2, 50] {
        assert_eq!(norms(&rms_norm_newton().unwrap(), width), expected);
    }
}

#[test]
fn quake_kernel_matches_direct_computation() {
    let expected = reference::rms_norm_quake(&RmsInputs::SAMPLE);
    for width in [2, 50] {
        assert_eq!(norms(&rms_norm_quake().unwrap(), width), expected);
    }
}

#[test]
fn both_kernels_approximate_the_exact_norm() {
    let exact = reference::rms_norm_exact(&RmsInputs::SAMPLE);
    let newton = norms(&rms_norm_newton().unwrap(), 4);
    let quake = norms(&rms_norm_quake().unwrap(), 4);
    for i in 0..3 {
        assert!((newton[i] - exact[i]).abs() / exact[i] < 1e-6, "newton[{i}]");
        assert!((quake[i] - exact[i]).abs() / exact[i] < 2e-3, "quake[{i}]");
    }
}

#[test]
fn completion_cycles_under_blocking_issue() {
    let cases: [(Program, [u64; 6]); 4] = [
        (scheduling_demo().unwrap(), [17, 13, 13, 13, 13, 13]),
        (dot_product().unwrap(), [18, 13, 10, 10, 10, 10]),
        (rms_norm_newton().unwrap(), [99, 71, 57, 55, 51, 49]),
        (rms_norm_quake().unwrap(), [95, 61, 47, 43, 37, 35]),
    ];
    for (program, expected) in cases {
        let got = WIDTHS.map(|w| {
            let cfg = SchedConfig::new(w).with_issue_policy(IssuePolicy::Blocking);
            Schedule::build(&program, &cfg).unwrap().completion_cycle()
        });
        assert_eq!(got, expected);
    }
}

#[test]
fn completion_cycles_under_pipelined_issue() {
    let cases: [(Program, [u64; 6]); 4] = [
        (scheduling_demo().unwrap(), [13, 13, 13, 13, 13, 13]),
        (dot_product().unwrap(), [11, 10, 10, 10, 10, 10]),
        (rms_norm_newton().unwrap(), [59, 51, 49, 49, 49, 49]),
        (rms_norm_quake().unwrap(), [48, 38, 35, 35, 35, 35]),
    ];
    for (program, expected) in cases {
        let got = WIDTHS.map(|w| {
            Schedule::build(&program, &SchedConfig::new(w))
                .unwrap()
                .completion_cycle()
        });
        assert_eq!(got, expected);
    }
}
