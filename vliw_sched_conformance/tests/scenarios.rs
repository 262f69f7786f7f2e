// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use vliw_sched::analysis::deps::DepGraph;
use vliw_sched::instr::InstrId;
use vliw_sched::schedule::{IssuePolicy, SchedConfig, Schedule, ScheduleError};
use vliw_sched::trace::TraceMask;
use vliw_sched::value::Value;
use vliw_sched::vm::Vm;
use vliw_sched_conformance::programs::{dot_product, dot_product_inputs, scheduling_demo};

fn layout(s: &Schedule) -> Vec<(u64, Vec<u32>)> {
    s.bundles()
        .iter()
        .map(|b| {
            (
                b.start_cycle(),
                b.instrs().iter().map(|i| i.as_u32()).collect(),
            )
        })
        .collect()
}

fn blocking(width: usize) -> SchedConfig {
    SchedConfig::new(width).with_issue_policy(IssuePolicy::Blocking)
}

#[test]
fn width_one_chain_issues_at_reference_cycles() {
    let p = scheduling_demo().unwrap();
    let s = Schedule::build(&p, &blocking(1)).unwrap();
    let starts: Vec<u64> = (0..5)
        .map(|i| s.start_cycle(InstrId::new(i)).unwrap())
        .collect();
    assert_eq!(starts, [0, 4, 5, 11, 13]);
    assert_eq!(s.latencies(), [4, 1, 6, 2, 4]);
    assert!(s.bundles().iter().all(|b| b.len() == 1));
}

#[test]
fn width_two_co_issues_load_and_store() {
    let p = scheduling_demo().unwrap();
    for cfg in [blocking(2), SchedConfig::new(2)] {
        let s = Schedule::build(&p, &cfg).unwrap();
        assert_eq!(
            layout(&s),
            [(0, vec![0, 4]), (4, vec![1]), (5, vec![2]), (11, vec![3])]
        );
        s.check(&p, &DepGraph::build(&p)).unwrap();
    }
}

#[test]
fn pipelined_issue_does_not_wait_for_unrelated_latency() {
    let p = scheduling_demo().unwrap();
    let s = Schedule::build(&p, &SchedConfig::new(1)).unwrap();
    assert_eq!(s.issue_policy(), IssuePolicy::Pipelined);
    assert_eq!(s.start_cycle(InstrId::new(4)), Some(1));
    assert_eq!(s.start_cycle(InstrId::new(3)), Some(11));
    assert_eq!(s.completion_cycle(), 13);
}

#[test]
fn dot_product_width_two_yields_80() {
    let p = dot_product().unwrap();
    let s = Schedule::build(&p, &blocking(2)).unwrap();
    let run = Vm::default()
        .run(&p, &s, &dot_product_inputs(), TraceMask::NONE, None)
        .unwrap();
    assert_eq!(run.outputs.single(), Some(Value::I64(80)));
    assert_eq!(
        layout(&s),
        [(0, vec![0, 1]), (4, vec![2, 3]), (8, vec![4]), (10, vec![5])]
    );

    let s = Schedule::build(&p, &SchedConfig::new(2)).unwrap();
    let run = Vm::default()
        .run(&p, &s, &dot_product_inputs(), TraceMask::NONE, None)
        .unwrap();
    assert_eq!(run.outputs.single(), Some(Value::I64(80)));
    assert_eq!(s.completion_cycle(), 10);
}

#[test]
fn dot_product_width_four_is_faster_with_the_same_result() {
    let p = dot_product().unwrap();
    let two = Schedule::build(&p, &SchedConfig::new(2)).unwrap();
    let four = Schedule::build(&p, &SchedConfig::new(4)).unwrap();
    assert!(four.bundles().len() < two.bundles().len());
    assert!(four.completion_cycle() <= two.completion_cycle());
    assert_eq!(four.bundles()[0].len(), 3);

    let blocked_two = Schedule::build(&p, &blocking(2)).unwrap();
    let blocked_four = Schedule::build(&p, &blocking(4)).unwrap();
    assert!(blocked_four.completion_cycle() < blocked_two.completion_cycle());

    let run = Vm::default()
        .run(&p, &four, &dot_product_inputs(), TraceMask::NONE, None)
        .unwrap();
    assert_eq!(run.outputs.single(), Some(Value::I64(80)));
    assert_eq!(run.completion_cycle, four.completion_cycle());
}

#[test]
fn zero_width_is_rejected() {
    let p = dot_product().unwrap();
    assert_eq!(
        Schedule::build(&p, &SchedConfig::new(0)),
        Err(ScheduleError::ZeroBundleWidth)
    );
}
