// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use vliw_sched::analysis::deps::DepGraph;
use vliw_sched::program::Program;
use vliw_sched::schedule::{IssuePolicy, SchedConfig, Schedule, schedule};
use vliw_sched::trace::TraceMask;
use vliw_sched::vm::{ExecutionContext, Vm};
use vliw_sched_wind_tunnel::{chain, fanout, inputs, layered};

/// Entry point for `vliw_sched` wind-tunnel benchmarks.
///
/// Covers the three pipeline stages separately (dependency analysis, scheduling, execution) over
/// shapes that stress different parts of the scheduler: long chains keep the ready set tiny,
/// fanout floods it, and layered DAGs mix both.
fn bench_sched(c: &mut Criterion) {
    bench_dep_graph(c);
    bench_schedule_widths(c);
    bench_schedule_policies(c);
    bench_vm_run(c);
}

fn shapes() -> Vec<(&'static str, Program)> {
    vec![
        ("chain_1000", chain(1_000).unwrap()),
        ("fanout_1000", fanout(1_000).unwrap()),
        ("layered_32x32", layered(32, 32).unwrap()),
    ]
}

/// Cost of building the dependency graph, which dominates for wide programs.
fn bench_dep_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("dep_graph");
    for (name, program) in shapes() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &program, |b, p| {
            b.iter(|| DepGraph::build(black_box(p)));
        });
    }
    group.finish();
}

/// Scheduling a prebuilt graph across bundle widths.
fn bench_schedule_widths(c: &mut Criterion) {
    let program = layered(32, 32).unwrap();
    let graph = DepGraph::build(&program);
    let mut group = c.benchmark_group("schedule_layered_32x32");
    for &width in &[1_usize, 2, 4, 8, 32] {
        let cfg = SchedConfig::new(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &cfg, |b, cfg| {
            b.iter(|| schedule(black_box(&program), &graph, cfg).unwrap());
        });
    }
    group.finish();
}

/// Blocking versus pipelined issue on the fanout shape.
fn bench_schedule_policies(c: &mut Criterion) {
    let program = fanout(1_000).unwrap();
    let graph = DepGraph::build(&program);
    let mut group = c.benchmark_group("schedule_fanout_1000_w8");
    for (name, issue) in [
        ("blocking", IssuePolicy::Blocking),
        ("pipelined", IssuePolicy::Pipelined),
    ] {
        let cfg = SchedConfig::new(8).with_issue_policy(issue);
        group.bench_with_input(BenchmarkId::from_parameter(name), &cfg, |b, cfg| {
            b.iter(|| schedule(black_box(&program), &graph, cfg).unwrap());
        });
    }
    group.finish();
}

/// Replaying a schedule with a reused execution context.
fn bench_vm_run(c: &mut Criterion) {
    let vm = Vm::default();
    let bindings = inputs();
    let mut group = c.benchmark_group("vm_run_w4");
    for (name, program) in shapes() {
        let s = Schedule::build(&program, &SchedConfig::new(4)).unwrap();
        let mut ctx = ExecutionContext::new();
        group.bench_with_input(BenchmarkId::from_parameter(name), &program, |b, p| {
            b.iter(|| {
                vm.run_with_ctx(&mut ctx, p, &s, &bindings, TraceMask::NONE, None)
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sched);
criterion_main!(benches);
