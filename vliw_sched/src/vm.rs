// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bundle-timeline executor.
//!
//! The VM replays a [`Schedule`] against a fresh register file: bundles run in start-cycle order
//! and the members of a bundle run in program order. A register written at cycle `t` by an
//! instruction of latency `l` becomes readable at `t + l`; reading it earlier traps with
//! [`Trap::OperandNotReady`]. Schedules produced by [`crate::schedule::schedule`] never trigger
//! that trap.
//!
//! Operand names resolve against registers first and input [`Bindings`] second. Input bindings
//! are readable from cycle 0.

use core::fmt;

use alloc::boxed::Box;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::instr::{InstrId, Instruction, Operand};
use crate::opcode::Opcode;
use crate::program::Program;
use crate::regfile::RegFile;
use crate::report::RunSummary;
use crate::schedule::Schedule;
use crate::trace::{InstrEvent, TraceCtx, TraceMask, TraceSink};
use crate::value::{Value, ValueKind};

/// Execution limits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of instructions executed per run.
    pub fuel: u64,
    /// Latest cycle at which a bundle may issue.
    pub max_cycle: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            fuel: 10_000_000,
            max_cycle: u64::MAX,
        }
    }
}

/// A runtime trap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    /// An operand named neither a register nor an input binding.
    UndefinedOperand {
        /// Operand field.
        operand: Operand,
        /// The unresolved name.
        name: Box<str>,
    },
    /// A required operand field was empty.
    MissingOperand {
        /// Operand field.
        operand: Operand,
    },
    /// A register was read before its producer's latency elapsed.
    OperandNotReady {
        /// Register name.
        name: Box<str>,
        /// Cycle at which the value becomes readable.
        ready_at: u64,
    },
    /// Division by zero.
    DivByZero,
    /// Integer arithmetic overflowed.
    IntOverflow,
    /// An integer did not fit the 32-bit pattern `ITOF` expects.
    IntCastOverflow {
        /// The offending value.
        value: i64,
    },
    /// An operand had the wrong kind.
    TypeMismatch {
        /// Kind the opcode requires.
        expected: ValueKind,
        /// Kind found.
        actual: ValueKind,
    },
    /// The instruction budget in [`Limits::fuel`] ran out.
    FuelExceeded,
    /// A bundle was scheduled past [`Limits::max_cycle`].
    CycleLimitExceeded {
        /// The configured limit.
        limit: u64,
    },
    /// The schedule was built for a different program.
    ScheduleMismatch {
        /// Instructions in the program.
        program: usize,
        /// Instructions covered by the schedule.
        schedule: usize,
    },
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedOperand { operand, name } => {
                write!(f, "undefined {operand} operand `{name}`")
            }
            Self::MissingOperand { operand } => write!(f, "missing {operand} operand"),
            Self::OperandNotReady { name, ready_at } => {
                write!(f, "register `{name}` not ready until cycle {ready_at}")
            }
            Self::DivByZero => write!(f, "division by zero"),
            Self::IntOverflow => write!(f, "integer overflow"),
            Self::IntCastOverflow { value } => {
                write!(f, "integer {value} does not fit in 32 bits")
            }
            Self::TypeMismatch { expected, actual } => {
                write!(f, "type mismatch: expected {expected}, got {actual}")
            }
            Self::FuelExceeded => write!(f, "fuel exceeded"),
            Self::CycleLimitExceeded { limit } => write!(f, "cycle limit {limit} exceeded"),
            Self::ScheduleMismatch { program, schedule } => write!(
                f,
                "schedule does not match program: program={program} schedule={schedule}"
            ),
        }
    }
}

impl core::error::Error for Trap {}

/// A trap with the location that raised it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrapInfo {
    /// Offending instruction, `None` when the trap is not tied to one.
    pub instr: Option<InstrId>,
    /// Opcode of the offending instruction.
    pub opcode: Option<Opcode>,
    /// Issue cycle of the bundle being executed.
    pub cycle: u64,
    /// The trap.
    pub trap: Trap,
}

impl fmt::Display for TrapInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trap at cycle {}", self.cycle)?;
        if let Some(instr) = self.instr {
            write!(f, " in instruction {instr}")?;
        }
        if let Some(opcode) = self.opcode {
            write!(f, " ({opcode})")?;
        }
        write!(f, ": {}", self.trap)
    }
}

impl core::error::Error for TrapInfo {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.trap)
    }
}

/// Named input values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bindings {
    values: HashMap<Box<str>, Value>,
}

impl Bindings {
    /// Creates an empty binding set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a binding, builder style.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a binding, returning the previous value.
    pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Returns the value bound to `name`.
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a, V: Into<Value>> FromIterator<(&'a str, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (&'a str, V)>>(iter: I) -> Self {
        let mut b = Self::new();
        for (name, value) in iter {
            b.insert(name, value);
        }
        b
    }
}

/// Output slots written by `STORE`, ordered by the first `STORE` to each slot in program order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outputs {
    slots: Vec<(Box<str>, Value)>,
}

impl Outputs {
    /// Value stored in slot `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots
            .iter()
            .find(|(slot, _)| &**slot == name)
            .map(|&(_, v)| v)
    }

    /// Value of the `index`-th slot.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<Value> {
        self.slots.get(index).map(|&(_, v)| v)
    }

    /// The only output, if exactly one slot was written.
    #[must_use]
    pub fn single(&self) -> Option<Value> {
        match self.slots.as_slice() {
            [(_, v)] => Some(*v),
            _ => None,
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no slot was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates `(slot, value)` pairs in slot order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, Value)> + '_ {
        self.slots.iter().map(|(name, v)| (&**name, *v))
    }
}

/// Result of a successful run.
#[derive(Clone, Debug, PartialEq)]
pub struct Execution {
    /// Stored outputs.
    pub outputs: Outputs,
    /// Cycle at which the last result became available.
    pub completion_cycle: u64,
    /// Instructions executed.
    pub instructions_executed: usize,
    /// Bundles executed.
    pub bundles_executed: usize,
}

impl Execution {
    /// Returns the run counters without the outputs.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            bundles_executed: self.bundles_executed,
            instructions_executed: self.instructions_executed,
            completion_cycle: self.completion_cycle,
        }
    }
}

/// Reusable per-run state.
///
/// Passing the same context to [`Vm::run_with_ctx`] across runs keeps the register file and slot
/// allocations alive.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    regs: RegFile,
    slots: Vec<(Box<str>, Option<Value>)>,
}

impl ExecutionContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registers written by the last run.
    #[must_use]
    pub fn register_count(&self) -> usize {
        self.regs.len()
    }

    fn reset(&mut self, program: &Program) {
        self.regs.clear();
        self.slots.clear();
        for slot in program.instructions().iter().filter_map(Instruction::output_slot) {
            if !self.slots.iter().any(|(name, _)| &**name == slot) {
                self.slots.push((slot.into(), None));
            }
        }
    }

    fn store(&mut self, slot: &str, value: Value) {
        if let Some((_, v)) = self.slots.iter_mut().find(|(name, _)| &**name == slot) {
            *v = Some(value);
        }
    }

    fn take_outputs(&mut self) -> Outputs {
        Outputs {
            slots: self
                .slots
                .drain(..)
                .filter_map(|(name, v)| v.map(|v| (name, v)))
                .collect(),
        }
    }
}

/// Schedule executor.
#[derive(Clone, Debug, Default)]
pub struct Vm {
    limits: Limits,
}

impl Vm {
    /// Creates a VM with `limits`.
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    /// Returns the configured limits.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Executes `schedule` with a fresh context.
    pub fn run(
        &self,
        program: &Program,
        schedule: &Schedule,
        bindings: &Bindings,
        mask: TraceMask,
        trace: Option<&mut dyn TraceSink>,
    ) -> Result<Execution, TrapInfo> {
        let mut ctx = ExecutionContext::new();
        self.run_with_ctx(&mut ctx, program, schedule, bindings, mask, trace)
    }

    /// Executes `schedule`, reusing `ctx`.
    pub fn run_with_ctx(
        &self,
        ctx: &mut ExecutionContext,
        program: &Program,
        schedule: &Schedule,
        bindings: &Bindings,
        mask: TraceMask,
        trace: Option<&mut dyn TraceSink>,
    ) -> Result<Execution, TrapInfo> {
        let mut tracer = TraceCtx::new(mask, trace);
        let mut summary = RunSummary::default();
        tracer.run_start(program, schedule);
        let result = self.execute(ctx, program, schedule, bindings, &mut tracer, &mut summary);
        tracer.run_end(program, &summary, result.as_ref().err());
        result?;
        Ok(Execution {
            outputs: ctx.take_outputs(),
            completion_cycle: summary.completion_cycle,
            instructions_executed: summary.instructions_executed,
            bundles_executed: summary.bundles_executed,
        })
    }

    fn execute(
        &self,
        ctx: &mut ExecutionContext,
        program: &Program,
        schedule: &Schedule,
        bindings: &Bindings,
        tracer: &mut TraceCtx<'_>,
        summary: &mut RunSummary,
    ) -> Result<(), TrapInfo> {
        let mismatch = Trap::ScheduleMismatch {
            program: program.len(),
            schedule: schedule.instr_count(),
        };
        if program.len() != schedule.instr_count() {
            return Err(TrapInfo {
                instr: None,
                opcode: None,
                cycle: 0,
                trap: mismatch,
            });
        }
        ctx.reset(program);

        let mut fuel = self.limits.fuel;
        for (index, bundle) in schedule.bundles().iter().enumerate() {
            let cycle = bundle.start_cycle();
            if cycle > self.limits.max_cycle {
                let first = bundle.instrs().first().copied();
                return Err(TrapInfo {
                    instr: first,
                    opcode: first.and_then(|id| program.get(id)).map(|i| i.opcode),
                    cycle,
                    trap: Trap::CycleLimitExceeded {
                        limit: self.limits.max_cycle,
                    },
                });
            }

            tracer.bundle_start(program, index, bundle);
            for &id in bundle.instrs() {
                let Some(instr) = program.get(id) else {
                    return Err(TrapInfo {
                        instr: Some(id),
                        opcode: None,
                        cycle,
                        trap: mismatch,
                    });
                };
                let fail = |trap| TrapInfo {
                    instr: Some(id),
                    opcode: Some(instr.opcode),
                    cycle,
                    trap,
                };

                if fuel == 0 {
                    return Err(fail(Trap::FuelExceeded));
                }
                fuel -= 1;

                let value = eval(&ctx.regs, bindings, instr, cycle).map_err(fail)?;
                let ready_at = cycle + u64::from(schedule.latency(id).unwrap_or(1));
                let target = match instr.output_slot() {
                    Some(slot) => {
                        ctx.store(slot, value);
                        slot
                    }
                    None => {
                        let dest = instr.writes().ok_or_else(|| {
                            fail(Trap::MissingOperand {
                                operand: Operand::Dest,
                            })
                        })?;
                        ctx.regs.write(dest, value, ready_at);
                        dest
                    }
                };

                summary.instructions_executed += 1;
                summary.completion_cycle = summary.completion_cycle.max(ready_at);
                tracer.instr(
                    program,
                    InstrEvent {
                        id,
                        cycle,
                        ready_at,
                        target,
                        value,
                    },
                );
            }
            summary.bundles_executed += 1;
            tracer.bundle_end(program, index, bundle);
        }
        Ok(())
    }
}

fn eval(
    regs: &RegFile,
    bindings: &Bindings,
    instr: &Instruction,
    cycle: u64,
) -> Result<Value, Trap> {
    let read = |operand| read_operand(regs, bindings, instr, operand, cycle);
    let a = read(Operand::Src1)?;
    match instr.opcode {
        Opcode::Load | Opcode::Move | Opcode::Store => Ok(a),
        Opcode::Add => a.checked_add(read(Operand::Src2)?),
        Opcode::Sub => a.checked_sub(read(Operand::Src2)?),
        Opcode::Mul => a.checked_mul(read(Operand::Src2)?),
        Opcode::Div => a.true_div(read(Operand::Src2)?),
        Opcode::Ftoi => Ok(a.float_bits()),
        Opcode::Itof => a.bits_float(),
        Opcode::Shr => a.shift_right(instr.size),
    }
}

fn read_operand(
    regs: &RegFile,
    bindings: &Bindings,
    instr: &Instruction,
    operand: Operand,
    cycle: u64,
) -> Result<Value, Trap> {
    let name = instr
        .operand(operand)
        .ok_or(Trap::MissingOperand { operand })?;
    if let Some(slot) = regs.get(name) {
        if slot.ready_at > cycle {
            return Err(Trap::OperandNotReady {
                name: name.into(),
                ready_at: slot.ready_at,
            });
        }
        return Ok(slot.value);
    }
    bindings
        .get(name)
        .ok_or_else(|| Trap::UndefinedOperand {
            operand,
            name: name.into(),
        })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::schedule::{Bundle, IssuePolicy, SchedConfig};
    use alloc::vec;
    use std::vec::Vec;

    fn dot_demo() -> Program {
        Program::new(vec![
            Instruction::load("R1", "input0", 16),
            Instruction::load("R2", "input1", 16),
            Instruction::add("R3", "R1", "R2"),
            Instruction::load("R4", "input2", 16),
            Instruction::mul("R5", "R3", "R4"),
            Instruction::new(Opcode::Store, None, Some("R5"), None, 1),
        ])
        .unwrap()
    }

    fn dot_inputs() -> Bindings {
        Bindings::new()
            .with("input0", 3)
            .with("input1", 5)
            .with("input2", 10)
    }

    fn run(program: &Program, width: usize, bindings: &Bindings) -> Result<Execution, TrapInfo> {
        let schedule = Schedule::build(program, &SchedConfig::new(width)).unwrap();
        Vm::default().run(program, &schedule, bindings, TraceMask::NONE, None)
    }

    #[test]
    fn dot_product_evaluates_at_every_width() {
        let p = dot_demo();
        for width in [1, 2, 4] {
            let exec = run(&p, width, &dot_inputs()).unwrap();
            assert_eq!(exec.outputs.single(), Some(Value::I64(80)));
            assert_eq!(exec.outputs.get("OUTPUT"), Some(Value::I64(80)));
            assert_eq!(exec.instructions_executed, 6);
        }
        let wide = run(&p, 4, &dot_inputs()).unwrap();
        assert_eq!(wide.completion_cycle, 10);
        assert_eq!(wide.bundles_executed, 4);
    }

    #[test]
    fn reloading_a_register_does_not_overtake_its_reader() {
        let p = Program::new(vec![
            Instruction::load("R1", "a", 1),
            Instruction::load("R6", "x", 1),
            Instruction::add("R7", "R6", "R6"),
            Instruction::add("R2", "R1", "R7"),
            Instruction::load("R1", "b", 1),
            Instruction::store("out", "R2", 1),
        ])
        .unwrap();
        let inputs = Bindings::new().with("a", 100).with("b", 1).with("x", 10);
        for issue in [IssuePolicy::Pipelined, IssuePolicy::Blocking] {
            for width in 1..=4 {
                let cfg = SchedConfig::new(width).with_issue_policy(issue);
                let s = Schedule::build(&p, &cfg).unwrap();
                let exec = Vm::default()
                    .run(&p, &s, &inputs, TraceMask::NONE, None)
                    .unwrap();
                assert_eq!(exec.outputs.get("out"), Some(Value::I64(120)), "{issue:?} {width}");
            }
        }
    }

    #[test]
    fn outputs_follow_first_store_in_program_order() {
        let p = Program::new(vec![
            Instruction::load("R1", "a", 1),
            Instruction::mul("R2", "R1", "R1"),
            Instruction::store("square", "R2", 1),
            Instruction::store("plain", "R1", 1),
        ])
        .unwrap();
        let exec = run(&p, 4, &Bindings::new().with("a", 1.5)).unwrap();
        let slots: Vec<_> = exec.outputs.iter().collect();
        assert_eq!(
            slots,
            [("square", Value::F64(2.25)), ("plain", Value::F64(1.5))]
        );
        assert_eq!(exec.outputs.value_at(1), Some(Value::F64(1.5)));
        assert_eq!(exec.outputs.single(), None);
    }

    #[test]
    fn undefined_binding_reports_the_instruction() {
        let err = run(&dot_demo(), 2, &Bindings::new().with("input0", 1)).unwrap_err();
        assert_eq!(
            err,
            TrapInfo {
                instr: Some(InstrId::new(1)),
                opcode: Some(Opcode::Load),
                cycle: 0,
                trap: Trap::UndefinedOperand {
                    operand: Operand::Src1,
                    name: "input1".into(),
                },
            }
        );
    }

    #[test]
    fn division_by_zero_traps() {
        let p = Program::new(vec![
            Instruction::load("R1", "a", 1),
            Instruction::load("R2", "b", 1),
            Instruction::div("R3", "R1", "R2"),
        ])
        .unwrap();
        let err = run(&p, 2, &Bindings::new().with("a", 1).with("b", 0)).unwrap_err();
        assert_eq!(err.trap, Trap::DivByZero);
        assert_eq!(err.instr, Some(InstrId::new(2)));
        assert_eq!(err.cycle, 3);
    }

    #[test]
    fn missing_source_operand_traps() {
        let p = Program::new(vec![Instruction::new(
            Opcode::Load,
            Some("R1"),
            None,
            None,
            16,
        )])
        .unwrap();
        let err = run(&p, 1, &Bindings::new()).unwrap_err();
        assert_eq!(
            err.trap,
            Trap::MissingOperand {
                operand: Operand::Src1
            }
        );
    }

    #[test]
    fn reading_before_latency_elapses_traps() {
        let p = dot_demo();
        // ADD fused into the load bundle.
        let bad = Schedule::from_bundles(
            &p,
            &SchedConfig::new(4),
            vec![
                Bundle::new(0, vec![InstrId::new(0), InstrId::new(1), InstrId::new(3)]),
                Bundle::new(1, vec![InstrId::new(2)]),
                Bundle::new(5, vec![InstrId::new(4)]),
                Bundle::new(7, vec![InstrId::new(5)]),
            ],
        );
        let err = Vm::default()
            .run(&p, &bad, &dot_inputs(), TraceMask::NONE, None)
            .unwrap_err();
        assert_eq!(
            err.trap,
            Trap::OperandNotReady {
                name: "R1".into(),
                ready_at: 4,
            }
        );
        assert_eq!(err.instr, Some(InstrId::new(2)));
    }

    #[test]
    fn fuel_and_cycle_limits_trap() {
        let p = dot_demo();
        let cfg = SchedConfig::new(2).with_issue_policy(IssuePolicy::Blocking);
        let s = Schedule::build(&p, &cfg).unwrap();
        let starved = Vm::new(Limits {
            fuel: 3,
            ..Limits::default()
        });
        let err = starved
            .run(&p, &s, &dot_inputs(), TraceMask::NONE, None)
            .unwrap_err();
        assert_eq!(err.trap, Trap::FuelExceeded);
        assert_eq!(err.instr, Some(InstrId::new(3)));

        let short = Vm::new(Limits {
            max_cycle: 5,
            ..Limits::default()
        });
        let err = short
            .run(&p, &s, &dot_inputs(), TraceMask::NONE, None)
            .unwrap_err();
        assert_eq!(err.trap, Trap::CycleLimitExceeded { limit: 5 });
        assert_eq!(err.cycle, 8);
    }

    #[test]
    fn schedule_for_another_program_is_rejected() {
        let s = Schedule::build(&dot_demo(), &SchedConfig::new(2)).unwrap();
        let other = Program::new(vec![Instruction::load("R1", "a", 1)]).unwrap();
        let err = Vm::default()
            .run(&other, &s, &Bindings::new(), TraceMask::NONE, None)
            .unwrap_err();
        assert_eq!(
            err.trap,
            Trap::ScheduleMismatch {
                program: 1,
                schedule: 6,
            }
        );
    }

    #[test]
    fn context_reuse_starts_from_a_clean_register_file() {
        let p = dot_demo();
        let s = Schedule::build(&p, &SchedConfig::new(2)).unwrap();
        let vm = Vm::default();
        let mut ctx = ExecutionContext::new();
        let first = vm
            .run_with_ctx(&mut ctx, &p, &s, &dot_inputs(), TraceMask::NONE, None)
            .unwrap();
        assert_eq!(ctx.register_count(), 5);
        let other = dot_inputs().with("input2", 2);
        let second = vm
            .run_with_ctx(&mut ctx, &p, &s, &other, TraceMask::NONE, None)
            .unwrap();
        assert_eq!(first.outputs.single(), Some(Value::I64(80)));
        assert_eq!(second.outputs.single(), Some(Value::I64(16)));
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<std::string::String>,
    }

    impl TraceSink for Recorder {
        fn run_start(&mut self, _program: &Program, schedule: &Schedule) {
            self.events
                .push(std::format!("run {}", schedule.bundles().len()));
        }

        fn bundle_start(&mut self, _program: &Program, index: usize, bundle: &Bundle) {
            self.events
                .push(std::format!("bundle {index}@{}", bundle.start_cycle()));
        }

        fn instr(&mut self, _program: &Program, event: InstrEvent<'_>) {
            self.events.push(std::format!(
                "{} {}={} ready {}",
                event.id,
                event.target,
                event.value,
                event.ready_at
            ));
        }

        fn run_end(&mut self, _program: &Program, summary: &RunSummary, trap: Option<&TrapInfo>) {
            self.events.push(std::format!(
                "end {} {}",
                summary.instructions_executed,
                trap.is_some()
            ));
        }
    }

    #[test]
    fn trace_mask_selects_events() {
        let p = dot_demo();
        let s = Schedule::build(&p, &SchedConfig::new(4)).unwrap();

        let mut rec = Recorder::default();
        Vm::default()
            .run(
                &p,
                &s,
                &dot_inputs(),
                TraceMask::RUN | TraceMask::BUNDLE,
                Some(&mut rec),
            )
            .unwrap();
        assert_eq!(
            rec.events,
            [
                "run 4",
                "bundle 0@0",
                "bundle 1@4",
                "bundle 2@5",
                "bundle 3@7",
                "end 6 false",
            ]
        );

        let mut rec = Recorder::default();
        Vm::default()
            .run(&p, &s, &dot_inputs(), TraceMask::INSTR, Some(&mut rec))
            .unwrap();
        assert_eq!(rec.events.len(), 6);
        assert_eq!(rec.events[4], "#4 R5=80 ready 7");
        assert_eq!(rec.events[5], "#5 OUTPUT=80 ready 10");
    }

    #[test]
    fn run_end_fires_on_trap() {
        let mut rec = Recorder::default();
        let p = dot_demo();
        let s = Schedule::build(&p, &SchedConfig::new(2)).unwrap();
        let _ = Vm::default().run(&p, &s, &Bindings::new(), TraceMask::RUN, Some(&mut rec));
        assert_eq!(rec.events, ["run 5", "end 0 true"]);
    }

    #[test]
    fn trap_info_display_names_the_instruction() {
        let info = TrapInfo {
            instr: Some(InstrId::new(2)),
            opcode: Some(Opcode::Div),
            cycle: 3,
            trap: Trap::DivByZero,
        };
        assert_eq!(
            alloc::string::ToString::to_string(&info),
            "trap at cycle 3 in instruction #2 (DIV): division by zero"
        );
    }
}
