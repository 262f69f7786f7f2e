// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `vliw_sched`: dependency analysis, bundle scheduling and execution for a small VLIW machine
//! model.
//!
//! A [`Program`](program::Program) is a flat list of three-address
//! [`Instruction`](instr::Instruction)s naming registers and input bindings. From it the crate
//! builds a read-after-write [`DepGraph`](analysis::deps::DepGraph), packs instructions into
//! latency-respecting bundles of bounded width ([`schedule`](schedule::schedule)), and replays
//! the resulting [`Schedule`](schedule::Schedule) on a register machine ([`Vm`](vm::Vm)).
//!
//! This crate is `no_std` and uses `alloc`.
//!
//! ## Example
//!
//! ```
//! use vliw_sched::instr::Instruction;
//! use vliw_sched::program::Program;
//! use vliw_sched::schedule::{SchedConfig, Schedule};
//! use vliw_sched::trace::TraceMask;
//! use vliw_sched::value::Value;
//! use vliw_sched::vm::{Bindings, Vm};
//!
//! let program = Program::new(vec![
//!     Instruction::load("R1", "input0", 16),
//!     Instruction::load("R2", "input1", 16),
//!     Instruction::add("R3", "R1", "R2"),
//!     Instruction::load("R4", "input2", 16),
//!     Instruction::mul("R5", "R3", "R4"),
//!     Instruction::store("OUTPUT", "R5", 1),
//! ])?;
//!
//! let schedule = Schedule::build(&program, &SchedConfig::new(2))?;
//! assert_eq!(schedule.bundles().len(), 5);
//! assert_eq!(schedule.completion_cycle(), 10);
//!
//! let inputs = Bindings::new()
//!     .with("input0", 3)
//!     .with("input1", 5)
//!     .with("input2", 10);
//! let run = Vm::default().run(&program, &schedule, &inputs, TraceMask::NONE, None)?;
//! assert_eq!(run.outputs.single(), Some(Value::I64(80)));
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```

#![no_std]

extern crate alloc;

pub mod analysis;
pub mod instr;
pub mod latency;
pub mod opcode;
pub mod program;
pub mod report;
pub mod schedule;
pub mod trace;
pub mod value;
pub mod vm;

mod regfile;
