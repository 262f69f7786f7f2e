// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic program shapes for the `vliw_sched` wind-tunnel benchmarks.

use vliw_sched::instr::Instruction;
use vliw_sched::program::{Program, ProgramError};
use vliw_sched::vm::Bindings;

fn reg(n: usize) -> String {
    format!("R{n}")
}

/// `len` dependent adds: `R{i} = R{i-1} + one`, ending in one store.
///
/// No two instructions can share a bundle, so width has no effect.
pub fn chain(len: usize) -> Result<Program, ProgramError> {
    let mut instrs = Vec::with_capacity(len + 2);
    instrs.push(Instruction::load(&reg(0), "seed", 1));
    for i in 1..=len {
        instrs.push(Instruction::add(&reg(i), &reg(i - 1), "one"));
    }
    instrs.push(Instruction::store("out", &reg(len), 1));
    Program::new(instrs)
}

/// One load feeding `fanout` independent multiplies, each stored to its own slot.
///
/// Every multiply is ready on the same cycle, so completion shrinks with width.
pub fn fanout(fanout: usize) -> Result<Program, ProgramError> {
    let mut instrs = Vec::with_capacity(2 * fanout + 1);
    instrs.push(Instruction::load("R0", "seed", 16));
    for i in 1..=fanout {
        instrs.push(Instruction::mul(&reg(i), "R0", "two"));
    }
    for i in 1..=fanout {
        instrs.push(Instruction::store(&format!("out{i}"), &reg(i), 1));
    }
    Program::new(instrs)
}

/// `layers` layers of `width` adds; each node reads two neighbours from the previous layer.
pub fn layered(layers: usize, width: usize) -> Result<Program, ProgramError> {
    let width = width.max(1);
    let mut instrs = Vec::with_capacity((layers + 1) * width + 1);
    for j in 0..width {
        instrs.push(Instruction::load(&reg(j), "seed", 16));
    }
    for layer in 1..=layers {
        let prev = (layer - 1) * width;
        let base = layer * width;
        for j in 0..width {
            let a = reg(prev + j);
            let b = reg(prev + (j + 1) % width);
            instrs.push(Instruction::add(&reg(base + j), &a, &b));
        }
    }
    instrs.push(Instruction::store("out", &reg(layers * width), 1));
    Program::new(instrs)
}

/// Bindings every shape reads.
pub fn inputs() -> Bindings {
    Bindings::new()
        .with("seed", 1)
        .with("one", 1)
        .with("two", 2.0)
}
