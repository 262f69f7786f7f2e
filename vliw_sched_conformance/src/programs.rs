// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sample programs.

use vliw_sched::instr::Instruction;
use vliw_sched::opcode::Opcode;
use vliw_sched::program::{Program, ProgramError};
use vliw_sched::vm::Bindings;

use crate::reference::RmsInputs;

/// A named sample program with the inputs it runs on, if it is executable.
#[derive(Clone, Debug)]
pub struct Sample {
    /// Short name used in assertion messages.
    pub name: &'static str,
    /// The program.
    pub program: Program,
    /// Inputs, or `None` for scheduling-only programs.
    pub inputs: Option<Bindings>,
}

/// Dependency chain `LOAD -> ADD -> MOVE -> MUL` plus an independent slot-only `STORE`.
///
/// `R3` and `R6` are never written and the `LOAD` has no source, so this program only schedules.
pub fn scheduling_demo() -> Result<Program, ProgramError> {
    Program::new(vec![
        Instruction::new(Opcode::Load, Some("R1"), None, None, 16),
        Instruction::add("R2", "R1", "R3"),
        Instruction::mov("R4", "R2", 32),
        Instruction::mul("R5", "R4", "R6"),
        Instruction::new(Opcode::Store, Some("R5"), None, None, 16),
    ])
}

/// `(input0 + input1) * input2`, stored to the default output slot.
pub fn dot_product() -> Result<Program, ProgramError> {
    Program::from_tuples([
        ("LOAD", Some("R1"), Some("input0"), None, 16),
        ("LOAD", Some("R2"), Some("input1"), None, 16),
        ("ADD", Some("R3"), Some("R1"), Some("R2"), 1),
        ("LOAD", Some("R4"), Some("input2"), None, 16),
        ("MUL", Some("R5"), Some("R3"), Some("R4"), 1),
        ("STORE", None, Some("R5"), None, 1),
    ])
}

/// Inputs for [`dot_product`]: `(3 + 5) * 10 = 80`.
pub fn dot_product_inputs() -> Bindings {
    Bindings::new()
        .with("input0", 3)
        .with("input1", 5)
        .with("input2", 10)
}

/// Loads shared by both RMS-norm kernels: `R1..R3` = x, `R4..R6` = gamma, `R7` = epsilon,
/// `R8` = element count, `R9` = one half.
const RMS_LOADS: [(&str, &str); 9] = [
    ("R1", "x0"),
    ("R2", "x1"),
    ("R3", "x2"),
    ("R4", "gamma0"),
    ("R5", "gamma1"),
    ("R6", "gamma2"),
    ("R7", "epsilon"),
    ("R8", "const0"),
    ("R9", "const1"),
];

fn rms_loads() -> impl Iterator<Item = Instruction> {
    RMS_LOADS
        .iter()
        .map(|&(reg, input)| Instruction::load(reg, input, 16))
}

/// Three-element RMS norm with the square root taken by five Newton iterations.
///
/// Stores `norm0`, `norm1` and `norm2`.
pub fn rms_norm_newton() -> Result<Program, ProgramError> {
    let mut instrs: Vec<Instruction> = rms_loads().collect();
    instrs.extend([
        Instruction::mul("R10", "R1", "R1"),
        Instruction::mul("R11", "R2", "R2"),
        Instruction::mul("R12", "R3", "R3"),
        Instruction::add("R13", "R10", "R11"),
        Instruction::add("R14", "R13", "R12"),
        Instruction::div("R15", "R14", "R8"),
        // n = mean square + epsilon; s0 = n.
        Instruction::add("R16", "R15", "R7"),
        Instruction::mov("R17", "R16", 0),
    ]);
    // s' = 0.5 * (s + n / s)
    let mut s = 17;
    for _ in 0..5 {
        let (q, t, next) = (s + 1, s + 2, s + 3);
        instrs.push(Instruction::div(&reg(q), "R16", &reg(s)));
        instrs.push(Instruction::add(&reg(t), &reg(s), &reg(q)));
        instrs.push(Instruction::mul(&reg(next), "R9", &reg(t)));
        s = next;
    }
    instrs.extend([
        Instruction::mov("R33", &reg(s), 0),
        Instruction::div("R34", "R1", "R33"),
        Instruction::mul("R35", "R34", "R4"),
        Instruction::div("R36", "R2", "R33"),
        Instruction::mul("R37", "R36", "R5"),
        Instruction::div("R38", "R3", "R33"),
        Instruction::mul("R39", "R38", "R6"),
        Instruction::store("norm0", "R35", 1),
        Instruction::store("norm1", "R37", 1),
        Instruction::store("norm2", "R39", 1),
    ]);
    Program::new(instrs)
}

/// Three-element RMS norm using the fast inverse square root bit trick and one Newton step.
///
/// Stores `norm0`, `norm1` and `norm2`.
pub fn rms_norm_quake() -> Result<Program, ProgramError> {
    let mut instrs: Vec<Instruction> = rms_loads().collect();
    instrs.extend([
        Instruction::load("R10", "magic", 16),
        Instruction::load("R11", "const2", 16),
        Instruction::mul("R12", "R1", "R1"),
        Instruction::mul("R13", "R2", "R2"),
        Instruction::mul("R14", "R3", "R3"),
        Instruction::add("R15", "R12", "R13"),
        Instruction::add("R16", "R15", "R14"),
        Instruction::div("R17", "R16", "R8"),
        Instruction::add("R18", "R17", "R7"),
        Instruction::mul("R19", "R18", "R9"),
        Instruction::ftoi("R20", "R18"),
        Instruction::shr("R21", "R20", 1),
        Instruction::sub("R22", "R10", "R21"),
        Instruction::itof("R23", "R22"),
        Instruction::mul("R24", "R23", "R23"),
        Instruction::mul("R25", "R19", "R24"),
        Instruction::sub("R26", "R11", "R25"),
        Instruction::mul("R27", "R23", "R26"),
        Instruction::mul("R28", "R1", "R27"),
        Instruction::mul("R29", "R28", "R4"),
        Instruction::mul("R30", "R2", "R27"),
        Instruction::mul("R31", "R30", "R5"),
        Instruction::mul("R32", "R3", "R27"),
        Instruction::mul("R33", "R32", "R6"),
        Instruction::store("norm0", "R29", 1),
        Instruction::store("norm1", "R31", 1),
        Instruction::store("norm2", "R33", 1),
    ]);
    Program::new(instrs)
}

/// Bindings for both RMS-norm kernels.
pub fn rms_inputs(inputs: &RmsInputs) -> Bindings {
    let [x0, x1, x2] = inputs.x;
    let [g0, g1, g2] = inputs.gamma;
    Bindings::new()
        .with("x0", x0)
        .with("x1", x1)
        .with("x2", x2)
        .with("gamma0", g0)
        .with("gamma1", g1)
        .with("gamma2", g2)
        .with("epsilon", inputs.epsilon)
        .with("const0", 3.0)
        .with("const1", 0.5)
        .with("const2", 1.5)
        .with("magic", crate::reference::INV_SQRT_MAGIC)
}

/// Every sample program.
pub fn samples() -> Result<Vec<Sample>, ProgramError> {
    let rms = rms_inputs(&RmsInputs::SAMPLE);
    Ok(vec![
        Sample {
            name: "scheduling_demo",
            program: scheduling_demo()?,
            inputs: None,
        },
        Sample {
            name: "dot_product",
            program: dot_product()?,
            inputs: Some(dot_product_inputs()),
        },
        Sample {
            name: "rms_norm_newton",
            program: rms_norm_newton()?,
            inputs: Some(rms.clone()),
        },
        Sample {
            name: "rms_norm_quake",
            program: rms_norm_quake()?,
            inputs: Some(rms),
        },
    ])
}

fn reg(n: u32) -> String {
    format!("R{n}")
}
