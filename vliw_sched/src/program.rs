// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered instruction sequences.

use core::fmt;

use alloc::vec::Vec;

use crate::instr::{InstrId, Instruction};
use crate::opcode::{Opcode, UnknownOpcode};

/// Raw instruction tuple: `(opcode, dest, src1, src2, size)`.
pub type InstrTuple<'a> = (
    &'a str,
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
    u32,
);

/// Program construction errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgramError {
    /// An instruction used an opcode outside the instruction set.
    UnknownOpcode {
        /// Program index of the offending instruction.
        index: usize,
        /// The lookup failure.
        source: UnknownOpcode,
    },
    /// The program has more instructions than [`InstrId`] can address.
    TooLarge,
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode { index, source } => {
                write!(f, "instruction {index}: {source}")
            }
            Self::TooLarge => write!(f, "program too large"),
        }
    }
}

impl core::error::Error for ProgramError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::UnknownOpcode { source, .. } => Some(source),
            Self::TooLarge => None,
        }
    }
}

/// An immutable, ordered instruction sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    instrs: Vec<Instruction>,
}

impl Program {
    /// Creates a program from instructions in program order.
    pub fn new(instrs: Vec<Instruction>) -> Result<Self, ProgramError> {
        if u32::try_from(instrs.len()).is_err() {
            return Err(ProgramError::TooLarge);
        }
        Ok(Self { instrs })
    }

    /// Builds a program from raw `(opcode, dest, src1, src2, size)` tuples.
    ///
    /// Operand fields are taken positionally. For `STORE`, `dest` names the output slot and `src1`
    /// the register stored, so `("STORE", Some("out"), Some("R5"), None, 1)` writes `R5` to `out`.
    /// Tuples that put the register in `dest` and the slot in `src1` are read the other way
    /// round: the slot name becomes the operand, which then fails to resolve at run time.
    /// A `STORE` without `src1` reads nothing and has no dependencies.
    pub fn from_tuples<'a, I>(tuples: I) -> Result<Self, ProgramError>
    where
        I: IntoIterator<Item = InstrTuple<'a>>,
    {
        let mut instrs = Vec::new();
        for (index, (op, dest, src1, src2, size)) in tuples.into_iter().enumerate() {
            let opcode = Opcode::from_name(op)
                .map_err(|source| ProgramError::UnknownOpcode { index, source })?;
            instrs.push(Instruction::new(opcode, dest, src1, src2, size));
        }
        Self::new(instrs)
    }

    /// Number of instructions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    /// Returns `true` if the program has no instructions.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Returns the instruction with id `id`.
    #[inline]
    #[must_use]
    pub fn get(&self, id: InstrId) -> Option<&Instruction> {
        self.instrs.get(id.index())
    }

    /// Instructions in program order.
    #[inline]
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instrs
    }

    /// Iterates `(id, instruction)` pairs in program order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (InstrId, &Instruction)> + '_ {
        // `new` guarantees every index fits in `u32`.
        self.instrs
            .iter()
            .enumerate()
            .map(|(i, instr)| (InstrId::new(u32::try_from(i).unwrap_or(u32::MAX)), instr))
    }
}
