// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Instruction model.

use core::fmt;

use alloc::boxed::Box;

use crate::opcode::Opcode;

/// Name of the output slot written by a `STORE` without an explicit `dest`.
pub const DEFAULT_OUTPUT_SLOT: &str = "OUTPUT";

/// Identifier of an instruction: its index in program order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct InstrId(u32);

impl InstrId {
    /// Creates a new instruction id.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer backing this id.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the id as a program index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Operand field of an [`Instruction`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The `dest` field.
    Dest,
    /// The `src1` field.
    Src1,
    /// The `src2` field.
    Src2,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dest => "dest",
            Self::Src1 => "src1",
            Self::Src2 => "src2",
        })
    }
}

/// One machine operation.
///
/// Operand names are plain strings; an absent operand is `None`. Which fields are meaningful is
/// decided by the opcode (see [`Instruction::reads`] and [`Instruction::writes`]). For `STORE`,
/// `dest` names the output slot and `src1` the register being stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// Operation.
    pub opcode: Opcode,
    /// Destination register, or output slot for `STORE`.
    pub dest: Option<Box<str>>,
    /// First source operand.
    pub src1: Option<Box<str>>,
    /// Second source operand.
    pub src2: Option<Box<str>>,
    /// Data size for size-scaled opcodes; shift amount for `SHR`.
    pub size: u32,
}

impl Instruction {
    /// Creates an instruction from its raw fields.
    pub fn new(
        opcode: Opcode,
        dest: Option<&str>,
        src1: Option<&str>,
        src2: Option<&str>,
        size: u32,
    ) -> Self {
        Self {
            opcode,
            dest: dest.map(Into::into),
            src1: src1.map(Into::into),
            src2: src2.map(Into::into),
            size,
        }
    }

    /// `LOAD dest <- src` where `src` is an input binding or register.
    pub fn load(dest: &str, src: &str, size: u32) -> Self {
        Self::new(Opcode::Load, Some(dest), Some(src), None, size)
    }

    /// `STORE slot <- src`.
    pub fn store(slot: &str, src: &str, size: u32) -> Self {
        Self::new(Opcode::Store, Some(slot), Some(src), None, size)
    }

    /// `MOVE dest <- src`.
    pub fn mov(dest: &str, src: &str, size: u32) -> Self {
        Self::new(Opcode::Move, Some(dest), Some(src), None, size)
    }

    /// `ADD dest <- a + b`.
    pub fn add(dest: &str, a: &str, b: &str) -> Self {
        Self::new(Opcode::Add, Some(dest), Some(a), Some(b), 1)
    }

    /// `SUB dest <- a - b`.
    pub fn sub(dest: &str, a: &str, b: &str) -> Self {
        Self::new(Opcode::Sub, Some(dest), Some(a), Some(b), 1)
    }

    /// `MUL dest <- a * b`.
    pub fn mul(dest: &str, a: &str, b: &str) -> Self {
        Self::new(Opcode::Mul, Some(dest), Some(a), Some(b), 1)
    }

    /// `DIV dest <- a / b`.
    pub fn div(dest: &str, a: &str, b: &str) -> Self {
        Self::new(Opcode::Div, Some(dest), Some(a), Some(b), 1)
    }

    /// `FTOI dest <- bits(src)`.
    pub fn ftoi(dest: &str, src: &str) -> Self {
        Self::new(Opcode::Ftoi, Some(dest), Some(src), None, 0)
    }

    /// `ITOF dest <- float(bits src)`.
    pub fn itof(dest: &str, src: &str) -> Self {
        Self::new(Opcode::Itof, Some(dest), Some(src), None, 0)
    }

    /// `SHR dest <- src >> amount`.
    pub fn shr(dest: &str, src: &str, amount: u32) -> Self {
        Self::new(Opcode::Shr, Some(dest), Some(src), None, amount)
    }

    /// Returns the operand name in `field`, if present.
    #[inline]
    #[must_use]
    pub fn operand(&self, field: Operand) -> Option<&str> {
        match field {
            Operand::Dest => self.dest.as_deref(),
            Operand::Src1 => self.src1.as_deref(),
            Operand::Src2 => self.src2.as_deref(),
        }
    }

    /// Names read by this instruction, in operand order.
    ///
    /// A name may refer to a register or an input binding; dependency analysis only links names
    /// that were previously written.
    pub fn reads(&self) -> impl Iterator<Item = &str> + '_ {
        let src2 = if self.opcode.reads_src2() {
            self.src2.as_deref()
        } else {
            None
        };
        self.src1.as_deref().into_iter().chain(src2)
    }

    /// Register written by this instruction, if any.
    #[inline]
    #[must_use]
    pub fn writes(&self) -> Option<&str> {
        if self.opcode.writes_register() {
            self.dest.as_deref()
        } else {
            None
        }
    }

    /// Output slot written by a `STORE`, `None` for every other opcode.
    #[inline]
    #[must_use]
    pub fn output_slot(&self) -> Option<&str> {
        match self.opcode {
            Opcode::Store => Some(self.dest.as_deref().unwrap_or(DEFAULT_OUTPUT_SLOT)),
            _ => None,
        }
    }

    /// Returns `true` if `self` and `other` may not issue in the same bundle.
    ///
    /// They conflict if either reads a register the other writes, or both write the same
    /// register.
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        let reads_written_by = |reader: &Self, writer: &Self| match writer.writes() {
            Some(w) => reader.reads().any(|r| r == w),
            None => false,
        };
        let same_dest = matches!((self.writes(), other.writes()), (Some(a), Some(b)) if a == b);
        same_dest || reads_written_by(self, other) || reads_written_by(other, self)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.name())?;
        let mut sep = " ";
        for field in [Operand::Dest, Operand::Src1, Operand::Src2] {
            if let Some(name) = self.operand(field) {
                write!(f, "{sep}{name}")?;
                sep = ", ";
            }
        }
        write!(f, " (size {})", self.size)
    }
}
