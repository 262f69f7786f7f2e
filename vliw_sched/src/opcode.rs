// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Opcode set and per-opcode operand roles.
//!
//! The opcode set is closed. Each opcode declares which operand fields it reads and whether its
//! `dest` field names a register. Scheduling and execution consult these tables rather than
//! special-casing opcodes at use sites.

use core::fmt;
use core::str::FromStr;

use alloc::boxed::Box;

/// An opcode mnemonic that is not part of the instruction set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownOpcode {
    /// The rejected mnemonic.
    pub name: Box<str>,
}

impl fmt::Display for UnknownOpcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown opcode: {}", self.name)
    }
}

impl core::error::Error for UnknownOpcode {}

/// Instruction set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Opcode {
    /// `dest = src1`, where `src1` is an input binding or a register.
    Load,
    /// `slot[dest] = src1`. `dest` names an output slot, not a register.
    Store,
    /// `dest = src1`.
    Move,
    /// `dest = src1 + src2`.
    Add,
    /// `dest = src1 - src2`.
    Sub,
    /// `dest = src1 * src2`.
    Mul,
    /// `dest = src1 / src2` (always floating-point division).
    Div,
    /// `dest = bits_of_f32(src1) as i32`.
    Ftoi,
    /// `dest = f32_from_bits(src1 as i32)`.
    Itof,
    /// `dest = src1 >> size` (arithmetic shift).
    Shr,
}

impl Opcode {
    /// Number of opcodes.
    pub const COUNT: usize = 10;

    /// All opcodes, in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Load,
        Self::Store,
        Self::Move,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Ftoi,
        Self::Itof,
        Self::Shr,
    ];

    /// Returns the upper-case mnemonic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Move => "MOVE",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Ftoi => "FTOI",
            Self::Itof => "ITOF",
            Self::Shr => "SHR",
        }
    }

    /// Looks up an opcode by its mnemonic (case-sensitive, upper-case).
    pub fn from_name(name: &str) -> Result<Self, UnknownOpcode> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == name)
            .ok_or_else(|| UnknownOpcode { name: name.into() })
    }

    /// Position of this opcode in [`Opcode::ALL`].
    #[inline]
    #[must_use]
    pub(crate) const fn table_index(self) -> usize {
        self as usize
    }

    /// Returns `true` if the `dest` field names a register written by this opcode.
    ///
    /// `STORE` is the only opcode whose `dest` names an output slot instead.
    #[inline]
    #[must_use]
    pub const fn writes_register(self) -> bool {
        !matches!(self, Self::Store)
    }

    /// Returns `true` if the opcode consumes `src2`.
    #[inline]
    #[must_use]
    pub const fn reads_src2(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn mnemonics_round_trip_through_the_table() {
        for (i, op) in Opcode::ALL.iter().enumerate() {
            assert_eq!(op.table_index(), i);
            assert_eq!(Opcode::from_name(op.name()), Ok(*op));
        }
    }

    #[test]
    fn unknown_mnemonic_is_rejected() {
        assert_eq!(
            "FMA".parse::<Opcode>(),
            Err(UnknownOpcode { name: "FMA".into() })
        );
        assert!(Opcode::from_name("add").is_err());
    }

    #[test]
    fn only_store_writes_an_output_slot() {
        let slot_writers: std::vec::Vec<_> = Opcode::ALL
            .iter()
            .filter(|op| !op.writes_register())
            .collect();
        assert_eq!(slot_writers, [&Opcode::Store]);
    }
}
