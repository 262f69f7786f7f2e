// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Table-driven instruction latencies.
//!
//! Each opcode has exactly one [`LatencyRule`]. The default [`LatencyTable`] reproduces the
//! reference machine model:
//!
//! | Opcode | Rule |
//! |---|---|
//! | `LOAD`, `MOVE`, `STORE` | `3 + size / 10` |
//! | `ADD`, `SUB` | 1 |
//! | `MUL`, `DIV` | 2 |
//! | `FTOI`, `ITOF`, `SHR` | 3 |
//!
//! Latencies are always at least one cycle.

use crate::instr::Instruction;
use crate::opcode::Opcode;

/// Latency rule for a single opcode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LatencyRule {
    /// A constant number of cycles, independent of `size`.
    Fixed(u32),
    /// `base + size / per` cycles (data-movement style cost).
    Sized {
        /// Cycles charged regardless of size.
        base: u32,
        /// Size units per extra cycle. `0` disables the size term.
        per: u32,
    },
}

impl LatencyRule {
    /// Returns the latency in cycles for an instruction of `size`.
    #[inline]
    #[must_use]
    pub const fn cycles(self, size: u32) -> u32 {
        let raw = match self {
            Self::Fixed(n) => n,
            Self::Sized { base, per } => {
                let extra = match size.checked_div(per) {
                    Some(extra) => extra,
                    None => 0,
                };
                base.saturating_add(extra)
            }
        };
        if raw == 0 { 1 } else { raw }
    }
}

/// Opcode-indexed latency rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatencyTable {
    rules: [LatencyRule; Opcode::COUNT],
}

impl LatencyTable {
    /// The reference latency table.
    pub const REFERENCE: Self = {
        let data_movement = LatencyRule::Sized { base: 3, per: 10 };
        let mut rules = [LatencyRule::Fixed(1); Opcode::COUNT];
        rules[Opcode::Load.table_index()] = data_movement;
        rules[Opcode::Store.table_index()] = data_movement;
        rules[Opcode::Move.table_index()] = data_movement;
        rules[Opcode::Add.table_index()] = LatencyRule::Fixed(1);
        rules[Opcode::Sub.table_index()] = LatencyRule::Fixed(1);
        rules[Opcode::Mul.table_index()] = LatencyRule::Fixed(2);
        rules[Opcode::Div.table_index()] = LatencyRule::Fixed(2);
        rules[Opcode::Ftoi.table_index()] = LatencyRule::Fixed(3);
        rules[Opcode::Itof.table_index()] = LatencyRule::Fixed(3);
        rules[Opcode::Shr.table_index()] = LatencyRule::Fixed(3);
        Self { rules }
    };

    /// Returns the rule for `opcode`.
    #[inline]
    #[must_use]
    pub const fn rule(&self, opcode: Opcode) -> LatencyRule {
        self.rules[opcode.table_index()]
    }

    /// Replaces the rule for `opcode`.
    #[must_use]
    pub const fn with_rule(mut self, opcode: Opcode, rule: LatencyRule) -> Self {
        self.rules[opcode.table_index()] = rule;
        self
    }

    /// Returns the latency of `instr` in cycles.
    #[inline]
    #[must_use]
    pub fn latency(&self, instr: &Instruction) -> u32 {
        self.rule(instr.opcode).cycles(instr.size)
    }
}

impl Default for LatencyTable {
    fn default() -> Self {
        Self::REFERENCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_latencies_match_the_sample_trace() {
        let t = LatencyTable::default();
        assert_eq!(t.latency(&Instruction::load("R1", "x", 16)), 4);
        assert_eq!(t.latency(&Instruction::add("R2", "R1", "R3")), 1);
        assert_eq!(t.latency(&Instruction::mov("R4", "R2", 32)), 6);
        assert_eq!(t.latency(&Instruction::mul("R5", "R4", "R6")), 2);
        assert_eq!(t.latency(&Instruction::store("R5", "R5", 16)), 4);
        assert_eq!(t.latency(&Instruction::store("out", "R5", 1)), 3);
        assert_eq!(t.latency(&Instruction::mov("R17", "R16", 0)), 3);
        assert_eq!(t.latency(&Instruction::ftoi("R20", "R18")), 3);
        assert_eq!(t.latency(&Instruction::shr("R21", "R20", 1)), 3);
        assert_eq!(t.latency(&Instruction::div("R15", "R14", "R8")), 2);
    }

    #[test]
    fn fixed_rules_ignore_size() {
        let t = LatencyTable::default();
        let mut wide_add = Instruction::add("R2", "R1", "R3");
        wide_add.size = 400;
        assert_eq!(t.latency(&wide_add), 1);
    }

    #[test]
    fn latencies_are_never_zero() {
        assert_eq!(LatencyRule::Fixed(0).cycles(0), 1);
        assert_eq!(LatencyRule::Sized { base: 0, per: 10 }.cycles(5), 1);
        assert_eq!(LatencyRule::Sized { base: 2, per: 0 }.cycles(99), 2);
    }

    #[test]
    fn overrides_replace_a_single_rule() {
        let t = LatencyTable::default().with_rule(Opcode::Mul, LatencyRule::Fixed(5));
        assert_eq!(t.rule(Opcode::Mul), LatencyRule::Fixed(5));
        assert_eq!(t.rule(Opcode::Div), LatencyRule::Fixed(2));
    }
}
