// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structured scheduling and execution reporting.
//!
//! This module provides small report types intended for debugging and instrumentation.
//! Formatting and UI are left to embedders.

use crate::schedule::Schedule;

/// Shape summary of a [`Schedule`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    /// Number of bundles.
    pub bundles: usize,
    /// Number of scheduled instructions.
    pub instructions: usize,
    /// Cycle at which the last result becomes available.
    pub completion_cycle: u64,
    /// Largest bundle.
    pub max_bundle_len: usize,
    /// Issue slots holding an instruction (equals `instructions`).
    pub issue_slots_used: usize,
    /// Issue slots offered by the bundles (`bundles * bundle_width`).
    pub issue_slots_total: usize,
}

impl ScheduleSummary {
    /// Share of offered issue slots that hold an instruction, in whole percent.
    ///
    /// Returns `0` when no slot was offered.
    #[must_use]
    pub fn slot_utilization_percent(&self) -> usize {
        (self.issue_slots_used * 100)
            .checked_div(self.issue_slots_total)
            .unwrap_or(0)
    }
}

impl Schedule {
    /// Summarizes the shape of this schedule.
    #[must_use]
    pub fn summary(&self) -> ScheduleSummary {
        let bundles = self.bundles();
        let used: usize = bundles.iter().map(|b| b.len()).sum();
        ScheduleSummary {
            bundles: bundles.len(),
            instructions: self.instr_count(),
            completion_cycle: self.completion_cycle(),
            max_bundle_len: bundles.iter().map(|b| b.len()).max().unwrap_or(0),
            issue_slots_used: used,
            issue_slots_total: bundles.len().saturating_mul(self.bundle_width()),
        }
    }
}

/// Cheap run summary for a VM execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of bundles executed.
    pub bundles_executed: usize,
    /// Number of instructions executed.
    pub instructions_executed: usize,
    /// Cycle at which the last result became available.
    pub completion_cycle: u64,
}
