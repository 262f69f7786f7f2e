// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Execution trace hooks.
//!
//! A [`TraceSink`] receives callbacks as the VM walks a schedule. Which callbacks fire is
//! controlled by a [`TraceMask`]: the VM intersects the mask passed to
//! [`crate::vm::Vm::run`] with [`TraceSink::mask`] once per run, so disabled events cost a single
//! bit test.
//!
//! All methods have empty default bodies; implement only the events you need.

use core::ops::{BitOr, BitOrAssign};

use crate::instr::InstrId;
use crate::program::Program;
use crate::report::RunSummary;
use crate::schedule::{Bundle, Schedule};
use crate::value::Value;
use crate::vm::TrapInfo;

/// Bit set of trace events.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TraceMask(u8);

impl TraceMask {
    /// No events.
    pub const NONE: Self = Self(0);
    /// Run start and end.
    pub const RUN: Self = Self(1 << 0);
    /// Bundle start and end.
    pub const BUNDLE: Self = Self(1 << 1);
    /// One event per executed instruction.
    pub const INSTR: Self = Self(1 << 2);
    /// Every event.
    pub const ALL: Self = Self(Self::RUN.0 | Self::BUNDLE.0 | Self::INSTR.0);

    /// Returns `true` if this mask contains every bit in `other`.
    #[must_use]
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns `true` if no bit is set.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Bits set in both masks.
    #[must_use]
    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl BitOr for TraceMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for TraceMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// One executed instruction, as reported to [`TraceSink::instr`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct InstrEvent<'a> {
    /// The instruction.
    pub id: InstrId,
    /// Cycle at which its bundle issued.
    pub cycle: u64,
    /// Cycle at which its result becomes available.
    pub ready_at: u64,
    /// Register or output slot written.
    pub target: &'a str,
    /// Value written.
    pub value: Value,
}

/// Receiver of VM trace events.
pub trait TraceSink {
    /// Events this sink wants. Defaults to every event.
    fn mask(&self) -> TraceMask {
        TraceMask::ALL
    }

    /// A run is about to execute `schedule`.
    fn run_start(&mut self, _program: &Program, _schedule: &Schedule) {}

    /// Bundle `index` is about to execute.
    fn bundle_start(&mut self, _program: &Program, _index: usize, _bundle: &Bundle) {}

    /// An instruction finished executing.
    fn instr(&mut self, _program: &Program, _event: InstrEvent<'_>) {}

    /// Bundle `index` finished executing.
    fn bundle_end(&mut self, _program: &Program, _index: usize, _bundle: &Bundle) {}

    /// The run ended, successfully or with `trap`.
    ///
    /// Fires even when a trap aborted the run midway through a bundle, in which case no matching
    /// `bundle_end` is reported.
    fn run_end(&mut self, _program: &Program, _summary: &RunSummary, _trap: Option<&TrapInfo>) {}
}

/// Per-run trace dispatcher. Lives on the stack of a single run.
pub(crate) struct TraceCtx<'a> {
    sink: Option<&'a mut dyn TraceSink>,
    mask: TraceMask,
}

impl<'a> TraceCtx<'a> {
    pub(crate) fn new(mask: TraceMask, sink: Option<&'a mut dyn TraceSink>) -> Self {
        let mask = match &sink {
            Some(sink) => mask.intersection(sink.mask()),
            None => TraceMask::NONE,
        };
        Self { sink, mask }
    }

    #[inline]
    fn sink_for(&mut self, event: TraceMask) -> Option<&mut (dyn TraceSink + 'a)> {
        if self.mask.contains(event) {
            self.sink.as_deref_mut()
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn run_start(&mut self, program: &Program, schedule: &Schedule) {
        if let Some(sink) = self.sink_for(TraceMask::RUN) {
            sink.run_start(program, schedule);
        }
    }

    #[inline]
    pub(crate) fn bundle_start(&mut self, program: &Program, index: usize, bundle: &Bundle) {
        if let Some(sink) = self.sink_for(TraceMask::BUNDLE) {
            sink.bundle_start(program, index, bundle);
        }
    }

    #[inline]
    pub(crate) fn instr(&mut self, program: &Program, event: InstrEvent<'_>) {
        if let Some(sink) = self.sink_for(TraceMask::INSTR) {
            sink.instr(program, event);
        }
    }

    #[inline]
    pub(crate) fn bundle_end(&mut self, program: &Program, index: usize, bundle: &Bundle) {
        if let Some(sink) = self.sink_for(TraceMask::BUNDLE) {
            sink.bundle_end(program, index, bundle);
        }
    }

    #[inline]
    pub(crate) fn run_end(
        &mut self,
        program: &Program,
        summary: &RunSummary,
        trap: Option<&TrapInfo>,
    ) {
        if let Some(sink) = self.sink_for(TraceMask::RUN) {
            sink.run_end(program, summary, trap);
        }
    }
}

impl core::fmt::Debug for TraceCtx<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TraceCtx")
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_set_operations() {
        let m = TraceMask::RUN | TraceMask::BUNDLE;
        assert!(m.contains(TraceMask::RUN));
        assert!(!m.contains(TraceMask::INSTR));
        assert!(TraceMask::ALL.contains(m));
        assert!(m.intersection(TraceMask::INSTR).is_empty());
        let mut n = TraceMask::NONE;
        n |= TraceMask::INSTR;
        assert_eq!(n, TraceMask::INSTR);
    }

    struct BundlesOnly;

    impl TraceSink for BundlesOnly {
        fn mask(&self) -> TraceMask {
            TraceMask::BUNDLE
        }
    }

    #[test]
    fn sink_mask_narrows_the_requested_mask() {
        let mut sink = BundlesOnly;
        let ctx = TraceCtx::new(TraceMask::ALL, Some(&mut sink));
        assert_eq!(ctx.mask, TraceMask::BUNDLE);
        let none = TraceCtx::new(TraceMask::ALL, None);
        assert!(none.mask.is_empty());
    }
}
