// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::resolver::{
    DefaultLabelResolver, LabelResolver, default_bundle_label, default_run_label,
};
use std::string::String;
use std::vec::Vec;
use vliw_sched::program::Program;
use vliw_sched::report::RunSummary;
use vliw_sched::schedule::{Bundle, Schedule};
use vliw_sched::trace::{TraceMask, TraceSink};
use vliw_sched::vm::TrapInfo;

type BackendGuard = tracy_client::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ScopeKind {
    Run,
    Bundle { index: usize },
}

struct ScopeEntry {
    kind: ScopeKind,
    // Keep the label alive for backends that may borrow it.
    label: String,
    guard: Option<BackendGuard>,
}

/// A `TraceSink` that emits Tracy scopes via `tracy-client`.
pub struct ProfilingTraceSink<R = DefaultLabelResolver> {
    resolver: R,
    stack: Vec<ScopeEntry>,
}

impl ProfilingTraceSink<DefaultLabelResolver> {
    /// Create a new sink with index-based labels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<R: LabelResolver> ProfilingTraceSink<R> {
    /// Create a new sink with a custom label resolver.
    #[must_use]
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            stack: Vec::new(),
        }
    }

    fn on_scope_enter(&mut self, kind: ScopeKind, label: String, line: u64) {
        let guard = self.start_scope(kind, &label, line);
        self.stack.push(ScopeEntry { kind, label, guard });
    }

    fn on_scope_exit(&mut self, kind: ScopeKind) {
        if let Some(top) = self.stack.last()
            && top.kind == kind
        {
            if let Some(entry) = self.stack.pop() {
                let ScopeEntry {
                    label: _label,
                    guard: _guard,
                    ..
                } = entry;
                let _ = (_label, _guard);
            }
            return;
        }
        // If the stack got out of sync, drop any active scopes to avoid leaking.
        self.drop_active_scopes();
    }

    fn start_scope(&self, kind: ScopeKind, label: &str, line: u64) -> Option<BackendGuard> {
        let function_name = match kind {
            ScopeKind::Run => "vliw_sched.run",
            ScopeKind::Bundle { .. } => "vliw_sched.bundle",
        };
        let client = tracy_client::Client::running()?;
        let line = u32::try_from(line).unwrap_or(u32::MAX);
        Some(client.span_alloc(Some(label), function_name, "vliw_sched", line, 0))
    }

    // Drop in LIFO order so nested spans close inner-to-outer.
    fn drop_active_scopes(&mut self) {
        while let Some(entry) = self.stack.pop() {
            let ScopeEntry {
                label: _label,
                guard: _guard,
                ..
            } = entry;
            let _ = (_label, _guard);
        }
    }
}

impl<R: LabelResolver> TraceSink for ProfilingTraceSink<R> {
    fn mask(&self) -> TraceMask {
        TraceMask::RUN | TraceMask::BUNDLE
    }

    fn run_start(&mut self, program: &Program, schedule: &Schedule) {
        // A previous run that never reported its end must not leave spans open.
        self.drop_active_scopes();
        let label = self
            .resolver
            .run_label(program, schedule)
            .unwrap_or_else(|| default_run_label(program, schedule));
        self.on_scope_enter(ScopeKind::Run, label, 0);
    }

    fn bundle_start(&mut self, program: &Program, index: usize, bundle: &Bundle) {
        let label = self
            .resolver
            .bundle_label(program, index, bundle)
            .unwrap_or_else(|| default_bundle_label(index, bundle));
        self.on_scope_enter(ScopeKind::Bundle { index }, label, bundle.start_cycle());
    }

    fn bundle_end(&mut self, _program: &Program, index: usize, _bundle: &Bundle) {
        self.on_scope_exit(ScopeKind::Bundle { index });
    }

    fn run_end(&mut self, _program: &Program, _summary: &RunSummary, _trap: Option<&TrapInfo>) {
        // A trap skips `bundle_end`; close the open bundle before the run.
        if let Some(top) = self.stack.last()
            && matches!(top.kind, ScopeKind::Bundle { .. })
        {
            self.stack.pop();
        }
        self.on_scope_exit(ScopeKind::Run);
    }
}

impl<R> Default for ProfilingTraceSink<R>
where
    R: LabelResolver + Default,
{
    fn default() -> Self {
        Self::with_resolver(R::default())
    }
}

impl<R> std::fmt::Debug for ProfilingTraceSink<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfilingTraceSink")
            .field("stack_depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}
