// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Profiling adapters for `vliw_sched` (currently Tracy).
//!
//! This crate is `std`-only and keeps `vliw_sched` itself free of profiling dependencies.
//! It listens for run and bundle start/end callbacks and emits matching profiling scopes, so a
//! Tracy capture shows the bundle timeline of every VM run.
//!
//! ## Backend
//! This crate currently supports the Tracy backend via `tracy-client`.
//!
//! ## Example
//! ```ignore
//! use vliw_sched::trace::TraceSink;
//! use vliw_sched_profiling::{MnemonicResolver, ProfilingTraceSink};
//!
//! let mut sink = ProfilingTraceSink::with_resolver(MnemonicResolver::default());
//! let mask = sink.mask();
//! vm.run(&program, &schedule, &inputs, mask, Some(&mut sink))?;
//! # Ok::<(), vliw_sched::vm::TrapInfo>(())
//! ```

mod resolver;
mod sink;

pub use resolver::{DefaultLabelResolver, LabelResolver, MnemonicResolver};
pub use sink::ProfilingTraceSink;
