// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference programs and direct computations used by the `vliw_sched` conformance tests.
//!
//! The integration tests live under `tests/`; this library only provides shared fixtures.

pub mod programs;
pub mod reference;

/// Bundle widths exercised by property tests.
pub const WIDTHS: [usize; 6] = [1, 2, 3, 4, 8, 50];
