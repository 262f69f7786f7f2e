// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static analyses over straight-line programs.

pub mod deps;
