// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Internal register file.
//!
//! Registers are created on first write. Each register remembers the cycle at which its current
//! value becomes readable, which is how the VM enforces latency at run time.

use alloc::boxed::Box;

use hashbrown::HashMap;

use crate::value::Value;

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct RegSlot {
    pub(crate) value: Value,
    pub(crate) ready_at: u64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct RegFile {
    regs: HashMap<Box<str>, RegSlot>,
}

impl RegFile {
    pub(crate) fn get(&self, name: &str) -> Option<RegSlot> {
        self.regs.get(name).copied()
    }

    pub(crate) fn write(&mut self, name: &str, value: Value, ready_at: u64) {
        let slot = RegSlot { value, ready_at };
        // Reuse the key allocation when the register already exists.
        if let Some(existing) = self.regs.get_mut(name) {
            *existing = slot;
        } else {
            self.regs.insert(name.into(), slot);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.regs.len()
    }

    /// Drops every register, keeping the allocation.
    pub(crate) fn clear(&mut self) {
        self.regs.clear();
    }
}
