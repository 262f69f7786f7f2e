// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::HashMap;
use std::string::String;

use vliw_sched::opcode::Opcode;
use vliw_sched::program::Program;
use vliw_sched::schedule::{Bundle, Schedule};

/// Optional label resolver for profiling scopes.
///
/// Return `None` to fall back to the default index-based labels.
pub trait LabelResolver {
    /// Resolve a label for a whole run.
    fn run_label(&mut self, _program: &Program, _schedule: &Schedule) -> Option<String> {
        None
    }

    /// Resolve a label for one bundle.
    fn bundle_label(
        &mut self,
        _program: &Program,
        _index: usize,
        _bundle: &Bundle,
    ) -> Option<String> {
        None
    }
}

/// Default resolver that keeps stable index-based labels.
#[derive(Default, Debug)]
pub struct DefaultLabelResolver;

impl LabelResolver for DefaultLabelResolver {}

/// Opcode count per opcode, in [`Opcode::ALL`] order.
type OpcodeMix = [u16; Opcode::COUNT];

/// Resolver that labels bundles by their opcode mix, e.g. `bundle:LOAD*2 ADD`.
///
/// Labels are cached per distinct mix, so repeated bundle shapes do not re-format.
#[derive(Default, Debug)]
pub struct MnemonicResolver {
    cache: HashMap<OpcodeMix, String>,
}

impl MnemonicResolver {
    fn mix(program: &Program, bundle: &Bundle) -> OpcodeMix {
        let mut mix = [0_u16; Opcode::COUNT];
        for instr in bundle.instrs().iter().filter_map(|&id| program.get(id)) {
            if let Some(slot) = Opcode::ALL.iter().position(|&op| op == instr.opcode) {
                mix[slot] = mix[slot].saturating_add(1);
            }
        }
        mix
    }
}

impl LabelResolver for MnemonicResolver {
    fn bundle_label(
        &mut self,
        program: &Program,
        _index: usize,
        bundle: &Bundle,
    ) -> Option<String> {
        let mix = Self::mix(program, bundle);
        if let Some(label) = self.cache.get(&mix) {
            return Some(label.clone());
        }
        let mut label = String::from("bundle:");
        let mut sep = "";
        for (op, &count) in Opcode::ALL.iter().zip(&mix) {
            match count {
                0 => continue,
                1 => label.push_str(&format!("{sep}{op}")),
                n => label.push_str(&format!("{sep}{op}*{n}")),
            }
            sep = " ";
        }
        self.cache.insert(mix, label.clone());
        Some(label)
    }
}

pub(crate) fn default_run_label(program: &Program, schedule: &Schedule) -> String {
    format!(
        "run:{} instrs in {} bundles",
        program.len(),
        schedule.bundles().len()
    )
}

pub(crate) fn default_bundle_label(index: usize, bundle: &Bundle) -> String {
    format!("bundle:{index}@{}", bundle.start_cycle())
}
