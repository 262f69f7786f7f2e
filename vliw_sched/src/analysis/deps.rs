// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-after-write dependency graph.
//!
//! The graph is built in one forward pass over the program, tracking the last writer of each
//! register name. Only true dependencies are recorded: an instruction that reads a name depends
//! on the most recent earlier instruction that wrote it. Names that were never written (input
//! bindings, or registers the program forgot to define) contribute no edge.
//!
//! Every edge points from a lower program index to a higher one, so the graph is acyclic by
//! construction and program order is a valid topological order.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::instr::InstrId;
use crate::program::Program;

/// Dependency DAG over the instructions of a [`Program`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DepGraph {
    /// Producers of each instruction, ascending.
    preds: Vec<Vec<InstrId>>,
    /// Consumers of each instruction, ascending.
    succs: Vec<Vec<InstrId>>,
    edge_count: usize,
}

impl DepGraph {
    /// Builds the dependency graph of `program`.
    #[must_use]
    pub fn build(program: &Program) -> Self {
        let n = program.len();
        let mut preds: Vec<Vec<InstrId>> = vec![Vec::new(); n];
        let mut succs: Vec<Vec<InstrId>> = vec![Vec::new(); n];
        let mut edge_count = 0;

        // Scoped to this call: the map never outlives a single build.
        let mut last_writer: HashMap<&str, InstrId> = HashMap::new();

        for (id, instr) in program.iter() {
            let node_preds = &mut preds[id.index()];
            for name in instr.reads() {
                let Some(&producer) = last_writer.get(name) else {
                    continue;
                };
                debug_assert!(producer < id, "dependency must point backwards");
                if !node_preds.contains(&producer) {
                    node_preds.push(producer);
                }
            }
            node_preds.sort_unstable();
            for &producer in node_preds.iter() {
                succs[producer.index()].push(id);
                edge_count += 1;
            }

            if let Some(dest) = instr.writes() {
                last_writer.insert(dest, id);
            }
        }

        Self {
            preds,
            succs,
            edge_count,
        }
    }

    /// Number of nodes (instructions).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.preds.len()
    }

    /// Returns `true` if the graph has no nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.preds.is_empty()
    }

    /// Number of edges.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Instructions that `id` depends on, ascending.
    #[inline]
    #[must_use]
    pub fn producers(&self, id: InstrId) -> &[InstrId] {
        self.preds.get(id.index()).map(Vec::as_slice).unwrap_or_default()
    }

    /// Instructions that depend on `id`, ascending.
    #[inline]
    #[must_use]
    pub fn consumers(&self, id: InstrId) -> &[InstrId] {
        self.succs.get(id.index()).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns `true` if `consumer` directly depends on `producer`.
    #[must_use]
    pub fn depends_on(&self, consumer: InstrId, producer: InstrId) -> bool {
        self.producers(consumer).binary_search(&producer).is_ok()
    }

    /// Iterates `(producer, consumer)` edges, ordered by consumer then producer.
    pub fn edges(&self) -> impl Iterator<Item = (InstrId, InstrId)> + '_ {
        self.preds.iter().enumerate().flat_map(|(c, ps)| {
            let consumer = InstrId::new(u32::try_from(c).unwrap_or(u32::MAX));
            ps.iter().map(move |&p| (p, consumer))
        })
    }

    /// Instructions with no producers, in program order.
    pub fn roots(&self) -> impl Iterator<Item = InstrId> + '_ {
        self.preds
            .iter()
            .enumerate()
            .filter(|(_, ps)| ps.is_empty())
            .map(|(i, _)| InstrId::new(u32::try_from(i).unwrap_or(u32::MAX)))
    }

    /// Length in cycles of the longest latency-weighted dependency chain.
    ///
    /// `latencies[i]` is the latency of instruction `i`. No schedule can complete earlier than
    /// this, whatever the bundle width.
    #[must_use]
    pub fn critical_path(&self, latencies: &[u32]) -> u64 {
        let mut finish: Vec<u64> = vec![0; self.len()];
        let mut longest = 0;
        for (i, ps) in self.preds.iter().enumerate() {
            let ready = ps.iter().map(|p| finish[p.index()]).max().unwrap_or(0);
            let lat = latencies.get(i).copied().unwrap_or(1);
            finish[i] = ready + u64::from(lat);
            longest = longest.max(finish[i]);
        }
        longest
    }
}
