// Copyright 2026 the VLIW Sched Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Greedy list scheduling into fixed-width bundles.
//!
//! The scheduler walks cycles in increasing order. At each visited cycle it collects the
//! instructions whose producers have all completed (`start + latency <= cycle`), takes up to
//! `bundle_width` of them in program order, and issues them together as one [`Bundle`].
//! Instructions that would conflict with a member of the bundle being built (reading or
//! overwriting a register another member writes) wait for a later bundle.
//!
//! Dependencies are read-after-write only, but register reuse still constrains order: an
//! instruction that overwrites a register (or an output slot) issues in a later bundle than every
//! earlier instruction that read or wrote it. This keeps results independent of the width.
//!
//! Cycles at which nothing is ready are skipped: instructions whose predecessors have all issued
//! sit in a min-heap keyed by their release cycle, and the scheduler jumps straight to the earliest
//! one. No empty bundles are produced.
//!
//! ## Issue policy
//!
//! With [`IssuePolicy::Pipelined`] (the default), a new bundle may issue on the very next cycle
//! and latency only delays dependents. Greedy list scheduling on its own can finish later when
//! given more slots, so a pipelined schedule for width `w` is the earliest-finishing greedy pass
//! over widths `1..=w`. Completion therefore never grows with the width.
//!
//! [`IssuePolicy::Blocking`] models the reference machine: once a bundle issues, the next bundle
//! waits until the longest-latency member of the current one has completed. It reproduces the
//! reference bundle timeline exactly and makes no monotonicity promise.
//!
//! Tie-breaking is always program order, so a given program and configuration produce exactly one
//! schedule.

use core::cmp::Reverse;
use core::fmt;

use alloc::collections::{BTreeSet, BinaryHeap};
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::analysis::deps::DepGraph;
use crate::instr::{InstrId, Instruction};
use crate::latency::LatencyTable;
use crate::program::Program;

/// When the bundle following an issued bundle may issue.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum IssuePolicy {
    /// The next bundle may issue on the following cycle.
    ///
    /// Completion never increases with the bundle width.
    #[default]
    Pipelined,
    /// The next bundle issues no earlier than `start + max latency` of the current bundle.
    ///
    /// Reproduces the reference machine's timeline. A wider bundle can finish later under this
    /// policy, since a long-latency member holds back every bundle behind it.
    Blocking,
}

/// Scheduler configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedConfig {
    /// Maximum instructions per bundle. Must be at least 1.
    pub bundle_width: usize,
    /// Bundle issue policy.
    pub issue: IssuePolicy,
    /// Latency rule per opcode.
    pub latencies: LatencyTable,
}

impl SchedConfig {
    /// Creates a configuration with the reference latency table and pipelined issue.
    #[must_use]
    pub fn new(bundle_width: usize) -> Self {
        Self {
            bundle_width,
            issue: IssuePolicy::default(),
            latencies: LatencyTable::default(),
        }
    }

    /// Sets the issue policy.
    #[must_use]
    pub fn with_issue_policy(mut self, issue: IssuePolicy) -> Self {
        self.issue = issue;
        self
    }

    /// Sets the latency table.
    #[must_use]
    pub fn with_latencies(mut self, latencies: LatencyTable) -> Self {
        self.latencies = latencies;
        self
    }
}

/// Scheduling errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    /// `bundle_width` was zero.
    ZeroBundleWidth,
    /// The dependency graph was built for a program of a different length.
    GraphMismatch {
        /// Instructions in the program.
        program: usize,
        /// Nodes in the graph.
        graph: usize,
    },
    /// Unscheduled instructions remained with none ready or pending.
    ///
    /// Dependency graphs built by [`DepGraph::build`] cannot produce this; it indicates a broken
    /// internal invariant.
    Stalled {
        /// Cycle at which progress stopped.
        cycle: u64,
        /// Instructions left unscheduled.
        remaining: usize,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBundleWidth => write!(f, "bundle width must be at least 1"),
            Self::GraphMismatch { program, graph } => write!(
                f,
                "dependency graph does not match program: program={program} graph={graph}"
            ),
            Self::Stalled { cycle, remaining } => write!(
                f,
                "scheduler stalled at cycle {cycle} with {remaining} instructions left"
            ),
        }
    }
}

impl core::error::Error for ScheduleError {}

/// Instructions issued together on one cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bundle {
    start_cycle: u64,
    instrs: Vec<InstrId>,
}

impl Bundle {
    /// Creates a bundle issuing `instrs` at `start_cycle`.
    #[must_use]
    pub fn new(start_cycle: u64, instrs: Vec<InstrId>) -> Self {
        Self {
            start_cycle,
            instrs,
        }
    }

    /// Issue cycle.
    #[inline]
    #[must_use]
    pub fn start_cycle(&self) -> u64 {
        self.start_cycle
    }

    /// Member instructions, in program order.
    #[inline]
    #[must_use]
    pub fn instrs(&self) -> &[InstrId] {
        &self.instrs
    }

    /// Number of member instructions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    /// Returns `true` if the bundle has no members.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }
}

/// A bundle timeline for one program.
///
/// Besides the bundles themselves, the schedule records the issue cycle and latency of every
/// instruction so executors and checkers agree on timing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    bundles: Vec<Bundle>,
    starts: Vec<u64>,
    latencies: Vec<u32>,
    bundle_width: usize,
    issue: IssuePolicy,
}

impl Schedule {
    /// Builds the dependency graph of `program` and schedules it.
    pub fn build(program: &Program, config: &SchedConfig) -> Result<Self, ScheduleError> {
        schedule(program, &DepGraph::build(program), config)
    }

    /// Assembles a schedule from externally produced bundles.
    ///
    /// No invariant is enforced here; run [`Schedule::check`] before trusting the result.
    /// Instruction ids outside `program` are kept in their bundles but get no start cycle.
    #[must_use]
    pub fn from_bundles(program: &Program, config: &SchedConfig, bundles: Vec<Bundle>) -> Self {
        let latencies: Vec<u32> = program
            .instructions()
            .iter()
            .map(|i| config.latencies.latency(i))
            .collect();
        let mut starts = vec![0; program.len()];
        for bundle in &bundles {
            for id in &bundle.instrs {
                if let Some(start) = starts.get_mut(id.index()) {
                    *start = bundle.start_cycle;
                }
            }
        }
        Self {
            bundles,
            starts,
            latencies,
            bundle_width: config.bundle_width,
            issue: config.issue,
        }
    }

    /// Bundles in strictly increasing start-cycle order.
    #[inline]
    #[must_use]
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// Number of scheduled instructions.
    #[inline]
    #[must_use]
    pub fn instr_count(&self) -> usize {
        self.starts.len()
    }

    /// Issue cycle of `id`.
    #[inline]
    #[must_use]
    pub fn start_cycle(&self, id: InstrId) -> Option<u64> {
        self.starts.get(id.index()).copied()
    }

    /// Latency of `id` as used by the scheduler.
    #[inline]
    #[must_use]
    pub fn latency(&self, id: InstrId) -> Option<u32> {
        self.latencies.get(id.index()).copied()
    }

    /// Latency of every instruction, indexed by program position.
    #[inline]
    #[must_use]
    pub fn latencies(&self) -> &[u32] {
        &self.latencies
    }

    /// Width limit the schedule was built with.
    #[inline]
    #[must_use]
    pub fn bundle_width(&self) -> usize {
        self.bundle_width
    }

    /// Issue policy the schedule was built with.
    #[inline]
    #[must_use]
    pub fn issue_policy(&self) -> IssuePolicy {
        self.issue
    }

    /// Cycle at which the last result becomes available (`0` for an empty program).
    #[must_use]
    pub fn completion_cycle(&self) -> u64 {
        self.starts
            .iter()
            .zip(&self.latencies)
            .map(|(&start, &lat)| start + u64::from(lat))
            .max()
            .unwrap_or(0)
    }

    /// Re-validates every bundle invariant against `program` and `graph`.
    ///
    /// Checks completeness and uniqueness of placement, the width limit, strictly increasing
    /// non-empty bundles, latency soundness of every dependency edge, that no two members of a
    /// bundle conflict, and that every overwrite issues after the earlier uses of its location.
    pub fn check(&self, program: &Program, graph: &DepGraph) -> Result<(), ScheduleViolation> {
        let n = program.len();
        if self.starts.len() != n || self.latencies.len() != n || graph.len() != n {
            return Err(ScheduleViolation::LengthMismatch {
                program: n,
                schedule: self.starts.len(),
            });
        }

        let mut seen = vec![false; n];
        let mut previous: Option<u64> = None;
        for bundle in &self.bundles {
            let cycle = bundle.start_cycle;
            if bundle.is_empty() {
                return Err(ScheduleViolation::EmptyBundle { cycle });
            }
            if bundle.len() > self.bundle_width {
                return Err(ScheduleViolation::WidthExceeded {
                    cycle,
                    len: bundle.len(),
                    width: self.bundle_width,
                });
            }
            if let Some(previous) = previous
                && previous >= cycle
            {
                return Err(ScheduleViolation::CyclesNotIncreasing { previous, cycle });
            }
            previous = Some(cycle);

            for (pos, &id) in bundle.instrs.iter().enumerate() {
                let Some(slot) = seen.get_mut(id.index()) else {
                    return Err(ScheduleViolation::LengthMismatch {
                        program: n,
                        schedule: id.index() + 1,
                    });
                };
                if core::mem::replace(slot, true) {
                    return Err(ScheduleViolation::Duplicate { instr: id });
                }
                if self.starts[id.index()] != cycle {
                    return Err(ScheduleViolation::StartMismatch {
                        instr: id,
                        recorded: self.starts[id.index()],
                        bundle: cycle,
                    });
                }
                let instr = &program.instructions()[id.index()];
                for &other in &bundle.instrs[..pos] {
                    if instr.conflicts_with(&program.instructions()[other.index()]) {
                        return Err(ScheduleViolation::IntraBundleConflict {
                            cycle,
                            first: other,
                            second: id,
                        });
                    }
                }
            }
        }

        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(ScheduleViolation::Missing {
                instr: InstrId::new(u32::try_from(missing).unwrap_or(u32::MAX)),
            });
        }

        for (producer, consumer) in graph.edges() {
            let ready_at =
                self.starts[producer.index()] + u64::from(self.latencies[producer.index()]);
            let issued_at = self.starts[consumer.index()];
            if ready_at > issued_at {
                return Err(ScheduleViolation::LatencyViolated {
                    producer,
                    consumer,
                    ready_at,
                    issued_at,
                });
            }
        }

        let order = Ordering::build(program);
        for (later, earlier) in order.pairs() {
            let earlier_at = self.starts[earlier.index()];
            let later_at = self.starts[later.index()];
            if later_at <= earlier_at {
                return Err(ScheduleViolation::OverwriteTooEarly {
                    earlier,
                    later,
                    earlier_at,
                    later_at,
                });
            }
        }

        Ok(())
    }
}

/// Storage touched by an instruction, for overwrite ordering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Location<'a> {
    Register(&'a str),
    Slot(&'a str),
}

impl<'a> Location<'a> {
    fn written_by(instr: &'a Instruction) -> Option<Self> {
        instr
            .writes()
            .map(Self::Register)
            .or_else(|| instr.output_slot().map(Self::Slot))
    }
}

#[derive(Default)]
struct Accesses {
    writer: Option<InstrId>,
    readers: Vec<InstrId>,
}

/// Write-after-read and write-after-write constraints.
///
/// `preds[i]` lists the earlier instructions that `i` must issue strictly after: the previous
/// writer of the location `i` writes, and every reader of that location since then.
struct Ordering {
    preds: Vec<Vec<InstrId>>,
    succs: Vec<Vec<InstrId>>,
}

impl Ordering {
    fn build(program: &Program) -> Self {
        let n = program.len();
        let mut preds: Vec<Vec<InstrId>> = vec![Vec::new(); n];
        let mut succs: Vec<Vec<InstrId>> = vec![Vec::new(); n];
        let mut accesses: HashMap<Location<'_>, Accesses> = HashMap::new();

        for (id, instr) in program.iter() {
            let target = Location::written_by(instr);
            let node = &mut preds[id.index()];
            if let Some(target) = target
                && let Some(seen) = accesses.get(&target)
            {
                node.extend(seen.writer);
                node.extend_from_slice(&seen.readers);
                node.sort_unstable();
                node.dedup();
            }
            for &earlier in node.iter() {
                succs[earlier.index()].push(id);
            }

            for name in instr.reads() {
                accesses
                    .entry(Location::Register(name))
                    .or_default()
                    .readers
                    .push(id);
            }
            if let Some(target) = target {
                let seen = accesses.entry(target).or_default();
                seen.writer = Some(id);
                seen.readers.clear();
            }
        }

        Self { preds, succs }
    }

    /// `(later, earlier)` for every constraint.
    fn pairs(&self) -> impl Iterator<Item = (InstrId, InstrId)> + '_ {
        self.preds.iter().enumerate().flat_map(|(i, preds)| {
            let later = InstrId::new(u32::try_from(i).unwrap_or(u32::MAX));
            preds.iter().map(move |&earlier| (later, earlier))
        })
    }
}

/// A broken schedule invariant reported by [`Schedule::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleViolation {
    /// Program, graph and schedule disagree on the number of instructions.
    LengthMismatch {
        /// Instructions in the program.
        program: usize,
        /// Instructions covered by the schedule.
        schedule: usize,
    },
    /// A bundle had no members.
    EmptyBundle {
        /// Start cycle of the bundle.
        cycle: u64,
    },
    /// A bundle had more members than the width limit.
    WidthExceeded {
        /// Start cycle of the bundle.
        cycle: u64,
        /// Members in the bundle.
        len: usize,
        /// Width limit.
        width: usize,
    },
    /// Bundle start cycles were not strictly increasing.
    CyclesNotIncreasing {
        /// Start cycle of the earlier bundle.
        previous: u64,
        /// Start cycle of the later bundle.
        cycle: u64,
    },
    /// An instruction was placed in more than one bundle slot.
    Duplicate {
        /// The instruction.
        instr: InstrId,
    },
    /// An instruction was never placed.
    Missing {
        /// The instruction.
        instr: InstrId,
    },
    /// The recorded start cycle disagrees with the bundle holding the instruction.
    StartMismatch {
        /// The instruction.
        instr: InstrId,
        /// Recorded start cycle.
        recorded: u64,
        /// Start cycle of the holding bundle.
        bundle: u64,
    },
    /// A consumer issued before its producer's result was available.
    LatencyViolated {
        /// Producing instruction.
        producer: InstrId,
        /// Consuming instruction.
        consumer: InstrId,
        /// Cycle at which the producer's result is available.
        ready_at: u64,
        /// Cycle at which the consumer issued.
        issued_at: u64,
    },
    /// Two members of one bundle touch the same register incompatibly.
    IntraBundleConflict {
        /// Start cycle of the bundle.
        cycle: u64,
        /// Earlier member (program order).
        first: InstrId,
        /// Later member.
        second: InstrId,
    },
    /// An instruction overwrote a register or output slot no later than an earlier instruction
    /// that read or wrote it.
    OverwriteTooEarly {
        /// Earlier reader or writer (program order).
        earlier: InstrId,
        /// Later writer.
        later: InstrId,
        /// Issue cycle of `earlier`.
        earlier_at: u64,
        /// Issue cycle of `later`.
        later_at: u64,
    },
}

impl fmt::Display for ScheduleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { program, schedule } => write!(
                f,
                "schedule covers {schedule} instructions, program has {program}"
            ),
            Self::EmptyBundle { cycle } => write!(f, "empty bundle at cycle {cycle}"),
            Self::WidthExceeded { cycle, len, width } => write!(
                f,
                "bundle at cycle {cycle} has {len} instructions (width {width})"
            ),
            Self::CyclesNotIncreasing { previous, cycle } => write!(
                f,
                "bundle at cycle {cycle} does not follow bundle at cycle {previous}"
            ),
            Self::Duplicate { instr } => write!(f, "instruction {instr} scheduled twice"),
            Self::Missing { instr } => write!(f, "instruction {instr} never scheduled"),
            Self::StartMismatch {
                instr,
                recorded,
                bundle,
            } => write!(
                f,
                "instruction {instr} recorded at cycle {recorded} but bundled at cycle {bundle}"
            ),
            Self::LatencyViolated {
                producer,
                consumer,
                ready_at,
                issued_at,
            } => write!(
                f,
                "instruction {consumer} issued at cycle {issued_at} before {producer} completes at cycle {ready_at}"
            ),
            Self::IntraBundleConflict {
                cycle,
                first,
                second,
            } => write!(
                f,
                "instructions {first} and {second} conflict in bundle at cycle {cycle}"
            ),
            Self::OverwriteTooEarly {
                earlier,
                later,
                earlier_at,
                later_at,
            } => write!(
                f,
                "instruction {later} at cycle {later_at} overwrites a location used by {earlier} at cycle {earlier_at}"
            ),
        }
    }
}

impl core::error::Error for ScheduleViolation {}

/// Schedules `program` into bundles, using `graph` for dependencies.
///
/// `graph` must have been built from `program`.
pub fn schedule(
    program: &Program,
    graph: &DepGraph,
    config: &SchedConfig,
) -> Result<Schedule, ScheduleError> {
    let width = config.bundle_width;
    if width == 0 {
        return Err(ScheduleError::ZeroBundleWidth);
    }
    let n = program.len();
    if graph.len() != n {
        return Err(ScheduleError::GraphMismatch {
            program: n,
            graph: graph.len(),
        });
    }

    let plan = Plan {
        instrs: program.instructions(),
        graph,
        order: Ordering::build(program),
        latencies: program
            .instructions()
            .iter()
            .map(|i| config.latencies.latency(i))
            .collect(),
        issue: config.issue,
    };

    let pass = match config.issue {
        IssuePolicy::Blocking => plan.list_schedule(width)?,
        IssuePolicy::Pipelined => {
            let mut best = plan.list_schedule(1)?;
            let mut saturated = best.saturated;
            for narrow in 2..=width {
                // Once no bundle fills up, wider passes repeat the same schedule.
                if !saturated {
                    break;
                }
                let pass = plan.list_schedule(narrow)?;
                saturated = pass.saturated;
                if pass.completion <= best.completion {
                    best = pass;
                }
            }
            best
        }
    };

    Ok(Schedule {
        bundles: pass.bundles,
        starts: pass.starts,
        latencies: plan.latencies,
        bundle_width: width,
        issue: config.issue,
    })
}

struct Plan<'a> {
    instrs: &'a [Instruction],
    graph: &'a DepGraph,
    order: Ordering,
    latencies: Vec<u32>,
    issue: IssuePolicy,
}

struct Pass {
    bundles: Vec<Bundle>,
    starts: Vec<u64>,
    completion: u64,
    /// Some bundle was cut short by the width limit.
    saturated: bool,
}

impl Plan<'_> {
    /// One greedy pass with at most `width` instructions per bundle.
    fn list_schedule(&self, width: usize) -> Result<Pass, ScheduleError> {
        let n = self.instrs.len();
        let ids = || (0..n).map(|i| InstrId::new(u32::try_from(i).unwrap_or(u32::MAX)));

        // Predecessors not yet issued, and the cycle at which every issued one allows issue.
        let mut waiting: Vec<usize> = ids()
            .map(|id| self.graph.producers(id).len() + self.order.preds[id.index()].len())
            .collect();
        let mut release: Vec<u64> = vec![0; n];

        // Instructions whose predecessors have all issued, keyed by release cycle.
        let mut pending: BinaryHeap<Reverse<(u64, InstrId)>> = ids()
            .filter(|id| waiting[id.index()] == 0)
            .map(|id| Reverse((0, id)))
            .collect();
        // Released instructions, ordered by program position.
        let mut ready: BTreeSet<InstrId> = BTreeSet::new();

        let mut starts: Vec<u64> = vec![0; n];
        let mut bundles: Vec<Bundle> = Vec::new();
        let mut saturated = false;
        let mut scheduled = 0;
        let mut cycle: u64 = 0;

        while scheduled < n {
            while let Some(&Reverse((at, id))) = pending.peek()
                && at <= cycle
            {
                pending.pop();
                ready.insert(id);
            }

            if ready.is_empty() {
                let Some(&Reverse((at, _))) = pending.peek() else {
                    return Err(ScheduleError::Stalled {
                        cycle,
                        remaining: n - scheduled,
                    });
                };
                cycle = at;
                continue;
            }

            let mut members: Vec<InstrId> = Vec::with_capacity(width.min(ready.len()));
            for &candidate in &ready {
                if members.len() == width {
                    saturated = true;
                    break;
                }
                let instr = &self.instrs[candidate.index()];
                if members
                    .iter()
                    .any(|m| instr.conflicts_with(&self.instrs[m.index()]))
                {
                    continue;
                }
                members.push(candidate);
            }

            let mut longest: u32 = 1;
            for &id in &members {
                ready.remove(&id);
                starts[id.index()] = cycle;
                let lat = self.latencies[id.index()];
                longest = longest.max(lat);
                let done = cycle + u64::from(lat);
                let dependents = self.graph.consumers(id).iter().map(|&c| (c, done));
                let overwriters = self.order.succs[id.index()].iter().map(|&c| (c, cycle + 1));
                for (next, at) in dependents.chain(overwriters) {
                    let c = next.index();
                    release[c] = release[c].max(at);
                    waiting[c] = waiting[c].saturating_sub(1);
                    if waiting[c] == 0 {
                        pending.push(Reverse((release[c], next)));
                    }
                }
            }

            scheduled += members.len();
            bundles.push(Bundle {
                start_cycle: cycle,
                instrs: members,
            });

            cycle += match self.issue {
                IssuePolicy::Blocking => u64::from(longest),
                IssuePolicy::Pipelined => 1,
            };
        }

        let completion = starts
            .iter()
            .zip(&self.latencies)
            .map(|(&start, &lat)| start + u64::from(lat))
            .max()
            .unwrap_or(0);
        Ok(Pass {
            bundles,
            starts,
            completion,
            saturated,
        })
    }
}
