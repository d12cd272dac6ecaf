//! # ED-H Scheduler
//!
//! The per-node decision engine. Once per tick, for every node, the
//! scheduler answers a single question: run a job now, or idle. Job
//! selection is plain EDF — the ready program with the nearest absolute
//! deadline — and the ED-H rules then decide whether running it is safe
//! for the battery or forced by timing:
//!
//! 1. **No ready jobs** → idle; nothing to do.
//! 2. **Battery empty** (charge below the dearest assigned job) → idle;
//!    running anything risks exhausting the battery.
//! 3. **No slack energy** (some future deadline shows a projected
//!    deficit) → idle and let harvesting catch up.
//! 4. **Battery full** → run; withheld energy would be wasted because
//!    the battery cannot absorb further deposits.
//! 5. **No slack time** → run; every spare cycle is already spoken for
//!    and delaying would forfeit a deadline.
//! 6. Otherwise → run as soon as possible.
//!
//! Rules 2–3 are conservation checks, rules 4–5 urgency overrides, and
//! idling is always safe: whenever projections look bad the node simply
//! waits, so there is no error path anywhere in the cascade.
//!
//! The scheduler also owns the bookkeeping between decisions: releasing
//! job instances, rolling deadlines forward (counting misses), applying
//! due harvest deposits, and debiting completions reported by the
//! dispatcher.

use heapless::Vec;

use crate::clock::Timestamp;
use crate::config::{MAX_NODES, MAX_PROGRAMS};
use crate::harvest::HarvestSchedule;
use crate::node::{Battery, Node, NodeId};
use crate::program::{Architecture, Program, ProgramId};
use crate::slack::{node_slack_energy, node_slack_time};
use crate::Error;

// ---------------------------------------------------------------------------
// Decisions and statistics
// ---------------------------------------------------------------------------

/// The outcome of one scheduling decision for one node. A `Run` is a
/// recommendation for this tick only; it is recomputed every tick and
/// carries no obligation across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decision {
    /// Stay idle this tick.
    Idle,
    /// Execute the given program now.
    Run(ProgramId),
}

/// Aggregate counters, for observability only — nothing reads them
/// back into the decision logic.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    /// Scheduler ticks processed.
    pub ticks: u64,
    /// Decisions that selected a program.
    pub decisions_run: u64,
    /// Decisions that idled the node.
    pub decisions_idle: u64,
    /// Deadlines that passed with the job instance still pending.
    pub deadline_misses: u64,
    /// Harvest deposits applied to the batteries.
    pub charges_applied: u64,
    /// Job completions reported by the dispatcher.
    pub completions: u64,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            ticks: 0,
            decisions_run: 0,
            decisions_idle: 0,
            deadline_misses: 0,
            charges_applied: 0,
            completions: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// The central scheduler state: program and node tables, the flattened
/// per-node assignment list with its parallel ready flags, the harvest
/// schedule, and the global clock.
///
/// ## Design Notes
///
/// - All tables are fixed-capacity and inline (no heap).
/// - Nodes own disjoint slot ranges, so per-node decisions touch
///   disjoint state; only the clock and harvest window are shared, and
///   both are read-only during decisions.
/// - The tick sequence is strict: advance the clock once, update
///   releases/deadlines/charges, then recompute every node's decision
///   against the same clock value.
pub struct Scheduler {
    programs: Vec<Program, MAX_PROGRAMS>,
    /// Program ids grouped by node; each node's [`Node::slots`] range
    /// indexes into this list.
    assignments: Vec<ProgramId, MAX_PROGRAMS>,
    /// Parallel to `assignments`: true while a released instance is
    /// awaiting completion.
    ready: Vec<bool, MAX_PROGRAMS>,
    nodes: Vec<Node, MAX_NODES>,
    harvest: HarvestSchedule,
    now: Timestamp,
    /// Energy cost of the dearest assigned job, on its node's
    /// architecture. Cached by [`Scheduler::validate`]; the emptiness
    /// threshold for both battery charge and slack energy.
    e_max: u32,
    /// Latest decision per node, refreshed by [`Scheduler::decide_all`].
    decisions: Vec<Decision, MAX_NODES>,
    pub stats: Stats,
}

impl Scheduler {
    /// An empty scheduler drawing on the given harvest schedule.
    /// Register programs and nodes, then call [`Scheduler::validate`]
    /// before ticking.
    pub const fn new(harvest: HarvestSchedule) -> Self {
        Self {
            programs: Vec::new(),
            assignments: Vec::new(),
            ready: Vec::new(),
            nodes: Vec::new(),
            harvest,
            now: Timestamp::ZERO,
            e_max: 0,
            decisions: Vec::new(),
            stats: Stats::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Registration and validation
    // -----------------------------------------------------------------------

    /// Register a periodic program. Fails on a zero period or a full
    /// table.
    pub fn add_program(&mut self, program: Program) -> Result<ProgramId, Error> {
        if program.period == 0 {
            return Err(Error::ZeroPeriod);
        }
        let id = ProgramId(self.programs.len());
        self.programs.push(program).map_err(|_| Error::ProgramTableFull)?;
        Ok(id)
    }

    /// Register a compute node and assign it a set of programs. The
    /// assignment is static: a program belongs to exactly one node for
    /// the lifetime of the system.
    pub fn add_node(
        &mut self,
        arch: Architecture,
        battery: Battery,
        assigned: &[ProgramId],
    ) -> Result<NodeId, Error> {
        if assigned.is_empty() {
            return Err(Error::NoAssignedPrograms);
        }
        if battery.charge() > battery.capacity() {
            return Err(Error::ChargeExceedsCapacity);
        }
        if self.nodes.len() == MAX_NODES {
            return Err(Error::NodeTableFull);
        }
        if self.assignments.len() + assigned.len() > MAX_PROGRAMS {
            return Err(Error::ProgramTableFull);
        }
        for (i, id) in assigned.iter().enumerate() {
            if id.index() >= self.programs.len() {
                return Err(Error::UnknownProgram);
            }
            if assigned[..i].contains(id) || self.assignments.contains(id) {
                return Err(Error::ProgramAlreadyAssigned);
            }
        }

        let start = self.assignments.len();
        for id in assigned {
            // Capacity verified above; these cannot fail.
            let _ = self.assignments.push(*id);
            let _ = self.ready.push(false);
        }
        let node_id = NodeId(self.nodes.len());
        let _ = self.nodes.push(Node::new(arch, battery, start, self.assignments.len()));
        let _ = self.decisions.push(Decision::Idle);
        Ok(node_id)
    }

    /// Check the configuration invariants the per-tick code relies on
    /// and cache the global maximum energy cost. Must be called after
    /// registration and before the first tick; the per-tick path does
    /// not re-validate.
    pub fn validate(&mut self) -> Result<(), Error> {
        if self.harvest.interval == 0 {
            return Err(Error::ZeroHarvestInterval);
        }
        let window = (self.harvest.clairvoyance / self.harvest.interval) as usize;
        if self.harvest.pending_charges() < window {
            return Err(Error::ClairvoyanceNotCovered);
        }
        if self.assignments.len() != self.programs.len() {
            return Err(Error::UnassignedPrograms);
        }
        let mut e_max = 0u32;
        for node in &self.nodes {
            for slot in node.slots() {
                let id = self.assignments[slot];
                e_max = e_max.max(self.programs[id.index()].energy_on(node.arch));
            }
        }
        self.e_max = e_max;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current value of the global clock.
    #[inline]
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// The node descriptor for `id`.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// The harvest schedule (for the charging process to extend).
    #[inline]
    pub fn harvest_mut(&mut self) -> &mut HarvestSchedule {
        &mut self.harvest
    }

    /// The decision computed for `id` on the most recent tick.
    #[inline]
    pub fn decision(&self, id: NodeId) -> Decision {
        self.decisions[id.index()]
    }

    /// Energy cost of the dearest assigned job (valid after
    /// [`Scheduler::validate`]).
    #[inline]
    pub fn max_energy_cost(&self) -> u32 {
        self.e_max
    }

    fn assigned(&self, node: &Node) -> &[ProgramId] {
        &self.assignments[node.slots()]
    }

    // -----------------------------------------------------------------------
    // EDF selection
    // -----------------------------------------------------------------------

    /// The ready program with the nearest absolute deadline, or `None`
    /// if nothing is ready. On equal deadlines the first slot in the
    /// node's assignment range wins.
    fn select_earliest_deadline(&self, node: &Node) -> Option<ProgramId> {
        let mut best: Option<ProgramId> = None;
        let mut earliest = u32::MAX;
        for slot in node.slots() {
            if !self.ready[slot] {
                continue;
            }
            let id = self.assignments[slot];
            let until = self.now.ticks_until(self.programs[id.index()].next_deadline);
            if best.is_none() || until < earliest {
                earliest = until;
                best = Some(id);
            }
        }
        best
    }

    // -----------------------------------------------------------------------
    // ED-H rule cascade
    // -----------------------------------------------------------------------

    /// Decide whether `id` should run a job this tick. Pure with
    /// respect to scheduler state; evaluates the rule cascade described
    /// in the module docs, first match wins.
    pub fn decide(&self, id: NodeId) -> Decision {
        let node = &self.nodes[id.index()];
        let assigned = self.assigned(node);

        let candidate = match self.select_earliest_deadline(node) {
            Some(p) => p,
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("n{}: no ready jobs, idling", id.index());
                return Decision::Idle;
            }
        };

        if node.battery.charge() < self.e_max {
            #[cfg(feature = "defmt")]
            defmt::trace!(
                "n{}: battery empty ({} < {}), idling",
                id.index(),
                node.battery.charge(),
                self.e_max
            );
            return Decision::Idle;
        }

        let se = node_slack_energy(node, &self.programs, assigned, &self.harvest);
        if se < self.e_max {
            #[cfg(feature = "defmt")]
            defmt::trace!("n{}: no slack energy ({}), idling", id.index(), se);
            return Decision::Idle;
        }

        if node.battery.is_full() {
            #[cfg(feature = "defmt")]
            defmt::trace!("n{}: battery full, running p{}", id.index(), candidate.index());
            return Decision::Run(candidate);
        }

        let st = node_slack_time(node, &self.programs, assigned, &self.harvest);
        if st == 0 {
            #[cfg(feature = "defmt")]
            defmt::trace!("n{}: no slack time, running p{}", id.index(), candidate.index());
            return Decision::Run(candidate);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("n{}: running p{} asap", id.index(), candidate.index());
        Decision::Run(candidate)
    }

    /// Recompute and store the decision for every node against the
    /// current clock value.
    pub fn decide_all(&mut self) {
        for i in 0..self.nodes.len() {
            let decision = self.decide(NodeId(i));
            match decision {
                Decision::Run(_) => self.stats.decisions_run += 1,
                Decision::Idle => self.stats.decisions_idle += 1,
            }
            self.decisions[i] = decision;
        }
    }

    // -----------------------------------------------------------------------
    // Tick processing
    // -----------------------------------------------------------------------

    /// Process one scheduler tick of `cycles` clock cycles: advance the
    /// global clock, release job instances whose release time has
    /// arrived, roll passed deadlines forward (counting a miss when the
    /// instance was still pending), deposit due harvest charges into
    /// every battery, and finally refresh all per-node decisions.
    pub fn tick(&mut self, cycles: u32) {
        self.now.advance(cycles);
        self.stats.ticks += 1;

        for slot in 0..self.assignments.len() {
            let id = self.assignments[slot];

            if !self.ready[slot] && self.now.has_reached(self.programs[id.index()].next_release) {
                self.ready[slot] = true;
            }

            // A coarse tick can sweep several periods at once; roll the
            // deadline until it lies in the future again, counting one
            // miss per deadline that passed with the instance pending.
            while self.now.has_reached(self.programs[id.index()].next_deadline) {
                if self.ready[slot] {
                    self.stats.deadline_misses += 1;
                    #[cfg(feature = "defmt")]
                    defmt::trace!("p{}: deadline missed", id.index());
                }
                self.programs[id.index()].advance_period();
            }
        }

        while self.harvest.charge_due(self.now) {
            if let Some(energy) = self.harvest.take_due_charge() {
                for node in self.nodes.iter_mut() {
                    node.battery.deposit(energy);
                }
                self.stats.charges_applied += 1;
                #[cfg(feature = "defmt")]
                defmt::trace!("harvest: deposited {}", energy);
            }
        }

        self.decide_all();
    }

    /// Record that the dispatcher finished running `program` on the
    /// node: clear the pending instance, debit the battery by the
    /// program's energy cost, and move its release and deadline one
    /// period forward. Ignored if no matching instance is pending.
    pub fn record_completion(&mut self, node_id: NodeId, program: ProgramId) {
        let node = &mut self.nodes[node_id.index()];
        let arch = node.arch;
        for slot in node.slots() {
            if self.assignments[slot] == program && self.ready[slot] {
                self.ready[slot] = false;
                let prg = &mut self.programs[program.index()];
                node.battery.drain(prg.energy_on(arch));
                prg.advance_period();
                self.stats.completions += 1;
                return;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
