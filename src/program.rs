//! # Program Descriptors
//!
//! The task model for HarvOS. Each program is a periodic job type with
//! a worst-case execution cost (in cycles) and an energy cost (in
//! energy units) per run. Deadlines equal periods: instance `k` of a
//! program is due exactly `k * period` cycles after its first release,
//! and the next release coincides with the previous deadline.
//!
//! Costs are heterogeneous: a job is cheaper or dearer depending on the
//! instruction-set variant of the node it is placed on, so each
//! descriptor carries one cost entry per [`Architecture`].

use crate::clock::Timestamp;

// ---------------------------------------------------------------------------
// Architecture variants
// ---------------------------------------------------------------------------

/// Instruction-set variant of a compute node. Execution and energy
/// costs are profiled per variant; a node's variant selects which entry
/// applies to every job it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Architecture {
    /// Base RV32I integer core.
    Rv32i = 0,
    /// RV32IM core with hardware multiply/divide.
    Rv32im = 1,
}

/// Number of [`Architecture`] variants.
pub const NUM_ARCHITECTURES: usize = 2;

/// A small enum-indexed table, one entry per [`Architecture`].
///
/// Replaces parallel per-variant arrays threaded through every access:
/// the variant is selected once (via the node) and the rest of the code
/// handles a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PerArch<T>([T; NUM_ARCHITECTURES]);

impl<T> PerArch<T> {
    /// Build a table from one value per variant.
    pub const fn new(rv32i: T, rv32im: T) -> Self {
        Self([rv32i, rv32im])
    }

    /// The entry for `arch`.
    #[inline]
    pub fn get(&self, arch: Architecture) -> &T {
        &self.0[arch as usize]
    }
}

impl<T: Copy> PerArch<T> {
    /// Build a table with the same value for every variant.
    pub const fn uniform(value: T) -> Self {
        Self([value; NUM_ARCHITECTURES])
    }
}

// ---------------------------------------------------------------------------
// Execution cost
// ---------------------------------------------------------------------------

/// Cost of one execution of a program on one architecture variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ExecutionCost {
    /// Worst-case execution time, in fabric clock cycles.
    pub wcet: u32,
    /// Energy drawn from the node's battery by one run.
    pub energy: u32,
}

// ---------------------------------------------------------------------------
// Program identity and descriptor
// ---------------------------------------------------------------------------

/// Strongly-typed index into the scheduler's program table.
///
/// Distinct from [`crate::node::NodeId`] so program and node indices
/// cannot be interchanged by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramId(pub(crate) usize);

impl ProgramId {
    /// Raw index into the program table.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Descriptor of one periodic program.
///
/// Created once at registration; the release and deadline timestamps
/// are the only mutable fields and advance by `period` as instances
/// complete or pass their due time.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Program {
    /// Activation period in cycles. Also the relative deadline.
    /// Must be nonzero (checked at registration).
    pub period: u32,
    /// Per-variant execution costs.
    pub cost: PerArch<ExecutionCost>,
    /// Absolute time the next instance becomes available.
    pub next_release: Timestamp,
    /// Absolute due time of the pending (or next) instance.
    pub next_deadline: Timestamp,
}

impl Program {
    /// A program with the given period and costs, released at boot.
    /// Its first deadline falls one period after the origin.
    pub const fn new(period: u32, cost: PerArch<ExecutionCost>) -> Self {
        Self {
            period,
            cost,
            next_release: Timestamp::ZERO,
            next_deadline: Timestamp { count: period, overflows: 0 },
        }
    }

    /// Worst-case execution time on `arch`.
    #[inline]
    pub fn wcet_on(&self, arch: Architecture) -> u32 {
        self.cost.get(arch).wcet
    }

    /// Energy cost of one run on `arch`.
    #[inline]
    pub fn energy_on(&self, arch: Architecture) -> u32 {
        self.cost.get(arch).energy
    }

    /// Move release and deadline one period forward. Called when the
    /// pending instance completes, or when its deadline passes.
    pub fn advance_period(&mut self) {
        self.next_release.advance(self.period);
        self.next_deadline.advance(self.period);
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_arch_selection() {
        let cost = PerArch::new(
            ExecutionCost { wcet: 900, energy: 40 },
            ExecutionCost { wcet: 500, energy: 55 },
        );
        let prg = Program::new(10_000, cost);
        assert_eq!(prg.wcet_on(Architecture::Rv32i), 900);
        assert_eq!(prg.wcet_on(Architecture::Rv32im), 500);
        assert_eq!(prg.energy_on(Architecture::Rv32im), 55);
    }

    #[test]
    fn test_new_program_due_one_period_out() {
        let prg = Program::new(250, PerArch::uniform(ExecutionCost::default()));
        assert_eq!(prg.next_release, Timestamp::ZERO);
        assert_eq!(prg.next_deadline.count, 250);
        assert_eq!(prg.next_deadline.overflows, 0);
    }

    #[test]
    fn test_advance_period_moves_both_timestamps() {
        let mut prg = Program::new(100, PerArch::uniform(ExecutionCost::default()));
        prg.advance_period();
        assert_eq!(prg.next_release.count, 100);
        assert_eq!(prg.next_deadline.count, 200);
    }

    #[test]
    fn test_deadlines_survive_counter_wrap() {
        let mut prg = Program::new(u32::MAX / 2 + 1, PerArch::uniform(ExecutionCost::default()));
        prg.advance_period();
        prg.advance_period();
        // Two further periods push both timestamps past the wrap point.
        assert_eq!(prg.next_deadline.overflows, 1);
        assert_eq!(prg.next_release.overflows, 1);
    }
}
