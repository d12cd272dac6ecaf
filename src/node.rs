//! # Node Descriptors
//!
//! Each compute node owns a contiguous range of slots in the
//! scheduler's flattened assignment list, runs one instruction-set
//! variant, and draws from its own battery. Batteries are replenished
//! by the harvesting process and drained by job execution; the
//! scheduler itself only reads the charge level when deciding.

use crate::program::Architecture;

// ---------------------------------------------------------------------------
// Battery
// ---------------------------------------------------------------------------

/// A node's energy store. Charge stays within `0..=capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Battery {
    charge: u32,
    capacity: u32,
}

impl Battery {
    /// A battery with the given capacity and initial charge.
    /// The scheduler rejects configurations where `charge > capacity`.
    pub const fn new(charge: u32, capacity: u32) -> Self {
        Self { charge, capacity }
    }

    /// Current energy level.
    #[inline]
    pub fn charge(&self) -> u32 {
        self.charge
    }

    /// Maximum energy the battery can hold.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Whether the battery cannot absorb any more harvested energy.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.charge == self.capacity
    }

    /// Deposit harvested energy, clamped at capacity.
    pub fn deposit(&mut self, energy: u32) {
        self.charge = self.charge.saturating_add(energy).min(self.capacity);
    }

    /// Debit the cost of an execution, saturating at empty.
    pub fn drain(&mut self, energy: u32) {
        self.charge = self.charge.saturating_sub(energy);
    }
}

// ---------------------------------------------------------------------------
// Node identity and descriptor
// ---------------------------------------------------------------------------

/// Strongly-typed index into the scheduler's node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw index into the node table.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Descriptor of one compute node.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Node {
    /// Instruction-set variant; selects the cost entry of every
    /// program assigned here.
    pub arch: Architecture,
    /// Battery state, mutated by harvesting and execution accounting.
    pub battery: Battery,
    /// First slot of this node's range in the assignment list.
    pub(crate) slots_start: usize,
    /// One past the last slot of the range.
    pub(crate) slots_end: usize,
}

impl Node {
    pub(crate) const fn new(arch: Architecture, battery: Battery, start: usize, end: usize) -> Self {
        Self { arch, battery, slots_start: start, slots_end: end }
    }

    /// This node's range in the flattened assignment list. Node ranges
    /// partition the list; no slot belongs to two nodes.
    #[inline]
    pub fn slots(&self) -> core::ops::Range<usize> {
        self.slots_start..self.slots_end
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
