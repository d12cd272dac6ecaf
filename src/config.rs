//! # HarvOS Configuration
//!
//! Compile-time constants governing scheduler capacity and timing.
//! All limits are fixed at compile time — no dynamic allocation.

/// Maximum number of periodic programs the system can manage.
/// This bounds the static program table and the flattened per-node
/// assignment list (each program is assigned to exactly one node).
pub const MAX_PROGRAMS: usize = 16;

/// Maximum number of compute nodes under the scheduler's control.
pub const MAX_NODES: usize = 4;

/// Maximum number of known-in-advance charge deposits in the harvest
/// schedule. The charging process refills this window as charges are
/// consumed; it must always cover the clairvoyance horizon.
pub const MAX_CHARGES: usize = 64;

/// Scheduler tick frequency in Hz. Each tick the global clock advances
/// by `CYCLES_PER_TICK` and every node's decision is recomputed.
pub const TICK_HZ: u32 = 1_000;

/// Clock frequency of the compute fabric in Hz. All periods, execution
/// costs and horizons are expressed in cycles of this clock.
pub const SYSTEM_CLOCK_HZ: u32 = 25_000_000;

/// Cycles added to the global clock per scheduler tick.
///
/// At 25 MHz a 32-bit cycle counter wraps roughly every 172 seconds,
/// which is why all timekeeping carries an overflow count alongside the
/// raw counter value (see [`crate::clock::Timestamp`]).
pub const CYCLES_PER_TICK: u32 = SYSTEM_CLOCK_HZ / TICK_HZ;
