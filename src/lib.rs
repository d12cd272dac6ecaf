//! # HarvOS — Energy-Harvesting-Aware Scheduler
//!
//! An ED-H (Earliest Deadline – Harvesting) real-time scheduling kernel
//! for a controller managing a fabric of battery-backed compute nodes
//! that replenish from harvested energy.
//!
//! ## Overview
//!
//! Classic EDF answers *which* job to run; on a harvesting node that is
//! not enough, because the job with the nearest deadline may drain the
//! battery needed by a later, poorer-funded one. ED-H keeps EDF for job
//! selection and adds an admission test built on two projections over a
//! clairvoyance window of forecast energy deposits:
//!
//! - **Slack energy**: the smallest projected battery level margin
//!   across all upcoming deadlines — charge, plus forecast deposits,
//!   minus the demand of every job due by then.
//! - **Slack time**: the smallest projected spare time across those
//!   deadlines — time to the deadline minus the worst-case execution
//!   demand due by then.
//!
//! The per-node verdict each tick is a first-match cascade:
//!
//! | # | Condition                      | Verdict |
//! |---|--------------------------------|---------|
//! | 1 | no ready jobs                  | idle    |
//! | 2 | charge below dearest job cost  | idle    |
//! | 3 | no slack energy                | idle    |
//! | 4 | battery full                   | run     |
//! | 5 | no slack time                  | run     |
//! | 6 | otherwise                      | run     |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │          Dispatcher / charging process (app)            │
//! ├────────────────────────────────────────────────────────┤
//! │                 Kernel API (kernel.rs)                  │
//! │   init() · register_*() · start() · decision() ·       │
//! │   complete() · push_charge()                            │
//! ├──────────────┬────────────────────┬───────────────────┤
//! │  Scheduler   │  Slack Metrics     │  Sync Primitives  │
//! │  scheduler.rs│  slack.rs          │  sync.rs          │
//! │  ─ tick()    │  ─ slack energy    │  ─ critical_section│
//! │  ─ decide()  │  ─ slack time      │                   │
//! │  ─ EDF pick  │  ─ demand sums     │                   │
//! ├──────────────┴────────────────────┴───────────────────┤
//! │  Model (program.rs · node.rs · harvest.rs · clock.rs)  │
//! │  Program · Battery · Node · HarvestSchedule · Timestamp │
//! ├────────────────────────────────────────────────────────┤
//! │            Arch Port (arch/cortex_m4.rs)                │
//! │              SysTick · tick priorities                  │
//! ├────────────────────────────────────────────────────────┤
//! │         ARM Cortex-M4 controller (Thumb-2)              │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Memory Model
//!
//! - **No heap**: all tables are fixed-capacity `heapless` vectors
//!   inline in the scheduler
//! - **No `alloc`**: pure `core` only
//! - **Critical sections**: `cortex_m::interrupt::free()` for the
//!   global instance shared with the tick ISR

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod clock;
pub mod config;
pub mod harvest;
pub mod kernel;
pub mod node;
pub mod program;
pub mod scheduler;
pub mod slack;
pub mod sync;

pub use clock::Timestamp;
pub use harvest::HarvestSchedule;
pub use node::{Battery, Node, NodeId};
pub use program::{Architecture, ExecutionCost, PerArch, Program, ProgramId};
pub use scheduler::{Decision, Scheduler, Stats};

/// Configuration and capacity errors.
///
/// All fallible operations happen during setup (registration,
/// validation, extending the harvest forecast). The per-tick path is
/// infallible: a node with doubtful projections simply idles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The program table is at capacity (`MAX_PROGRAMS`).
    ProgramTableFull,
    /// The node table is at capacity (`MAX_NODES`).
    NodeTableFull,
    /// The harvest forecast window is at capacity (`MAX_CHARGES`).
    ChargeScheduleFull,
    /// A program was registered with a zero period.
    ZeroPeriod,
    /// The harvest schedule has a zero deposit interval.
    ZeroHarvestInterval,
    /// A node was registered with no assigned programs.
    NoAssignedPrograms,
    /// An assignment referenced a program id that was never registered.
    UnknownProgram,
    /// A program was assigned to more than one node.
    ProgramAlreadyAssigned,
    /// Some registered programs are not assigned to any node.
    UnassignedPrograms,
    /// A battery's initial charge exceeds its capacity.
    ChargeExceedsCapacity,
    /// The forecast window holds too few deposits to cover the
    /// clairvoyance horizon.
    ClairvoyanceNotCovered,
}
