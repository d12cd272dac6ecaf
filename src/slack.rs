//! # Slack Projection
//!
//! Pure projection functions behind the ED-H admission rules. For a
//! future deadline horizon they answer three questions: how much energy
//! will the node have harvested by then, how much energy will the
//! node's own periodic workload have consumed, and how much CPU time
//! will that workload have claimed. Combining them gives two slack
//! metrics per node:
//!
//! - **Slack energy**: the worst-case energy surplus at any deadline
//!   inside the clairvoyance window, assuming every forecast deposit
//!   arrives and every competing instance runs at worst-case cost.
//! - **Slack time**: the spare CPU time left before mandatory work
//!   saturates the node, minimized over the same deadlines.
//!
//! Every instance of every assigned program whose deadline falls inside
//! the window contributes one sample; the minimum over all samples is
//! the conservative bound the rule engine consumes. Projections use
//! only *relative* horizons (cycles from now), so no clock value is
//! needed here.
//!
//! All arithmetic saturates: an unchecked wraparound would present a
//! huge fake surplus to the rule engine and authorize execution that
//! must be denied.
//!
//! Precondition (checked at configuration time, not per call): every
//! program period is nonzero. The charge window may momentarily fall
//! short of the clairvoyance horizon between a deposit being consumed
//! and the forecast being extended; projections then count only the
//! known deposits, which errs on the side of idling.

use crate::harvest::HarvestSchedule;
use crate::node::Node;
use crate::program::{Architecture, Program, ProgramId};

/// Energy consumed by competing periodic work within `horizon` cycles:
/// for each assigned program whose period fits the horizon, one energy
/// cost per whole period. Programs with longer periods cannot complete
/// an instance inside the horizon and contribute nothing.
pub fn competing_energy(
    programs: &[Program],
    assigned: &[ProgramId],
    arch: Architecture,
    horizon: u32,
) -> u32 {
    let mut total = 0u32;
    for id in assigned {
        let prg = &programs[id.index()];
        debug_assert!(prg.period > 0, "zero period must be rejected at registration");
        if prg.period <= horizon {
            let instances = horizon / prg.period;
            total = total.saturating_add(instances.saturating_mul(prg.energy_on(arch)));
        }
    }
    total
}

/// CPU time consumed by competing periodic work within `horizon`
/// cycles. Same structure as [`competing_energy`] but summing
/// worst-case execution times instead of energy costs.
pub fn competing_time(
    programs: &[Program],
    assigned: &[ProgramId],
    arch: Architecture,
    horizon: u32,
) -> u32 {
    let mut total = 0u32;
    for id in assigned {
        let prg = &programs[id.index()];
        debug_assert!(prg.period > 0, "zero period must be rejected at registration");
        if prg.period <= horizon {
            let instances = horizon / prg.period;
            total = total.saturating_add(instances.saturating_mul(prg.wcet_on(arch)));
        }
    }
    total
}

/// Slack energy at one deadline instance `horizon` cycles out:
/// `charge + incoming - competing`, clamped to `u32::MAX` on overflow
/// and to `0` on underflow.
pub fn instance_slack_energy(
    charge: u32,
    harvest: &HarvestSchedule,
    programs: &[Program],
    assigned: &[ProgramId],
    arch: Architecture,
    horizon: u32,
) -> u32 {
    let funded = charge.saturating_add(harvest.incoming_energy(horizon));
    funded.saturating_sub(competing_energy(programs, assigned, arch, horizon))
}

/// Slack time at one deadline instance `horizon` cycles out:
/// `horizon - busy time`, clamped to `0` on underflow.
pub fn instance_slack_time(
    programs: &[Program],
    assigned: &[ProgramId],
    arch: Architecture,
    horizon: u32,
) -> u32 {
    horizon.saturating_sub(competing_time(programs, assigned, arch, horizon))
}

/// Node slack energy: the minimum [`instance_slack_energy`] over every
/// deadline instance of every assigned program that falls inside the
/// clairvoyance window. `u32::MAX` if no instance fits the window.
pub fn node_slack_energy(
    node: &Node,
    programs: &[Program],
    assigned: &[ProgramId],
    harvest: &HarvestSchedule,
) -> u32 {
    let mut smallest = u32::MAX;
    for id in assigned {
        let period = programs[id.index()].period;
        let instances = harvest.clairvoyance / period;
        let mut horizon = 0u32;
        for _ in 0..instances {
            horizon += period;
            let slack = instance_slack_energy(
                node.battery.charge(),
                harvest,
                programs,
                assigned,
                node.arch,
                horizon,
            );
            if slack < smallest {
                smallest = slack;
            }
        }
    }
    #[cfg(feature = "defmt")]
    defmt::trace!("slack energy: {}", smallest);
    smallest
}

/// Node slack time: the minimum [`instance_slack_time`] over the same
/// deadline instances as [`node_slack_energy`].
pub fn node_slack_time(
    node: &Node,
    programs: &[Program],
    assigned: &[ProgramId],
    harvest: &HarvestSchedule,
) -> u32 {
    let mut smallest = u32::MAX;
    for id in assigned {
        let period = programs[id.index()].period;
        let instances = harvest.clairvoyance / period;
        let mut horizon = 0u32;
        for _ in 0..instances {
            horizon += period;
            let slack = instance_slack_time(programs, assigned, node.arch, horizon);
            if slack < smallest {
                smallest = slack;
            }
        }
    }
    #[cfg(feature = "defmt")]
    defmt::trace!("slack time: {}", smallest);
    smallest
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------
