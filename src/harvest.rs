//! # Harvest Schedule
//!
//! The environment delivers energy in discrete deposits spaced a fixed
//! interval apart, and the deployment is assumed to know the size of
//! the next deposits up to a *clairvoyance horizon* (from a forecast or
//! a profiled harvesting trace). The scheduler reads this window to
//! project how much energy will have arrived by a future deadline; the
//! external charging process consumes deposits as they fall due and
//! appends newly forecast ones at the tail. Consumed slots are
//! recycled, so the window capacity bounds the *pending* forecast, not
//! the deployment lifetime.

use heapless::Deque;

use crate::clock::Timestamp;
use crate::config::MAX_CHARGES;
use crate::Error;

/// Known-in-advance schedule of future energy deposits.
#[derive(Debug)]
pub struct HarvestSchedule {
    /// Pending forecast deposit sizes, soonest-due first. Consuming a
    /// due deposit pops the front; the charging process pushes newly
    /// forecast deposits at the back.
    charges: Deque<u32, MAX_CHARGES>,
    /// Cycles between consecutive deposits. Must be nonzero.
    pub interval: u32,
    /// Absolute time the next deposit falls due.
    pub next_due: Timestamp,
    /// How far ahead (in cycles) the schedule is assumed known. Bounds
    /// every energy projection and the instance loops of the slack
    /// metrics.
    pub clairvoyance: u32,
}

impl HarvestSchedule {
    /// An empty schedule delivering every `interval` cycles, with the
    /// first deposit due one interval after boot.
    pub const fn new(interval: u32, clairvoyance: u32) -> Self {
        Self {
            charges: Deque::new(),
            interval,
            next_due: Timestamp { count: interval, overflows: 0 },
            clairvoyance,
        }
    }

    /// Append a forecast deposit at the tail of the window.
    pub fn push_charge(&mut self, energy: u32) -> Result<(), Error> {
        self.charges.push_back(energy).map_err(|_| Error::ChargeScheduleFull)
    }

    /// Number of forecast deposits not yet consumed.
    #[inline]
    pub fn pending_charges(&self) -> usize {
        self.charges.len()
    }

    /// Projected energy arriving within the next `horizon` cycles:
    /// the sum of the next `horizon / interval` forecast deposits.
    ///
    /// A window shorter than the horizon (the forecast momentarily
    /// behind after a deposit was consumed) contributes only what is
    /// known, which keeps the projection conservative.
    pub fn incoming_energy(&self, horizon: u32) -> u32 {
        let due = (horizon / self.interval) as usize;
        self.charges
            .iter()
            .take(due)
            .fold(0u32, |sum, c| sum.saturating_add(*c))
    }

    /// Whether the next deposit has fallen due at time `now`.
    #[inline]
    pub fn charge_due(&self, now: Timestamp) -> bool {
        !self.charges.is_empty() && now.has_reached(self.next_due)
    }

    /// Consume the deposit that has fallen due, moving the due time one
    /// interval forward and freeing its slot. Returns the deposited
    /// energy.
    pub fn take_due_charge(&mut self) -> Option<u32> {
        let energy = self.charges.pop_front()?;
        self.next_due.advance(self.interval);
        Some(energy)
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule_with(interval: u32, clairvoyance: u32, charges: &[u32]) -> HarvestSchedule {
        let mut h = HarvestSchedule::new(interval, clairvoyance);
        for c in charges {
            h.push_charge(*c).unwrap();
        }
        h
    }

    #[test]
    fn test_incoming_energy_counts_whole_intervals() {
        let h = schedule_with(50, 200, &[20, 20, 30, 40]);
        assert_eq!(h.incoming_energy(100), 40); // two deposits
        assert_eq!(h.incoming_energy(149), 40); // still two
        assert_eq!(h.incoming_energy(49), 0); // none before first interval
    }

    #[test]
    fn test_incoming_energy_skips_consumed() {
        let mut h = schedule_with(50, 100, &[100, 20, 30, 5]);
        h.take_due_charge().unwrap();
        // First deposit consumed; projection starts at the second.
        assert_eq!(h.incoming_energy(100), 50);
    }

    #[test]
    fn test_incoming_energy_clamps_to_known_window() {
        let mut h = schedule_with(50, 100, &[20, 30]);
        h.take_due_charge().unwrap();
        // Horizon asks for two deposits; only one is still known.
        assert_eq!(h.incoming_energy(100), 30);
        h.take_due_charge().unwrap();
        assert_eq!(h.incoming_energy(100), 0);
    }

    #[test]
    fn test_incoming_energy_saturates() {
        let h = schedule_with(10, 20, &[u32::MAX, u32::MAX]);
        assert_eq!(h.incoming_energy(20), u32::MAX);
    }

    #[test]
    fn test_take_due_charge_advances_due_time() {
        let mut h = schedule_with(50, 100, &[20, 30]);
        assert_eq!(h.next_due.count, 50);
        assert_eq!(h.take_due_charge(), Some(20));
        assert_eq!(h.next_due.count, 100);
        assert_eq!(h.take_due_charge(), Some(30));
        assert_eq!(h.take_due_charge(), None);
    }

    #[test]
    fn test_charge_due_tracks_clock() {
        let mut h = schedule_with(50, 100, &[20]);
        assert!(!h.charge_due(Timestamp { count: 49, overflows: 0 }));
        assert!(h.charge_due(Timestamp { count: 50, overflows: 0 }));
        h.take_due_charge().unwrap();
        // Window exhausted: nothing further is due.
        assert!(!h.charge_due(Timestamp { count: 100, overflows: 0 }));
    }

    #[test]
    fn test_pending_charges() {
        let mut h = schedule_with(50, 100, &[20, 30, 40]);
        assert_eq!(h.pending_charges(), 3);
        h.take_due_charge().unwrap();
        assert_eq!(h.pending_charges(), 2);
    }

    #[test]
    fn test_consumed_slots_are_recycled() {
        let mut h = HarvestSchedule::new(50, 100);
        // Fill, drain, and refill the window several times over; total
        // lifetime pushes far exceed the window capacity.
        for _ in 0..3 {
            for _ in 0..MAX_CHARGES {
                h.push_charge(7).unwrap();
            }
            assert_eq!(h.push_charge(7), Err(Error::ChargeScheduleFull));
            while h.take_due_charge().is_some() {}
            assert_eq!(h.pending_charges(), 0);
        }
        h.push_charge(7).unwrap();
        assert_eq!(h.pending_charges(), 1);
    }
}
