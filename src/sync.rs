//! # Synchronization Primitives
//!
//! Interrupt-safe critical section abstractions for the Cortex-M4
//! controller core. The scheduler tables are shared between the main
//! thread (registration, completion reports) and the tick ISR, so all
//! access to the global instance goes through a critical section.

use cortex_m::interrupt;

/// Execute a closure within a critical section (interrupts disabled).
///
/// This is the only mechanism for touching the global scheduler from
/// thread mode. Interrupts are disabled on entry and restored on exit,
/// so the enclosed operation is atomic with respect to the tick handler.
///
/// # Usage
/// ```ignore
/// sync::critical_section(|_cs| {
///     // Access shared state safely
/// });
/// ```
///
/// # Performance
/// Keep critical sections short: a section that straddles a tick delays
/// the next round of scheduling decisions by a full tick period.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&interrupt::CriticalSection) -> R,
{
    interrupt::free(f)
}
