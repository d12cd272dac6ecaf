//! # Cortex-M4 Port Layer
//!
//! Hardware-specific code for the ARM Cortex-M4 controller that hosts
//! the scheduler: SysTick timer configuration and the tick exception
//! handler. The scheduler never context-switches the controller itself;
//! the tick only advances the clock and refreshes per-node decisions,
//! so no PendSV machinery is needed.
//!
//! ## Interrupt Priorities
//!
//! SysTick runs at priority 0xFF (lowest) so the scheduler tick never
//! preempts application-level ISRs. Thread-mode code serializes against
//! the tick with `sync::critical_section`.

use cortex_m::peripheral::syst::SystClkSource;

use crate::config::{CYCLES_PER_TICK, SYSTEM_CLOCK_HZ, TICK_HZ};

// ---------------------------------------------------------------------------
// SysTick configuration
// ---------------------------------------------------------------------------

/// Configure the SysTick timer for the scheduler tick.
///
/// Sets up SysTick to fire at `TICK_HZ` frequency using the processor
/// clock. Each tick triggers `SysTick` which calls `Scheduler::tick()`.
pub fn configure_systick(syst: &mut cortex_m::peripheral::SYST) {
    let reload = SYSTEM_CLOCK_HZ / TICK_HZ - 1;
    syst.set_reload(reload);
    syst.clear_current();
    syst.set_clock_source(SystClkSource::Core);
    syst.enable_counter();
    syst.enable_interrupt();
}

// ---------------------------------------------------------------------------
// Interrupt priority configuration
// ---------------------------------------------------------------------------

/// Set SysTick to the lowest interrupt priority.
pub fn set_interrupt_priorities() {
    unsafe {
        // System Handler Priority Register 3 (SHPR3): 0xE000_ED20
        // Bits [31:24] = SysTick priority
        let shpr3: *mut u32 = 0xE000_ED20 as *mut u32;
        let val = core::ptr::read_volatile(shpr3);
        let val = val | (0xFF << 24);
        core::ptr::write_volatile(shpr3, val);
    }
}

// ---------------------------------------------------------------------------
// SysTick handler
// ---------------------------------------------------------------------------

/// SysTick exception handler — scheduler tick entry point.
///
/// Called at `TICK_HZ` frequency. Advances the global clock by one
/// tick's worth of cycles and refreshes every node's decision. A no-op
/// until `kernel::init()` has installed the scheduler pointer.
#[no_mangle]
pub unsafe extern "C" fn SysTick() {
    let ptr = crate::kernel::SCHEDULER_PTR;
    if ptr.is_null() {
        return;
    }
    (*ptr).tick(CYCLES_PER_TICK);
}
