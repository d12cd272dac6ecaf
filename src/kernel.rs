//! # Kernel
//!
//! Top-level initialization and public API for HarvOS.
//!
//! The kernel owns the global scheduler instance and wraps it in
//! critical sections so the main thread (registration, dispatch,
//! completion reports) and the tick ISR never race on the tables.
//!
//! ## Startup Sequence
//!
//! ```text
//! main()
//!   ├─► kernel::init(harvest)         ← Install the harvest forecast
//!   ├─► kernel::register_program()    ← Declare periodic jobs (×N)
//!   ├─► kernel::register_node()       ← Declare nodes + assignments (×M)
//!   └─► kernel::start(peripherals)    ← Validate, arm SysTick
//!         then loop:
//!           kernel::decision(node)    ← Poll the latest verdicts
//!           ...dispatch / idle...
//!           kernel::complete(node, p) ← Report finished jobs
//! ```

use crate::arch::cortex_m4;
use crate::harvest::HarvestSchedule;
use crate::node::{Battery, NodeId};
use crate::program::{Architecture, Program, ProgramId};
use crate::scheduler::{Decision, Scheduler};
use crate::sync;
use crate::Error;

// ---------------------------------------------------------------------------
// Global scheduler instance
// ---------------------------------------------------------------------------

/// Global scheduler instance.
///
/// # Safety
/// Accessed via `SCHEDULER_PTR` which is set during `init()`.
/// All access is through critical sections or from ISR context
/// (where interrupts are already serialized by priority).
static mut SCHEDULER: Scheduler = Scheduler::new(HarvestSchedule::new(0, 0));

/// Raw pointer to the global scheduler. Used by the arch layer
/// (the SysTick handler) which cannot easily use references.
///
/// # Safety
/// Set once during `init()`, read from ISR context.
#[no_mangle]
pub static mut SCHEDULER_PTR: *mut Scheduler = core::ptr::null_mut();

// ---------------------------------------------------------------------------
// Kernel API
// ---------------------------------------------------------------------------

/// Initialize the HarvOS kernel with the given harvest forecast.
///
/// Must be called before any other kernel function. Sets up the global
/// scheduler and its pointer for ISR access.
///
/// # Safety
/// Must be called exactly once, from the main thread, before starting
/// the scheduler.
pub fn init(harvest: HarvestSchedule) {
    unsafe {
        SCHEDULER = Scheduler::new(harvest);
        SCHEDULER_PTR = core::ptr::addr_of_mut!(SCHEDULER);
    }
}

/// Register a periodic program with the scheduler.
///
/// # Returns
/// - `Ok(id)`: handle used in node assignments and completion reports.
/// - `Err(Error::ZeroPeriod)` / `Err(Error::ProgramTableFull)`.
pub fn register_program(program: Program) -> Result<ProgramId, Error> {
    sync::critical_section(|_cs| unsafe { (*SCHEDULER_PTR).add_program(program) })
}

/// Register a compute node and its static program assignment.
pub fn register_node(
    arch: Architecture,
    battery: Battery,
    assigned: &[ProgramId],
) -> Result<NodeId, Error> {
    sync::critical_section(|_cs| unsafe { (*SCHEDULER_PTR).add_node(arch, battery, assigned) })
}

/// Append a newly forecast harvest deposit at the tail of the window.
/// Called by the charging process as its forecast extends.
pub fn push_charge(energy: u32) -> Result<(), Error> {
    sync::critical_section(|_cs| unsafe { (*SCHEDULER_PTR).harvest_mut().push_charge(energy) })
}

/// Validate the configuration and arm the scheduler tick.
///
/// After this returns `Ok`, SysTick fires at `TICK_HZ` and every tick
/// refreshes the per-node decisions; the caller's main loop polls them
/// via [`decision`] and reports work via [`complete`].
///
/// # Safety (caller contract)
/// - `init()` must have been called.
/// - Must be called from the main thread (not from an ISR).
pub fn start(core_peripherals: &mut cortex_m::Peripherals) -> Result<(), Error> {
    sync::critical_section(|_cs| unsafe { (*SCHEDULER_PTR).validate() })?;

    cortex_m4::set_interrupt_priorities();
    cortex_m4::configure_systick(&mut core_peripherals.SYST);
    Ok(())
}

/// The decision computed for `node` on the most recent tick.
pub fn decision(node: NodeId) -> Decision {
    sync::critical_section(|_cs| unsafe { (*SCHEDULER_PTR).decision(node) })
}

/// Report that `program` finished one run on `node`. Debits the node's
/// battery and rolls the program's release and deadline forward.
pub fn complete(node: NodeId, program: ProgramId) {
    sync::critical_section(|_cs| unsafe { (*SCHEDULER_PTR).record_completion(node, program) })
}
