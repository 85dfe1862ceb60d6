//! # endstop
//!
//! Installs a last-resort handler for uncaught faults, and steps aside
//! automatically when a more specific handler is registered later.
//!
//! Call [`install`] early in process startup. If nobody else ever registers
//! a fault handler, an uncaught fault is logged to standard error with a
//! timestamp and stack trace, and the process exits with code 1. The moment
//! any other fault handler appears, the fallback removes itself and the
//! newer handler governs fault handling entirely.
//!
//! ## Example
//!
//! ```rust
//! let undo = endstop::install();
//! // ... the process now has guaranteed termination behavior ...
//! undo.undo();
//! ```
//!
//! For testing the machinery against a private registry and host, use
//! [`Failsafe`] from `endstop-core` directly.

pub use endstop_core::{
    process_host, process_registry, EventRegistry, Failsafe, Fault, FaultListener, Host, ListenerId,
    ListenerWatcher, ProcessHost, ProcessRegistry, UndoToken, WatcherId, FAULT_EVENT,
};

/// Install the default fatal fault handler on the process-global registry,
/// unless a fault handler already exists.
#[must_use]
pub fn install() -> UndoToken
{
    Failsafe::with_process_defaults().install()
}

/// Install `handler` as the fault handler on the process-global registry,
/// unless a fault handler already exists.
#[must_use]
pub fn install_with(handler: FaultListener) -> UndoToken
{
    Failsafe::with_process_defaults().install_with(handler)
}

/// Route process panics into the process-global fault registry.
///
/// Without this, nothing delivers faults to the registry on its own; with
/// it, an uncaught panic reaches whichever fault handler is current.
pub fn route_panics()
{
    endstop_core::route_panics(process_registry());
}
