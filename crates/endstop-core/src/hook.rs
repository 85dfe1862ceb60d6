//! Panic-to-fault bridge.
//!
//! In a Rust process, the fault that "reached the top of the call stack" is
//! a panic. This module forwards panics into an [`EventRegistry`] so the
//! failsafe (or whatever handler replaced it) sees them.

use std::backtrace::Backtrace;
use std::fmt::Write as _;
use std::panic::{self, PanicHookInfo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::Fault;
use crate::failsafe::FAULT_EVENT;
use crate::registry::EventRegistry;

static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Route process panics into `registry` as uncaught faults.
///
/// Installs a panic hook that converts the panic payload and location into
/// a [`Fault`] and emits it on [`FAULT_EVENT`]. When no listener handles
/// the fault the previously installed hook runs instead, so an unguarded
/// process keeps the stock panic output.
///
/// The hook is process-global and installed once; repeat calls are no-ops.
pub fn route_panics(registry: Arc<dyn EventRegistry>)
{
    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
        let fault = fault_from_panic(info);
        if registry.emit(FAULT_EVENT, &fault) == 0 {
            previous(info);
        }
    }));
    debug!("panic hook routed to fault registry");
}

fn fault_from_panic(info: &PanicHookInfo<'_>) -> Fault
{
    let message = if let Some(text) = info.payload().downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = info.payload().downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    };

    let mut trace = String::new();
    if let Some(location) = info.location() {
        let _ = writeln!(trace, "panicked at {location}");
    }
    trace.push_str(&Backtrace::force_capture().to_string());

    Fault::with_trace(message, trace)
}
