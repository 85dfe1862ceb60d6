//! Tests for the panic-to-fault bridge.
//!
//! The panic hook is process-global, so these tests live in their own test
//! binary and share one registry.

use std::panic;
use std::sync::{Arc, Mutex};

use endstop_core::{route_panics, EventRegistry, Fault, ProcessRegistry, FAULT_EVENT};

#[test]
fn panics_are_routed_to_fault_listeners()
{
    let registry = Arc::new(ProcessRegistry::new());
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    {
        let seen = Arc::clone(&seen);
        registry.subscribe(
            FAULT_EVENT,
            Arc::new(move |fault: &Fault| {
                seen.lock().unwrap().push(fault.message().to_string());
            }),
        );
    }

    let shared: Arc<dyn EventRegistry> = registry.clone();
    route_panics(shared);
    // Repeat calls are no-ops; the first registry stays in charge.
    let again: Arc<dyn EventRegistry> = registry.clone();
    route_panics(again);

    let result = panic::catch_unwind(|| panic!("kaboom"));
    assert!(result.is_err());

    assert_eq!(*seen.lock().unwrap(), ["kaboom".to_string()]);
}
