//! Facade smoke test against the true process-global registry.
//!
//! Kept to a single test function: every test in this binary would share
//! the same global listener table.

use endstop::{EventRegistry, FAULT_EVENT};

#[test]
fn install_and_undo_roundtrip_on_the_process_registry()
{
    let registry = endstop::process_registry();
    assert_eq!(registry.count(FAULT_EVENT), 0);

    let first = endstop::install();
    assert_eq!(registry.count(FAULT_EVENT), 1);

    let second = endstop::install();
    assert_eq!(registry.count(FAULT_EVENT), 1);

    second.undo();
    assert_eq!(registry.count(FAULT_EVENT), 1);

    first.undo();
    assert_eq!(registry.count(FAULT_EVENT), 0);
    assert_eq!(registry.watcher_count(), 0);
}
