//! Route faults to your own handler instead of the fatal default.

use std::sync::Arc;

use endstop::{EventRegistry, Fault, FAULT_EVENT};

fn main()
{
    let _undo = endstop::install_with(Arc::new(|fault: &Fault| {
        eprintln!("observed fault: {fault}");
    }));

    let handled = endstop::process_registry().emit(FAULT_EVENT, &Fault::new("synthetic fault"));
    println!("fault reached {handled} listener(s); still running");
}
