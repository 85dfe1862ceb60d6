//! Tests for the fault value.

use endstop_core::Fault;

#[test]
fn test_fault_display_is_the_message()
{
    let fault = Fault::with_trace("disk on fire", "at io.rs:7");
    assert_eq!(fault.to_string(), "disk on fire");
    assert_eq!(fault.message(), "disk on fire");
    assert_eq!(fault.trace(), "at io.rs:7");
}

#[test]
fn test_fault_new_captures_a_trace()
{
    let fault = Fault::new("boom");
    assert_eq!(fault.message(), "boom");
    // Even when backtraces are unsupported the capture renders something.
    assert!(!fault.trace().is_empty());
}

#[test]
fn test_fault_is_a_std_error()
{
    let fault = Fault::with_trace("boom", "");
    let error: &dyn std::error::Error = &fault;
    assert_eq!(format!("{error}"), "boom");
}
