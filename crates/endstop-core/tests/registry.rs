//! Tests for the in-process event registry.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use endstop_core::{EventRegistry, Fault, FaultListener, ListenerId, ProcessRegistry};

fn noop() -> FaultListener
{
    Arc::new(|_fault: &Fault| {})
}

#[test]
fn subscribe_and_count()
{
    let registry = ProcessRegistry::new();
    assert_eq!(registry.count("fault"), 0);

    let first = registry.subscribe("fault", noop());
    let second = registry.subscribe("fault", noop());

    assert_ne!(first, second);
    assert_eq!(registry.count("fault"), 2);
    assert_eq!(registry.list("fault"), vec![first, second]);
}

#[test]
fn counts_are_per_event()
{
    let registry = ProcessRegistry::new();
    registry.subscribe("fault", noop());
    registry.subscribe("shutdown", noop());

    assert_eq!(registry.count("fault"), 1);
    assert_eq!(registry.count("shutdown"), 1);
    assert_eq!(registry.count("reload"), 0);
    assert!(registry.list("reload").is_empty());
}

#[test]
fn unsubscribe_removes_only_the_target()
{
    let registry = ProcessRegistry::new();
    let first = registry.subscribe("fault", noop());
    let second = registry.subscribe("fault", noop());

    assert!(registry.unsubscribe("fault", first));
    assert_eq!(registry.list("fault"), vec![second]);

    // Removing twice reports nothing left to remove.
    assert!(!registry.unsubscribe("fault", first));
    assert!(!registry.unsubscribe("missing-event", second));
}

#[test]
fn watchers_see_every_subscription()
{
    let registry = ProcessRegistry::new();
    let observed = Arc::new(Mutex::new(Vec::<(String, ListenerId)>::new()));
    let watcher_log = Arc::clone(&observed);
    registry.watch(Arc::new(move |event: &str, id: ListenerId| {
        watcher_log.lock().unwrap().push((event.to_string(), id));
    }));

    let fault_listener = registry.subscribe("fault", noop());
    let other_listener = registry.subscribe("shutdown", noop());

    let observed = observed.lock().unwrap();
    assert_eq!(
        *observed,
        [
            ("fault".to_string(), fault_listener),
            ("shutdown".to_string(), other_listener)
        ]
    );
}

#[test]
fn watchers_run_after_the_listener_is_in_the_table()
{
    let registry = Arc::new(ProcessRegistry::new());
    let seen_count = Arc::new(AtomicUsize::new(0));
    {
        let inner = Arc::clone(&registry);
        let seen_count = Arc::clone(&seen_count);
        registry.watch(Arc::new(move |event: &str, _id: ListenerId| {
            seen_count.store(inner.count(event), Ordering::SeqCst);
        }));
    }

    registry.subscribe("fault", noop());
    assert_eq!(seen_count.load(Ordering::SeqCst), 1);
}

#[test]
fn unwatch_stops_notifications()
{
    let registry = ProcessRegistry::new();
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&notifications);
    let watcher = registry.watch(Arc::new(move |_event: &str, _id: ListenerId| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    assert_eq!(registry.watcher_count(), 1);

    registry.subscribe("fault", noop());
    assert!(registry.unwatch(watcher));
    assert!(!registry.unwatch(watcher));
    registry.subscribe("fault", noop());

    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    assert_eq!(registry.watcher_count(), 0);
}

#[test]
fn emit_runs_listeners_and_reports_how_many()
{
    let registry = ProcessRegistry::new();
    let messages = Arc::new(Mutex::new(Vec::<String>::new()));
    for _ in 0..2 {
        let messages = Arc::clone(&messages);
        registry.subscribe(
            "fault",
            Arc::new(move |fault: &Fault| {
                messages.lock().unwrap().push(fault.message().to_string());
            }),
        );
    }

    let handled = registry.emit("fault", &Fault::with_trace("boom", ""));

    assert_eq!(handled, 2);
    assert_eq!(*messages.lock().unwrap(), ["boom".to_string(), "boom".to_string()]);
    assert_eq!(registry.emit("silent", &Fault::with_trace("nobody", "")), 0);
}

#[test]
fn callbacks_may_reenter_the_registry()
{
    let registry = Arc::new(ProcessRegistry::new());

    // A listener that removes itself while a fault is being dispatched.
    let slot = Arc::new(Mutex::new(None::<ListenerId>));
    let inner = Arc::clone(&registry);
    let own_id = Arc::clone(&slot);
    let id = registry.subscribe(
        "fault",
        Arc::new(move |_fault: &Fault| {
            if let Some(id) = own_id.lock().unwrap().take() {
                inner.unsubscribe("fault", id);
            }
        }),
    );
    *slot.lock().unwrap() = Some(id);

    assert_eq!(registry.emit("fault", &Fault::with_trace("once", "")), 1);
    assert_eq!(registry.count("fault"), 0);
    assert_eq!(registry.emit("fault", &Fault::with_trace("twice", "")), 0);
}
