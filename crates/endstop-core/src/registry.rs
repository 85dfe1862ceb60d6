//! # Event Registry
//!
//! The process-wide listener registry, abstracted behind a capability trait.
//!
//! The fallback-handler machinery never touches global state directly; it is
//! handed an [`EventRegistry`] and only ever adds or removes its own two
//! registrations. That keeps the state machine unit-testable against a
//! private [`ProcessRegistry`] instance, while production code wires in the
//! shared one from [`process_registry()`].
//!
//! ## Identity
//!
//! Listeners are closures, and closures have no useful identity of their
//! own. The registry therefore issues an opaque [`ListenerId`] at subscribe
//! time; "is this my handler?" is always an id comparison, never a function
//! comparison.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;
use tracing::trace;

use crate::error::Fault;

/// Callback invoked with an uncaught fault.
pub type FaultListener = Arc<dyn Fn(&Fault) + Send + Sync>;

/// Callback invoked whenever any listener is added, with the event name and
/// the newcomer's id.
pub type ListenerWatcher = Arc<dyn Fn(&str, ListenerId) + Send + Sync>;

/// Opaque handle identifying a subscribed listener.
///
/// Ids are unique for the lifetime of a registry and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId
{
    /// Get the raw id value, e.g. for log fields.
    #[must_use]
    pub const fn raw(self) -> u64
    {
        self.0
    }
}

/// Opaque handle identifying a new-listener watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(u64);

impl WatcherId
{
    /// Get the raw id value, e.g. for log fields.
    #[must_use]
    pub const fn raw(self) -> u64
    {
        self.0
    }
}

/// Listener registry interface.
///
/// Events are identified by name. Listeners subscribe to one event;
/// watchers observe every subscription on every event. Dispatch is
/// synchronous: `emit` runs the listeners on the calling thread before it
/// returns, and `subscribe` runs the watchers the same way.
///
/// ## Re-entrancy
///
/// Implementations must invoke listeners and watchers with no internal lock
/// held, so a callback is free to subscribe, unsubscribe, or unwatch —
/// including removing itself.
pub trait EventRegistry: Send + Sync
{
    /// Add `listener` under `event` and return its id.
    ///
    /// Watchers registered at the time of the call are notified after the
    /// listener is in the table, so a watcher that counts listeners for
    /// `event` sees the newcomer included.
    fn subscribe(&self, event: &str, listener: FaultListener) -> ListenerId;

    /// Remove the listener with `id` from `event`.
    ///
    /// Returns `false` when no such listener exists; removing twice is not
    /// an error.
    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool;

    /// Number of listeners currently subscribed to `event`.
    fn count(&self, event: &str) -> usize;

    /// Ids of the listeners currently subscribed to `event`, in
    /// subscription order.
    fn list(&self, event: &str) -> Vec<ListenerId>;

    /// Register a watcher notified on every future `subscribe`.
    fn watch(&self, watcher: ListenerWatcher) -> WatcherId;

    /// Remove the watcher with `id`. Returns `false` when absent.
    fn unwatch(&self, id: WatcherId) -> bool;

    /// Number of watchers currently registered.
    fn watcher_count(&self) -> usize;

    /// Synchronously invoke the listeners of `event` with `fault`.
    ///
    /// Returns how many listeners ran. Listeners added or removed by a
    /// running listener take effect on the next emit, not this one.
    fn emit(&self, event: &str, fault: &Fault) -> usize;
}

#[derive(Default)]
struct RegistryTable
{
    next_id: u64,
    listeners: HashMap<String, Vec<(ListenerId, FaultListener)>>,
    watchers: Vec<(WatcherId, ListenerWatcher)>,
}

impl RegistryTable
{
    fn next_id(&mut self) -> u64
    {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process [`EventRegistry`] implementation.
///
/// A `Mutex` guards the table, but callbacks always run after the guard is
/// dropped; only the table bookkeeping itself is mutually exclusive.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use endstop_core::{EventRegistry, ProcessRegistry};
///
/// let registry = ProcessRegistry::new();
/// let id = registry.subscribe("disk-full", Arc::new(|_fault| {}));
/// assert_eq!(registry.count("disk-full"), 1);
/// assert!(registry.unsubscribe("disk-full", id));
/// assert_eq!(registry.count("disk-full"), 0);
/// ```
pub struct ProcessRegistry
{
    table: Mutex<RegistryTable>,
}

impl ProcessRegistry
{
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self
    {
        ProcessRegistry {
            table: Mutex::new(RegistryTable::default()),
        }
    }

    // A poisoned table is still structurally sound: panicking callbacks run
    // outside the lock, so recover instead of propagating the poison.
    fn table(&self) -> MutexGuard<'_, RegistryTable>
    {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProcessRegistry
{
    fn default() -> Self
    {
        ProcessRegistry::new()
    }
}

impl EventRegistry for ProcessRegistry
{
    fn subscribe(&self, event: &str, listener: FaultListener) -> ListenerId
    {
        let (id, watchers) = {
            let mut table = self.table();
            let id = ListenerId(table.next_id());
            table.listeners.entry(event.to_string()).or_default().push((id, listener));
            let watchers: Vec<ListenerWatcher> = table.watchers.iter().map(|(_, w)| Arc::clone(w)).collect();
            (id, watchers)
        };

        trace!(event, id = id.raw(), "listener subscribed");
        for watcher in watchers {
            watcher(event, id);
        }
        id
    }

    fn unsubscribe(&self, event: &str, id: ListenerId) -> bool
    {
        let mut table = self.table();
        let Some(entries) = table.listeners.get_mut(event) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        let removed = entries.len() != before;
        let now_empty = entries.is_empty();
        if now_empty {
            table.listeners.remove(event);
        }
        drop(table);

        if removed {
            trace!(event, id = id.raw(), "listener unsubscribed");
        }
        removed
    }

    fn count(&self, event: &str) -> usize
    {
        self.table().listeners.get(event).map_or(0, Vec::len)
    }

    fn list(&self, event: &str) -> Vec<ListenerId>
    {
        self.table()
            .listeners
            .get(event)
            .map(|entries| entries.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }

    fn watch(&self, watcher: ListenerWatcher) -> WatcherId
    {
        let mut table = self.table();
        let id = WatcherId(table.next_id());
        table.watchers.push((id, watcher));
        id
    }

    fn unwatch(&self, id: WatcherId) -> bool
    {
        let mut table = self.table();
        let before = table.watchers.len();
        table.watchers.retain(|(existing, _)| *existing != id);
        table.watchers.len() != before
    }

    fn watcher_count(&self) -> usize
    {
        self.table().watchers.len()
    }

    fn emit(&self, event: &str, fault: &Fault) -> usize
    {
        let listeners: Vec<FaultListener> = self
            .table()
            .listeners
            .get(event)
            .map(|entries| entries.iter().map(|(_, listener)| Arc::clone(listener)).collect())
            .unwrap_or_default();

        trace!(event, listeners = listeners.len(), "dispatching fault");
        for listener in &listeners {
            listener(fault);
        }
        listeners.len()
    }
}

static PROCESS_REGISTRY: Lazy<Arc<ProcessRegistry>> = Lazy::new(|| Arc::new(ProcessRegistry::new()));

/// Get the shared process-global registry.
///
/// Every call returns a handle to the same instance; this is the registry
/// the facade crate installs fallback handlers on.
#[must_use]
pub fn process_registry() -> Arc<dyn EventRegistry>
{
    let registry: Arc<dyn EventRegistry> = PROCESS_REGISTRY.clone();
    registry
}
