//! # Failsafe
//!
//! Installs a last-resort fault handler, and steps aside the moment a more
//! specific handler is registered by anyone else.
//!
//! The rules are small and strict:
//!
//! - `install` only does anything when zero fault listeners exist; the
//!   first successfully installed handler wins and later installs are
//!   inert no-ops.
//! - A new-listener watcher rides along with the handler. When any other
//!   listener arrives on the fault event, the watcher removes the fallback
//!   handler and then itself, yielding control entirely to the newcomer.
//! - Every install returns an [`UndoToken`]; invoking it removes whatever
//!   that install added, no matter how many times it is invoked or whether
//!   the watcher already cleaned up.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::debug;

use crate::error::Fault;
use crate::host::{process_host, Host};
use crate::registry::{process_registry, EventRegistry, FaultListener, ListenerId, WatcherId};

/// Registry event on which uncaught faults are dispatched.
///
/// The same tag prefixes the diagnostic line written by the default
/// handler, so grepping logs for it finds every last-resort report.
pub const FAULT_EVENT: &str = "uncaughtException";

/// RFC-1123 layout for the diagnostic timestamp.
const RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Manages the last-resort fault handler for one registry/host pair.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use endstop_core::{process_host, EventRegistry, Failsafe, ProcessRegistry, FAULT_EVENT};
///
/// let registry: Arc<dyn EventRegistry> = Arc::new(ProcessRegistry::new());
/// let failsafe = Failsafe::new(Arc::clone(&registry), process_host());
///
/// let undo = failsafe.install();
/// assert_eq!(registry.count(FAULT_EVENT), 1);
///
/// undo.undo();
/// assert_eq!(registry.count(FAULT_EVENT), 0);
/// ```
pub struct Failsafe
{
    registry: Arc<dyn EventRegistry>,
    host: Arc<dyn Host>,
}

/// The two registrations one successful install owns.
///
/// Shared between the watcher closure and the undo token: whichever side
/// takes the handles first performs the removal, and the other side finds
/// them already gone.
#[derive(Default)]
struct Handles
{
    listener: Option<ListenerId>,
    watcher: Option<WatcherId>,
}

fn lock(handles: &Mutex<Handles>) -> MutexGuard<'_, Handles>
{
    handles.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Failsafe
{
    /// Create a manager over the given registry and host.
    #[must_use]
    pub fn new(registry: Arc<dyn EventRegistry>, host: Arc<dyn Host>) -> Self
    {
        Failsafe { registry, host }
    }

    /// Create a manager over the process-global registry and the real host.
    ///
    /// ```rust,no_run
    /// use endstop_core::Failsafe;
    ///
    /// let _undo = Failsafe::with_process_defaults().install();
    /// ```
    #[must_use]
    pub fn with_process_defaults() -> Self
    {
        Failsafe::new(process_registry(), process_host())
    }

    /// Install the default fault handler, if no fault handler exists yet.
    ///
    /// The default handler writes a timestamped diagnostic line and the
    /// fault's stack trace to the host's diagnostic stream, then terminates
    /// the process with exit code 1. It is the handler of last resort: it
    /// reports the fault and ends the process rather than attempting
    /// recovery.
    pub fn install(&self) -> UndoToken
    {
        let host = Arc::clone(&self.host);
        self.install_with(Arc::new(move |fault: &Fault| failsafe(host.as_ref(), fault)))
    }

    /// Install `handler` as the fault handler, if no fault handler exists
    /// yet.
    ///
    /// When one or more fault listeners are already registered the call
    /// changes nothing and returns an inert token: another handler already
    /// governs fault handling and this manager stays transparent.
    pub fn install_with(&self, handler: FaultListener) -> UndoToken
    {
        let existing = self.registry.count(FAULT_EVENT);
        if existing > 0 {
            debug!(existing, "fault handler already registered, staying out of the way");
            return UndoToken {
                registry: Arc::clone(&self.registry),
                handles: Arc::new(Mutex::new(Handles::default())),
            };
        }

        let handles = Arc::new(Mutex::new(Handles::default()));
        let listener = self.registry.subscribe(FAULT_EVENT, handler);
        lock(&handles).listener = Some(listener);

        let registry = Arc::clone(&self.registry);
        let watcher_handles = Arc::clone(&handles);
        let watcher = self.registry.watch(Arc::new(move |event: &str, newcomer: ListenerId| {
            if event != FAULT_EVENT {
                return;
            }

            let (listener, watcher) = {
                let mut handles = lock(&watcher_handles);
                if handles.listener == Some(newcomer) {
                    // Our own registration, nothing to yield to.
                    return;
                }
                (handles.listener.take(), handles.watcher.take())
            };

            if let Some(id) = listener {
                registry.unsubscribe(FAULT_EVENT, id);
                debug!(newcomer = newcomer.raw(), "yielding fault handling to newer listener");
            }
            if let Some(id) = watcher {
                registry.unwatch(id);
            }
        }));
        lock(&handles).watcher = Some(watcher);

        debug!(listener = listener.raw(), "fallback fault handler installed");
        UndoToken {
            registry: Arc::clone(&self.registry),
            handles,
        }
    }
}

/// The default, fatal fault handler.
fn failsafe(host: &dyn Host, fault: &Fault)
{
    let stamp = Utc::now().format(RFC1123);
    host.write_diagnostic(&format!("{stamp} {FAULT_EVENT} {}", fault.message()));
    host.write_diagnostic(fault.trace());
    host.terminate(1);
}

/// Reverses one `install` call.
///
/// `undo` removes the fault listener and the watcher that install added.
/// It is idempotent, and remains safe after the watcher already
/// self-deregistered in favor of a competing handler. Tokens from installs
/// that added nothing (a handler already existed) are valid and do
/// nothing.
///
/// Dropping the token does *not* undo anything; a fallback handler is
/// expected to outlive the scope that installed it.
#[must_use = "dropping the token discards the only way to uninstall the handler"]
pub struct UndoToken
{
    registry: Arc<dyn EventRegistry>,
    handles: Arc<Mutex<Handles>>,
}

impl UndoToken
{
    /// Remove the registrations made by the `install` call that returned
    /// this token, if they are still present.
    pub fn undo(&self)
    {
        let (listener, watcher) = {
            let mut handles = lock(&self.handles);
            (handles.listener.take(), handles.watcher.take())
        };

        if let Some(id) = listener {
            self.registry.unsubscribe(FAULT_EVENT, id);
            debug!(listener = id.raw(), "fallback fault handler removed");
        }
        if let Some(id) = watcher {
            self.registry.unwatch(id);
        }
    }
}
