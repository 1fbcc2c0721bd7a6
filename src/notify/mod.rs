//! Resolver lifecycle event notifications.
//!
//! A fire-and-forget side channel: the engine reports when it starts,
//! finishes or fails resolving, reading or writing an asset, and registered
//! sinks get told. Nothing a sink does affects resolution results.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;

/// Phase of the asset lifecycle an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverEvent {
    Resolving,
    Reading,
    Writing,
}

/// Progress state of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
    Started,
    Success,
    Failure,
}

/// Callback receiving `(identifier, event, state, byte size)`.
pub type EventCallback = Box<dyn Fn(&str, ResolverEvent, EventState, u64) + Send + Sync>;

/// Registry of event sinks.
#[derive(Default)]
pub struct Notifier {
    callbacks: Mutex<BTreeMap<u32, EventCallback>>,
    next_handle: AtomicU32,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(BTreeMap::new()),
            next_handle: AtomicU32::new(1),
        }
    }

    /// Register a sink; the returned handle unregisters it.
    pub fn register(&self, callback: EventCallback) -> u32 {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.callbacks.lock().insert(handle, callback);
        handle
    }

    /// Remove a sink. Returns true if the handle was registered.
    pub fn unregister(&self, handle: u32) -> bool {
        self.callbacks.lock().remove(&handle).is_some()
    }

    /// Deliver an event to every registered sink, in registration order.
    pub fn send(&self, identifier: &str, event: ResolverEvent, state: EventState, size: u64) {
        for callback in self.callbacks.lock().values() {
            callback(identifier, event, state, size);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("callbacks", &self.callbacks.lock().len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
