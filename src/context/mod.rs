//! Per-thread anchor binding stack.
//!
//! Each thread carries a stack of active base locations; the top is the
//! implicit anchor for relative resolution while a document-level operation
//! runs. Binding state never leaks across threads.

use std::thread::{self, ThreadId};

use dashmap::DashMap;

/// Thread-indexed stack of active base locations.
#[derive(Debug, Default)]
pub struct ContextBindingStack {
    stacks: DashMap<ThreadId, Vec<String>>,
}

impl ContextBindingStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an anchor as the calling thread's active base location.
    pub fn bind(&self, anchor: &str) {
        crate::debug!("context"; "bound {anchor}");
        self.stacks
            .entry(thread::current().id())
            .or_default()
            .push(anchor.to_string());
    }

    /// Pop the matching bind. The anchor names what the bind pushed so that
    /// mismatched pairs show up in debug output; the top is popped
    /// regardless.
    pub fn unbind(&self, anchor: &str) {
        let thread = thread::current().id();
        let Some(mut stack) = self.stacks.get_mut(&thread) else {
            crate::debug!("context"; "unbind of {anchor} with no bound context");
            return;
        };
        if let Some(top) = stack.pop() {
            if top != anchor {
                crate::debug!("context"; "unbind mismatch: expected {top}, got {anchor}");
            }
        }
        let emptied = stack.is_empty();
        drop(stack);
        if emptied {
            self.stacks.remove(&thread);
        }
    }

    /// Bind an anchor for the duration of the returned guard. The guard
    /// unbinds on drop, including during unwinding.
    pub fn enter(&self, anchor: &str) -> BoundContext<'_> {
        self.bind(anchor);
        BoundContext {
            stack: self,
            anchor: anchor.to_string(),
        }
    }

    /// The calling thread's active base location; empty when none is bound.
    pub fn current(&self) -> String {
        self.stacks
            .get(&thread::current().id())
            .and_then(|stack| stack.last().cloned())
            .unwrap_or_default()
    }
}

/// RAII binding for one anchor.
#[derive(Debug)]
pub struct BoundContext<'a> {
    stack: &'a ContextBindingStack,
    anchor: String,
}

impl BoundContext<'_> {
    /// The anchor this guard holds bound.
    pub fn anchor(&self) -> &str {
        &self.anchor
    }
}

impl Drop for BoundContext<'_> {
    fn drop(&mut self) {
        self.stack.unbind(&self.anchor);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_unbind_nesting() {
        let contexts = ContextBindingStack::new();
        assert_eq!(contexts.current(), "");

        contexts.bind("omniverse://host/a.usd");
        contexts.bind("omniverse://host/b.usd");
        assert_eq!(contexts.current(), "omniverse://host/b.usd");

        contexts.unbind("omniverse://host/b.usd");
        assert_eq!(contexts.current(), "omniverse://host/a.usd");
        contexts.unbind("omniverse://host/a.usd");
        assert_eq!(contexts.current(), "");
    }

    #[test]
    fn test_guard_unbinds_on_drop() {
        let contexts = ContextBindingStack::new();
        {
            let _guard = contexts.enter("omniverse://host/a.usd");
            assert_eq!(contexts.current(), "omniverse://host/a.usd");
        }
        assert_eq!(contexts.current(), "");
    }

    #[test]
    fn test_guard_unbinds_during_unwinding() {
        let contexts = ContextBindingStack::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = contexts.enter("omniverse://host/a.usd");
            panic!("boom");
        }));
        assert!(result.is_err());
        assert_eq!(contexts.current(), "");
    }

    #[test]
    fn test_bindings_do_not_cross_threads() {
        let contexts = std::sync::Arc::new(ContextBindingStack::new());
        contexts.bind("omniverse://host/main.usd");

        let remote = std::sync::Arc::clone(&contexts);
        std::thread::spawn(move || {
            assert_eq!(remote.current(), "");
        })
        .join()
        .unwrap();

        contexts.unbind("omniverse://host/main.usd");
    }
}
