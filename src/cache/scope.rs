//! Per-thread cache scope stack.
//!
//! A scope brackets one logical operation (a document load, typically); the
//! cache it owns deduplicates resolutions within that operation and dies with
//! it. Scopes nest per thread and are never shared: an entry computed on
//! thread A is invisible to thread B, which will issue its own service query.
//! With no scope active, nothing is cached at all.

use std::sync::Arc;
use std::thread::{self, ThreadId};

use dashmap::DashMap;

use super::ResolutionCache;

/// Opaque handle for an open cache scope. Consumed by
/// [`ScopedCacheStack::end_scope`]; scopes must end in reverse order of
/// beginning, on the thread that began them.
#[derive(Debug)]
pub struct ScopeHandle {
    thread: ThreadId,
    depth: usize,
}

/// Thread-indexed registry of cache scope stacks.
#[derive(Debug, Default)]
pub struct ScopedCacheStack {
    stacks: DashMap<ThreadId, Vec<Arc<ResolutionCache>>>,
}

impl ScopedCacheStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a fresh empty cache onto the calling thread's stack.
    pub fn begin_scope(&self) -> ScopeHandle {
        let thread = thread::current().id();
        let mut stack = self.stacks.entry(thread).or_default();
        stack.push(Arc::new(ResolutionCache::new()));
        crate::debug!("cache"; "began scope at depth {}", stack.len());
        ScopeHandle {
            thread,
            depth: stack.len(),
        }
    }

    /// Pop and discard the cache the handle refers to. Caches are never
    /// merged into a parent scope.
    ///
    /// # Panics
    ///
    /// Misusing a handle is a programmer error: ending a scope on a foreign
    /// thread, out of order, or twice panics.
    pub fn end_scope(&self, handle: ScopeHandle) {
        let thread = thread::current().id();
        assert_eq!(
            handle.thread, thread,
            "cache scope must end on the thread that began it"
        );
        let Some(mut stack) = self.stacks.get_mut(&thread) else {
            panic!("cache scope handle used after its scope ended");
        };
        assert_eq!(
            stack.len(),
            handle.depth,
            "cache scopes must end in reverse order of beginning"
        );
        stack.pop();
        crate::debug!("cache"; "ended scope at depth {}", handle.depth);
        let emptied = stack.is_empty();
        drop(stack);
        if emptied {
            self.stacks.remove(&thread);
        }
    }

    /// The calling thread's innermost active cache, if any.
    pub fn current(&self) -> Option<Arc<ResolutionCache>> {
        self.stacks
            .get(&thread::current().id())
            .and_then(|stack| stack.last().cloned())
    }
}

// ============================================================================
// Tests
// ============================================================================
