//! Per-flow storage for the active trace context.
//!
//! Each logical execution flow (thread or task) holds at most one active
//! context. Access within a flow is sequential; isolation between flows is
//! the only concurrency requirement.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::thread::{self, ThreadId};

use crate::context::TraceContext;

/// Storage contract for the calling flow's active context.
pub trait ContextStore: Send + Sync {
    /// The active context for the calling flow, if any.
    fn get(&self) -> Option<TraceContext>;

    /// Replace the calling flow's context.
    fn set(&self, context: TraceContext);

    /// Remove the calling flow's context entirely.
    fn clear(&self);
}

/// Context storage keyed by OS thread.
///
/// Slots live in a mutex-guarded map keyed by [`ThreadId`]; the lock is held
/// only to address the map, never across a traced operation. Each tracer
/// instance owns its own map, so two tracers never observe each other's
/// flows.
#[derive(Debug, Default)]
pub struct ThreadLocalStore {
    slots: Mutex<HashMap<ThreadId, TraceContext>>,
}

impl ThreadLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContextStore for ThreadLocalStore {
    fn get(&self) -> Option<TraceContext> {
        self.slots
            .lock()
            .unwrap()
            .get(&thread::current().id())
            .cloned()
    }

    fn set(&self, context: TraceContext) {
        self.slots
            .lock()
            .unwrap()
            .insert(thread::current().id(), context);
    }

    fn clear(&self) {
        self.slots.lock().unwrap().remove(&thread::current().id());
    }
}

tokio::task_local! {
    static CURRENT_CONTEXT: RefCell<Option<TraceContext>>;
}

/// Context storage scoped to the current tokio task.
///
/// A flow must be entered via [`with_flow`]; outside a flow scope `get`
/// returns `None` and `set`/`clear` are no-ops, not panics. Use this store
/// for async flows, where a task may migrate across worker threads at
/// await points.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskLocalStore;

impl TaskLocalStore {
    pub fn new() -> Self {
        Self
    }
}

impl ContextStore for TaskLocalStore {
    fn get(&self) -> Option<TraceContext> {
        CURRENT_CONTEXT
            .try_with(|slot| slot.borrow().clone())
            .ok()
            .flatten()
    }

    fn set(&self, context: TraceContext) {
        let _ = CURRENT_CONTEXT.try_with(|slot| *slot.borrow_mut() = Some(context));
    }

    fn clear(&self) {
        let _ = CURRENT_CONTEXT.try_with(|slot| *slot.borrow_mut() = None);
    }
}

/// Run a future inside a fresh task-local flow scope.
///
/// Every [`TaskLocalStore`] access made while the future runs sees the same
/// slot, empty at entry and dropped at exit.
pub async fn with_flow<F>(f: F) -> F::Output
where
    F: std::future::Future,
{
    CURRENT_CONTEXT.scope(RefCell::new(None), f).await
}
