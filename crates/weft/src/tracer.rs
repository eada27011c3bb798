//! The begin/end/fail tracing contract.
//!
//! `begin` reads or creates the flow's context, emits a start line, and
//! returns a [`TraceRecord`] that the matching `end` or `fail` consumes by
//! value, so a record cannot close a frame twice. The store transitions
//! with the frames: created on the first `begin` of a flow, cleared when
//! the outermost frame closes.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::clock::{Clock, SystemClock};
use crate::context::TraceContext;
use crate::sink::{LogSink, TraceSink};
use crate::store::{ContextStore, ThreadLocalStore};

const START_MARKER: &str = "-->";
const COMPLETE_MARKER: &str = "<--";
const EXCEPTION_MARKER: &str = "<X-";

/// Snapshot taken at `begin`, consumed by the matching `end`/`fail`.
#[derive(Debug)]
pub struct TraceRecord {
    context: TraceContext,
    started_at: Instant,
    label: String,
}

impl TraceRecord {
    /// The context active when the call began.
    pub fn context(&self) -> &TraceContext {
        &self.context
    }

    /// The operation name supplied to `begin`.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Call-depth-aware tracer.
///
/// Defaults to a thread-keyed store, the real clock, and log output via the
/// `tracing` crate; each collaborator can be swapped with the `with_*`
/// builders (e.g. a [`TaskLocalStore`](crate::store::TaskLocalStore) for
/// async flows, or the doubles in [`crate::testing`] for assertions).
pub struct Tracer {
    store: Arc<dyn ContextStore>,
    sink: Arc<dyn TraceSink>,
    clock: Arc<dyn Clock>,
}

impl Tracer {
    /// Create a tracer with the default collaborators.
    pub fn new() -> Self {
        Self {
            store: Arc::new(ThreadLocalStore::new()),
            sink: Arc::new(LogSink),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the context store.
    pub fn with_store(mut self, store: Arc<dyn ContextStore>) -> Self {
        self.store = store;
        self
    }

    /// Replace the output sink.
    pub fn with_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Open a frame.
    ///
    /// Descends the flow's context, creating a root context with a fresh id
    /// on the flow's first call, writes it back to the store, and emits the
    /// start line. Must be paired with exactly one [`end`](Self::end) or
    /// [`fail`](Self::fail) on every exit path.
    pub fn begin(&self, label: impl Into<String>) -> TraceRecord {
        let label = label.into();
        let context = match self.store.get() {
            Some(current) => current.descend(),
            None => TraceContext::root(),
        };
        self.store.set(context.clone());
        let started_at = self.clock.now();

        self.sink.emit(&format!(
            "[{}] {}{}",
            context.id(),
            indent(context.depth(), START_MARKER),
            label
        ));

        TraceRecord {
            context,
            started_at,
            label,
        }
    }

    /// Close a frame successfully, emitting the completion line with the
    /// elapsed whole milliseconds since the matching `begin`.
    pub fn end(&self, record: TraceRecord) {
        self.complete(record, None);
    }

    /// Close a frame that failed, emitting the exception line with the
    /// error's description appended.
    ///
    /// The error is only rendered here; re-raising it to the caller stays
    /// the caller's responsibility, and its content is never altered.
    pub fn fail(&self, record: TraceRecord, error: impl fmt::Display) {
        self.complete(record, Some(error.to_string()));
    }

    fn complete(&self, record: TraceRecord, error: Option<String>) {
        let elapsed_ms = self
            .clock
            .now()
            .saturating_duration_since(record.started_at)
            .as_millis();
        let context = &record.context;

        let line = match &error {
            None => format!(
                "[{}] {}{} time={}ms",
                context.id(),
                indent(context.depth(), COMPLETE_MARKER),
                record.label,
                elapsed_ms
            ),
            Some(description) => format!(
                "[{}] {}{} time={}ms ex={}",
                context.id(),
                indent(context.depth(), EXCEPTION_MARKER),
                record.label,
                elapsed_ms,
                description
            ),
        };
        self.sink.emit(&line);

        self.release(&record);
    }

    // Ascend the store after a frame closes; the flow ends with its
    // outermost frame.
    fn release(&self, record: &TraceRecord) {
        if self.store.get().is_none() {
            tracing::warn!(
                target: "weft",
                "'{}' closed with no active context; begin/end pairing is broken",
                record.label
            );
            return;
        }
        match record.context.ascend() {
            Some(parent) => self.store.set(parent),
            None => self.store.clear(),
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the depth prefix: one `|   ` group per enclosing frame, the
/// innermost group carrying the marker. Depth 0 renders nothing.
fn indent(depth: u32, marker: &str) -> String {
    let mut out = String::new();
    for level in 0..depth {
        if level + 1 == depth {
            out.push('|');
            out.push_str(marker);
        } else {
            out.push_str("|   ");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualClock, MemorySink};

    fn memory_tracer() -> (Tracer, Arc<MemorySink>, Arc<ThreadLocalStore>) {
        let sink = Arc::new(MemorySink::new());
        let store = Arc::new(ThreadLocalStore::new());
        let tracer = Tracer::new()
            .with_store(store.clone() as Arc<dyn ContextStore>)
            .with_sink(sink.clone() as Arc<dyn TraceSink>)
            .with_clock(Arc::new(ManualClock::new()));
        (tracer, sink, store)
    }

    #[test]
    fn test_indent_rendering() {
        assert_eq!(indent(0, START_MARKER), "");
        assert_eq!(indent(1, START_MARKER), "|-->");
        assert_eq!(indent(2, START_MARKER), "|   |-->");
        assert_eq!(indent(3, EXCEPTION_MARKER), "|   |   |<X-");
    }

    #[test]
    fn test_begin_creates_root_then_descends() {
        let (tracer, _sink, store) = memory_tracer();

        let outer = tracer.begin("outer");
        assert!(outer.context().is_root());
        assert_eq!(store.get().unwrap().depth(), 0);

        let inner = tracer.begin("inner");
        assert_eq!(inner.context().depth(), 1);
        assert_eq!(inner.context().id(), outer.context().id());
        assert_eq!(store.get().unwrap().depth(), 1);

        tracer.end(inner);
        assert_eq!(store.get().unwrap().depth(), 0);

        tracer.end(outer);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_line_format() {
        let (tracer, sink, _store) = memory_tracer();

        let outer = tracer.begin("outer");
        let inner = tracer.begin("inner");
        let id = outer.context().id().to_string();
        tracer.end(inner);
        tracer.end(outer);

        assert_eq!(
            sink.lines(),
            vec![
                format!("[{}] outer", id),
                format!("[{}] |-->inner", id),
                format!("[{}] |<--inner time=0ms", id),
                format!("[{}] outer time=0ms", id),
            ]
        );
    }

    #[test]
    fn test_fail_appends_error_description() {
        let (tracer, sink, store) = memory_tracer();

        let record = tracer.begin("op");
        let id = record.context().id().to_string();
        tracer.fail(record, "boom");

        assert_eq!(sink.lines()[1], format!("[{}] op time=0ms ex=boom", id));
        assert!(store.get().is_none());
    }

    #[test]
    fn test_close_without_context_does_not_panic() {
        let (tracer, sink, store) = memory_tracer();

        let record = tracer.begin("op");
        store.clear();
        tracer.end(record);

        // The completion line is still emitted from the record.
        assert_eq!(sink.lines().len(), 2);
        assert!(store.get().is_none());
    }
}
