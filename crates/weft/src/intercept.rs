//! Wraps arbitrary fallible operations with trace bookkeeping.
//!
//! The wrapper owns the begin/end/fail pairing, so every exit path closes
//! the frame it opened, success or failure. Failures are returned to the
//! caller unchanged: same type, same content, no wrapping.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::tracer::Tracer;

/// Applies the tracer around operations at a layer boundary.
///
/// Clone one handle per layer; a single inbound call then produces one
/// nested trace whose depth grows by one per layer, under the same
/// correlation id throughout. The wrapped code needs no knowledge of the
/// tracer.
#[derive(Clone)]
pub struct Interceptor {
    tracer: Arc<Tracer>,
}

impl Interceptor {
    pub fn new(tracer: Arc<Tracer>) -> Self {
        Self { tracer }
    }

    /// The tracer this interceptor wraps operations with.
    pub fn tracer(&self) -> &Arc<Tracer> {
        &self.tracer
    }

    /// Trace a synchronous operation.
    pub fn wrap<T, E, F>(&self, label: impl Into<String>, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: fmt::Display,
    {
        let record = self.tracer.begin(label);
        match operation() {
            Ok(value) => {
                self.tracer.end(record);
                Ok(value)
            }
            Err(error) => {
                self.tracer.fail(record, &error);
                Err(error)
            }
        }
    }

    /// Trace an asynchronous operation.
    ///
    /// The tracer itself never suspends; any await happens inside the
    /// wrapped future. Pair with a
    /// [`TaskLocalStore`](crate::store::TaskLocalStore) and
    /// [`with_flow`](crate::store::with_flow) when tasks may migrate
    /// across threads.
    pub async fn wrap_future<T, E, F>(&self, label: impl Into<String>, operation: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let record = self.tracer.begin(label);
        match operation.await {
            Ok(value) => {
                self.tracer.end(record);
                Ok(value)
            }
            Err(error) => {
                self.tracer.fail(record, &error);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TraceSink;
    use crate::store::ContextStore;
    use crate::store::ThreadLocalStore;
    use crate::testing::MemorySink;

    fn memory_interceptor() -> (Interceptor, Arc<MemorySink>, Arc<ThreadLocalStore>) {
        let sink = Arc::new(MemorySink::new());
        let store = Arc::new(ThreadLocalStore::new());
        let tracer = Tracer::new()
            .with_store(store.clone() as Arc<dyn ContextStore>)
            .with_sink(sink.clone() as Arc<dyn TraceSink>);
        (Interceptor::new(Arc::new(tracer)), sink, store)
    }

    #[test]
    fn test_wrap_returns_value_unchanged() {
        let (intercept, sink, store) = memory_interceptor();

        let result: Result<u32, String> = intercept.wrap("op", || Ok(7));

        assert_eq!(result, Ok(7));
        assert_eq!(sink.lines().len(), 2);
        assert!(store.get().is_none());
    }

    #[test]
    fn test_wrap_reraises_error_unchanged() {
        let (intercept, sink, store) = memory_interceptor();

        let result: Result<(), String> = intercept.wrap("op", || Err("boom".to_string()));

        assert_eq!(result, Err("boom".to_string()));
        assert!(sink.lines()[1].contains("<X-") || sink.lines()[1].contains("ex=boom"));
        assert!(store.get().is_none());
    }

    #[test]
    fn test_nested_wrap_shares_one_id() {
        let (intercept, sink, _store) = memory_interceptor();
        let inner = intercept.clone();

        let result: Result<u32, String> =
            intercept.wrap("outer", || inner.wrap("inner", || Ok(1)));

        assert_eq!(result, Ok(1));
        let lines = sink.lines();
        assert_eq!(lines.len(), 4);
        let id = &lines[0][..lines[0].find(']').unwrap() + 1];
        assert!(lines.iter().all(|line| line.starts_with(id)));
        assert!(lines[1].contains("|-->inner"));
    }

    #[tokio::test]
    async fn test_wrap_future_success() {
        let (intercept, sink, _store) = memory_interceptor();

        let result: Result<&str, String> =
            intercept.wrap_future("op", async { Ok("done") }).await;

        assert_eq!(result, Ok("done"));
        assert_eq!(sink.lines().len(), 2);
    }
}
