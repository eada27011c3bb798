//! Call-depth-aware execution tracing.
//!
//! This crate assigns a correlation identifier to a logical request, tracks
//! nested call depth per execution flow, and emits start/end/exception log
//! lines with elapsed time and visual nesting:
//!
//! - **Context**: immutable correlation id + depth values ([`TraceContext`])
//! - **Store**: per-flow context storage ([`ContextStore`], with thread-keyed
//!   and task-local implementations)
//! - **Tracer**: the [`Tracer::begin`] / [`Tracer::end`] / [`Tracer::fail`]
//!   contract with elapsed-time output
//! - **Interceptor**: wraps fallible operations so every exit path closes its
//!   frame and failures propagate unchanged
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use weft::{Interceptor, Tracer};
//!
//! let tracer = Arc::new(Tracer::new());
//! let boundary = Interceptor::new(Arc::clone(&tracer));
//! let service = boundary.clone();
//!
//! let result: Result<u32, String> = boundary.wrap("Handler::request", || {
//!     service.wrap("Service::load", || Ok(41)).map(|n| n + 1)
//! });
//! assert_eq!(result, Ok(42));
//! ```
//!
//! Which logs one nested trace under a single correlation id:
//!
//! ```text
//! [b5fe4d52] Handler::request
//! [b5fe4d52] |-->Service::load
//! [b5fe4d52] |<--Service::load time=0ms
//! [b5fe4d52] Handler::request time=0ms
//! ```
//!
//! # Async flows
//!
//! Tasks can migrate across worker threads at await points, so async flows
//! use [`TaskLocalStore`] and enter a flow scope via [`with_flow`]:
//!
//! ```rust
//! use std::sync::Arc;
//! use weft::{Interceptor, TaskLocalStore, Tracer, with_flow};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tracer = Arc::new(Tracer::new().with_store(Arc::new(TaskLocalStore::new())));
//! let intercept = Interceptor::new(tracer);
//!
//! let result: Result<&str, String> = with_flow(async {
//!     intercept.wrap_future("Worker::run", async { Ok("done") }).await
//! })
//! .await;
//! assert_eq!(result, Ok("done"));
//! # }
//! ```

pub mod clock;
pub mod context;
pub mod intercept;
pub mod sink;
pub mod store;
pub mod testing;
pub mod tracer;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use context::TraceContext;
pub use intercept::Interceptor;
pub use sink::{LogSink, TraceSink};
pub use store::{ContextStore, TaskLocalStore, ThreadLocalStore, with_flow};
pub use tracer::{TraceRecord, Tracer};
