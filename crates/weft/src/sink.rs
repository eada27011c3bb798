//! Output sink for rendered trace lines.

/// Receives each fully rendered trace line.
pub trait TraceSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Emits trace lines through the `tracing` pipeline at info level,
/// under the `weft::trace` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn emit(&self, line: &str) {
        tracing::info!(target: "weft::trace", "{}", line);
    }
}
