//! Log sinks: where diagnostic lines go.
use std::sync::{Mutex, PoisonError};

/// Destination for error diagnostics.
pub trait LogSink: Send + Sync {
    fn error(&self, line: &str);
}

/// Forwards lines to `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn error(&self, line: &str) {
        tracing::error!(target: "interop", "{}", line);
    }
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All lines joined with newlines.
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }
}

impl LogSink for MemorySink {
    fn error(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn error(&self, line: &str) {
        self(line)
    }
}
