//! Injected logging capability
//!
//! Stores report progress through a [`StoreLogger`] handed to them at
//! construction instead of a process-wide logger. Messages are purely
//! informational.

/// Sink for informational store messages
pub trait StoreLogger: Send + Sync {
    /// Record an informational message
    fn info(&self, message: &str);
}

/// Forwards messages to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl StoreLogger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }
}

/// Discards every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl StoreLogger for NullLogger {
    fn info(&self, _message: &str) {}
}
