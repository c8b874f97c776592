use std::fmt::Display;

/// Out-of-band error reporting. Capturing is a side effect at the edges of
/// gateway calls; services never branch on sink state.
pub trait ErrorSink: Send + Sync {
    fn capture(&self, context: &str, error: &dyn Display);
}

/// Sink that swallows everything; the default for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ErrorSink for NullSink {
    fn capture(&self, _context: &str, _error: &dyn Display) {}
}
