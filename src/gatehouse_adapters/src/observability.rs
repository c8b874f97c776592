use std::fmt::Display;

use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use gatehouse_core::ports::sink::ErrorSink;

/// Install the global tracing subscriber: compact formatting, `RUST_LOG`
/// filtering (default `info`), and span traces on errors.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let fmt_layer = fmt::layer().compact();
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(())
}

/// Error sink that reports captured gateway failures through tracing. The
/// services emit through this instead of logging directly so tests can
/// observe degraded paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn capture(&self, context: &str, error: &dyn Display) {
        tracing::error!(context, %error, "gateway call failed");
    }
}
