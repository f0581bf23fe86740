//! Tracing subscriber setup.
//!
//! The terminal belongs to the UI, so logs go to a file. The embedding
//! application calls [`init_global`] once at startup; tests build their own
//! subscriber with [`build_subscriber`] and install it locally.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber with file-based logging and
/// environment-based filtering (RUST_LOG, default DEBUG).
pub fn init_global(log_file_path: &Path) -> io::Result<()> {
    let log_file = File::create(log_file_path)?;
    build_subscriber(log_file).init();
    Ok(())
}

/// Build a file-writer subscriber. Shared between production and tests.
pub fn build_subscriber(log_file: File) -> impl tracing::Subscriber + Send + Sync {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into());
    let fmt_layer = fmt::layer().with_writer(Arc::new(log_file));

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
