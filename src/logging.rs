//! Installs the global tracing subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::Log;
use crate::error::{Error, Result};

/// Install the subscriber described by `[log]`. `RUST_LOG`, when set,
/// replaces the configured level.
pub fn init(log: &Log) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .map_err(|e| Error::Config(format!("Invalid log level {:?}: {e}", log.level)))?;

    let installed = if log.json {
        tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_env_filter(filter)
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    installed.map_err(|e| Error::Config(format!("Failed to set up logging: {e}")))
}
