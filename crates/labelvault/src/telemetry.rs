//! Process-wide logging setup.

use tracing_subscriber::EnvFilter;

use crate::error::{ArchiverError, Result};

/// Installs a `fmt` subscriber and routes `log` records through it.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| ArchiverError::Telemetry(format!("invalid log filter: {}", e)))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ArchiverError::Telemetry(e.to_string()))?;
    tracing_log::LogTracer::init().map_err(|e| ArchiverError::Telemetry(e.to_string()))?;

    Ok(())
}
