//! Tracing initialisation

use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// Install the JSON tracing subscriber
///
/// The filter comes from `service.log_level` (any `EnvFilter` directive);
/// an unparsable directive falls back to `info`. Calling this twice returns
/// an error instead of panicking.
pub fn init_tracing(config: &Config) -> Result<()> {
    let log_level = &config.service.log_level;

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', falling back to info", log_level);
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| Error::Internal(format!("Failed to initialise tracing: {}", e)))?;

    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        "Tracing initialized"
    );

    Ok(())
}
