//! Tracing subscriber setup for the binary.
//!
//! Library code logs through the `log` facade; the subscriber's
//! `tracing-log` bridge picks those records up. Everything goes to stderr
//! so stdout carries only the JSON result.

use crate::cli::LogFormat;

use anyhow::{anyhow, Result};
use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a filter directive, e.g. `swquery_spacewalk=debug`.
pub const LOG_ENV: &str = "SWQUERY_LOG";

/// Filter directive for this run. `--verbose` forces debug.
pub fn filter(verbose: bool) -> Result<EnvFilter> {
    if verbose {
        return EnvFilter::try_new("debug").map_err(|e| anyhow!("Failed to create log filter: {e}"));
    }
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow!("Failed to create log filter: {e}"))
}

/// Install the global subscriber.
pub fn init_logging(verbose: bool, format: LogFormat) -> Result<()> {
    let env_filter = filter(verbose)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(io::stderr).with_target(true).compact())
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().with_writer(io::stderr).with_target(true).json())
            .try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn verbose_overrides_environment() {
        std::env::set_var(LOG_ENV, "warn");
        let f = filter(true).unwrap();
        std::env::remove_var(LOG_ENV);
        assert_eq!(f.to_string(), "debug");
    }

    #[test]
    #[serial]
    fn environment_then_default() {
        std::env::set_var(LOG_ENV, "swquery_spacewalk=trace");
        let f = filter(false).unwrap();
        std::env::remove_var(LOG_ENV);
        assert_eq!(f.to_string(), "swquery_spacewalk=trace");

        assert_eq!(filter(false).unwrap().to_string(), "info");
    }
}
