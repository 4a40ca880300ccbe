//! CLI command implementations

pub mod account;
pub mod config;
pub mod init;
pub mod invoke;
pub mod logs;
pub mod query;
pub mod status;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chaincode_core::config::Config;
use chaincode_core::{ChaincodeContext, EntryPoint, LoggingService};
use tracing_subscriber::EnvFilter;

/// Install the stderr diagnostic subscriber
///
/// `CHAINCODE_LOG` wins over the `logFilter` setting; the default is `warn`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("CHAINCODE_LOG").unwrap_or_else(|_| {
        let configured = Config::load(&get_chaincode_dir())
            .ok()
            .and_then(|c| c.log_filter)
            .unwrap_or_else(|| "warn".to_string());
        EnvFilter::new(configured)
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let chaincode_dir = get_chaincode_dir();
    std::fs::create_dir_all(&chaincode_dir).ok()?;
    match LoggingService::new(&chaincode_dir, env!("CARGO_PKG_VERSION")) {
        Ok(service) => Some(service),
        Err(e) => {
            tracing::debug!(error = %e, "invocation log unavailable");
            None
        }
    }
}

/// Record an invocation outcome, ignoring logging errors
pub fn log_outcome<T>(
    logger: &Option<LoggingService>,
    entry_point: EntryPoint,
    function: &str,
    arg_count: usize,
    result: &chaincode_core::domain::result::Result<T>,
) {
    if let Some(l) = logger {
        let _ = match result {
            Ok(_) => l.log_invocation(entry_point, function, arg_count),
            Err(e) => l.log_failure(entry_point, function, arg_count, &e.to_string()),
        };
    }
}

/// Get the chaincode directory from environment or default
pub fn get_chaincode_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHAINCODE_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".chaincode")
    }
}

/// Open the local world state and build the chaincode services
pub fn get_context() -> Result<ChaincodeContext> {
    let chaincode_dir = get_chaincode_dir();

    std::fs::create_dir_all(&chaincode_dir)
        .with_context(|| format!("Failed to create chaincode directory: {:?}", chaincode_dir))?;

    ChaincodeContext::new(&chaincode_dir).context("Failed to initialize chaincode context")
}

/// Turn a chaincode error into the CLI's error after it has been reported
pub fn invocation_failed(function: &str, err: &chaincode_core::Error) -> anyhow::Error {
    anyhow!("{} failed: {}", function, err)
}
