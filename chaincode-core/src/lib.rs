//! Chaincode Core - account chaincode over a ledger state store
//!
//! The crate follows hexagonal architecture:
//!
//! - **domain**: the Account record, invocation model and error taxonomy
//! - **ports**: the `StateStore` trait the ledger host provides
//! - **services**: account registrar, key/value helpers, dispatcher, audit log
//! - **adapters**: concrete state stores (DuckDB for a local peer, in-memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::duckdb::DuckDbStateStore;
use config::Config;
use ports::StateStore;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{Account, EntryPoint, Invocation, Operation, RegistrarConfig};
pub use services::{LogEntry, LogEvent, LoggingService};

/// A chaincode wired to a local peer's world state
///
/// Holds the configuration, the DuckDB-backed state store and the services
/// built on top of it.
pub struct ChaincodeContext {
    pub config: Config,
    pub store: Arc<DuckDbStateStore>,
    pub dispatcher: Dispatcher,
    pub status_service: StatusService,
}

impl ChaincodeContext {
    /// Open the world state in `chaincode_dir` and build the services
    pub fn new(chaincode_dir: &Path) -> Result<Self> {
        let config = Config::load(chaincode_dir)?;

        let db_path = chaincode_dir.join(&config.state_file);
        let store = Arc::new(
            DuckDbStateStore::new(&db_path)
                .with_context(|| format!("Failed to open world state at {:?}", db_path))?,
        );
        store.ensure_schema()?;

        Ok(Self::with_store(config, store))
    }

    /// Build the services over an already opened store
    pub fn with_store(config: Config, store: Arc<DuckDbStateStore>) -> Self {
        let shared: Arc<dyn StateStore> = store.clone();

        let registrar = AccountRegistrar::new(Arc::clone(&shared), config.registrar());
        let state_service = StateService::new(Arc::clone(&shared), config.sentinel_key.clone());
        let dispatcher = Dispatcher::new(registrar, state_service);
        let status_service = StatusService::new(
            Arc::clone(&store),
            config.registrar(),
            config.sentinel_key.clone(),
        );

        Self {
            config,
            store,
            dispatcher,
            status_service,
        }
    }
}
