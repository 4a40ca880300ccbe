//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on one concern of the chaincode or the local peer around it.

mod dispatch;
pub mod logging;
pub mod migration;
mod registrar;
pub mod state;
mod status;

pub use dispatch::{Dispatcher, Payload};
pub use logging::{FunctionStats, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use registrar::AccountRegistrar;
pub use state::StateService;
pub use status::{AccountSummary, StatusService, StatusSummary};
