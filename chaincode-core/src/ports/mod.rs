//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The registrar and
//! dispatcher depend only on these traits, never on a concrete store.

mod state_store;

pub use state_store::{StateStore, StoreError, StoreResult};
