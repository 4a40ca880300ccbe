//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the StateStore port (local peer world state)
//! - In-memory map for tests and embedding

pub mod duckdb;
pub mod memory;
