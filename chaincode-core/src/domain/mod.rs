//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external dependencies.

pub mod account;
pub mod invocation;
pub mod result;

pub use account::{Account, RegistrarConfig};
pub use invocation::{EntryPoint, Invocation, Operation};
