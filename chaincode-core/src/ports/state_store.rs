//! State store port - the ledger's key/value world state

use thiserror::Error;

/// Failures reported by a state store
///
/// `NotFound` is structured so callers never inspect error text to decide
/// control flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl ToString) -> Self {
        Self::Unavailable(msg.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// World-state access provided by the host ledger
///
/// Calls are synchronous and hold nothing beyond their own duration. Ordering
/// between concurrent invocations touching the same key is the host's job.
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// A key that was written with an empty value returns `Ok(vec![])`, not
    /// `NotFound`.
    fn get_state(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous value
    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()>;
}
