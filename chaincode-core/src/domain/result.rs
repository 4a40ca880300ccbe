//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to the invocation caller
///
/// Every variant is terminal for the current invocation. Nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Incorrect number of arguments: {0}")]
    InvalidArgument(String),

    #[error("Error encoding account {0}")]
    EncodingFailed(String),

    #[error("Can't reinitialize existing user {0}")]
    AlreadyExists(String),

    #[error("Error unmarshalling existing account {0}")]
    CorruptExistingRecord(String),

    #[error("State store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Failed to write state for {target} => {cause}")]
    StoreWriteFailed { target: String, cause: String },

    #[error("Failed to get state for {0}")]
    KeyReadFailed(String),

    #[error("Received unknown function invocation: {0}")]
    UnknownOperation(String),

    #[error("Function {0} modifies state and cannot be queried")]
    QueryNotPermitted(String),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a write failure for `target` (account id or state key)
    pub fn write_failed(target: impl Into<String>, cause: impl ToString) -> Self {
        Self::StoreWriteFailed {
            target: target.into(),
            cause: cause.to_string(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Serializable outcome of one invocation (CLI `--json` output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a successful result with context
    pub fn ok_with_context(data: T, context: HashMap<String, serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: Some(context),
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
