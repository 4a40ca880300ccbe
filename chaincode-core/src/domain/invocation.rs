//! Invocation model - operation names, arity table and validated arguments

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Channel an invocation arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Init,
    Invoke,
    Query,
}

impl EntryPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Init => "init",
            EntryPoint::Invoke => "invoke",
            EntryPoint::Query => "query",
        }
    }
}

/// Operations the chaincode exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Write,
    Read,
    CreateAccount,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Init,
        Operation::Write,
        Operation::Read,
        Operation::CreateAccount,
    ];

    /// Look up an operation by its wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Wire name used by callers
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Write => "write",
            Operation::Read => "read",
            Operation::CreateAccount => "createAccount",
        }
    }

    /// Exact number of string arguments the operation takes
    pub fn arity(&self) -> usize {
        match self {
            Operation::Init | Operation::Read | Operation::CreateAccount => 1,
            Operation::Write => 2,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Operation::Read)
    }
}

/// An operation together with its arity-checked arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Init { value: String },
    Write { key: String, value: String },
    Read { key: String },
    CreateAccount { id: String },
}

impl Invocation {
    /// Resolve `name` and validate `args` before anything touches state
    pub fn parse(name: &str, args: &[String]) -> Result<Self> {
        let op = Operation::from_name(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;

        if args.len() != op.arity() {
            return Err(Error::invalid_argument(format!(
                "{} expects {}, got {}",
                op.name(),
                op.arity(),
                args.len()
            )));
        }

        let invocation = match op {
            Operation::Init => Invocation::Init {
                value: args[0].clone(),
            },
            Operation::Write => Invocation::Write {
                key: args[0].clone(),
                value: args[1].clone(),
            },
            Operation::Read => Invocation::Read {
                key: args[0].clone(),
            },
            Operation::CreateAccount => {
                if args[0].is_empty() {
                    return Err(Error::invalid_argument(
                        "createAccount requires a non-empty username",
                    ));
                }
                Invocation::CreateAccount {
                    id: args[0].clone(),
                }
            }
        };

        Ok(invocation)
    }

    pub fn operation(&self) -> Operation {
        match self {
            Invocation::Init { .. } => Operation::Init,
            Invocation::Write { .. } => Operation::Write,
            Invocation::Read { .. } => Operation::Read,
            Invocation::CreateAccount { .. } => Operation::CreateAccount,
        }
    }
}
