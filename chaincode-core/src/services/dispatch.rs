//! Dispatcher - routes named invocations to their handlers

use tracing::{debug, info};

use crate::domain::result::{Error, Result};
use crate::domain::{EntryPoint, Invocation};

use super::registrar::AccountRegistrar;
use super::state::StateService;

/// Payload returned by an invocation; only reads produce bytes
pub type Payload = Option<Vec<u8>>;

pub struct Dispatcher {
    registrar: AccountRegistrar,
    state: StateService,
}

impl Dispatcher {
    pub fn new(registrar: AccountRegistrar, state: StateService) -> Self {
        Self { registrar, state }
    }

    pub fn registrar(&self) -> &AccountRegistrar {
        &self.registrar
    }

    pub fn state(&self) -> &StateService {
        &self.state
    }

    /// Route `function` with `args` to its handler
    pub fn dispatch(&self, function: &str, args: &[String]) -> Result<Payload> {
        let invocation = Invocation::parse(function, args)?;
        self.execute(invocation)
    }

    /// Entry point for state-changing transactions
    pub fn invoke(&self, function: &str, args: &[String]) -> Result<Payload> {
        info!(function, entry = EntryPoint::Invoke.as_str(), "invoke is running");
        self.dispatch(function, args)
    }

    /// Entry point for read-only queries; mutating operations are refused
    pub fn query(&self, function: &str, args: &[String]) -> Result<Payload> {
        info!(function, entry = EntryPoint::Query.as_str(), "query is running");
        let invocation = Invocation::parse(function, args)?;
        let op = invocation.operation();
        if !op.is_read_only() {
            debug!(function, "query refused for mutating operation");
            return Err(Error::QueryNotPermitted(op.name().to_string()));
        }
        self.execute(invocation)
    }

    /// Reset the ledger sentinel (chaincode instantiation)
    pub fn init(&self, args: &[String]) -> Result<()> {
        info!(entry = EntryPoint::Init.as_str(), "init is running");
        self.execute(Invocation::parse("init", args)?).map(|_| ())
    }

    fn execute(&self, invocation: Invocation) -> Result<Payload> {
        match invocation {
            Invocation::Init { value } => self.state.init(&value).map(|_| None),
            Invocation::Write { key, value } => self.state.write(&key, &value).map(|_| None),
            Invocation::Read { key } => self.state.read(&key).map(Some),
            Invocation::CreateAccount { id } => self.registrar.create_account(&id).map(|_| None),
        }
    }
}
