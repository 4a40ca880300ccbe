//! Status service - world-state summaries for the local peer

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::adapters::duckdb::DuckDbStateStore;
use crate::domain::{Account, RegistrarConfig};
use crate::ports::StateStore;

pub struct StatusService {
    store: Arc<DuckDbStateStore>,
    config: RegistrarConfig,
    sentinel_key: String,
}

impl StatusService {
    pub fn new(
        store: Arc<DuckDbStateStore>,
        config: RegistrarConfig,
        sentinel_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            config,
            sentinel_key: sentinel_key.into(),
        }
    }

    /// Summarize world state: key count, sentinel and every account record
    pub fn get_status(&self) -> Result<StatusSummary> {
        let total_keys = self.store.key_count()?;
        let sentinel = self
            .store
            .get_state(&self.sentinel_key)
            .ok()
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());

        let mut accounts = Vec::new();
        let mut unreadable_accounts = 0;
        for (key, bytes) in self.store.entries_with_prefix(&self.config.account_prefix)? {
            match Account::from_bytes(&bytes) {
                Ok(account) => accounts.push(AccountSummary {
                    key,
                    id: account.id,
                    prefix: account.prefix,
                    cash_balance: account.cash_balance,
                    asset_count: account.asset_ids.len(),
                }),
                Err(_) => unreadable_accounts += 1,
            }
        }

        Ok(StatusSummary {
            total_keys,
            sentinel_key: self.sentinel_key.clone(),
            sentinel,
            total_accounts: accounts.len(),
            unreadable_accounts,
            accounts,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_keys: i64,
    pub sentinel_key: String,
    pub sentinel: Option<String>,
    pub total_accounts: usize,
    /// Records under the account namespace that do not decode
    pub unreadable_accounts: usize,
    pub accounts: Vec<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub key: String,
    pub id: String,
    pub prefix: String,
    pub cash_balance: f64,
    pub asset_count: usize,
}
