//! Account registrar - one-time account initialization
//!
//! The existence check is a read followed by a conditional write, not a
//! compare-and-swap. Two concurrent `createAccount` calls for the same id are
//! only safe because the ledger orders transactions touching the same key.

use std::sync::Arc;

use serde_json::error::Category;
use tracing::{debug, info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Account, RegistrarConfig};
use crate::ports::{StateStore, StoreError};

/// What was found under an account key
#[derive(Debug)]
enum Existing {
    Absent,
    Account(Account),
}

pub struct AccountRegistrar {
    store: Arc<dyn StateStore>,
    config: RegistrarConfig,
}

impl AccountRegistrar {
    pub fn new(store: Arc<dyn StateStore>, config: RegistrarConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RegistrarConfig {
        &self.config
    }

    /// Create the account for `id` unless one already exists
    pub fn create_account(&self, id: &str) -> Result<Account> {
        let account = Account::new(id, &self.config);
        let account_bytes = account.to_bytes().map_err(|e| {
            warn!(account = id, error = %e, "error creating account");
            Error::EncodingFailed(id.to_string())
        })?;

        let key = self.config.account_key(id);
        debug!(account = id, key = %key, "checking for an existing account");

        match self.lookup(id, &key)? {
            Existing::Account(existing) => {
                info!(account = id, existing = %existing.id, "account already exists");
                Err(Error::AlreadyExists(id.to_string()))
            }
            Existing::Absent => {
                self.store.put_state(&key, &account_bytes).map_err(|e| {
                    warn!(account = id, error = %e, "failed to initialize account");
                    Error::write_failed(id, e)
                })?;
                info!(account = id, key = %key, "created account");
                Ok(account)
            }
        }
    }

    /// Fetch and decode the stored account for `id`, if any
    pub fn get_account(&self, id: &str) -> Result<Option<Account>> {
        match self.lookup(id, &self.config.account_key(id))? {
            Existing::Account(account) => Ok(Some(account)),
            Existing::Absent => Ok(None),
        }
    }

    fn lookup(&self, id: &str, key: &str) -> Result<Existing> {
        let existing_bytes = match self.store.get_state(key) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(_)) => {
                debug!(account = id, "no existing account found");
                return Ok(Existing::Absent);
            }
            Err(e) => {
                warn!(account = id, error = %e, "state store read failed");
                return Err(Error::StoreUnavailable(e.to_string()));
            }
        };

        match Account::from_bytes(&existing_bytes) {
            Ok(account) => Ok(Existing::Account(account)),
            // Empty or cut-short records count as absent, as they always have
            Err(e) if e.classify() == Category::Eof => {
                debug!(
                    account = id,
                    len = existing_bytes.len(),
                    "stored record ends early, treating as absent"
                );
                Ok(Existing::Absent)
            }
            Err(e) => {
                warn!(account = id, error = %e, "error decoding existing account");
                Err(Error::CorruptExistingRecord(id.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStateStore;

    fn registrar(store: &Arc<MemoryStateStore>) -> AccountRegistrar {
        AccountRegistrar::new(store.clone(), RegistrarConfig::default())
    }

    #[test]
    fn test_create_on_empty_store() {
        let store = Arc::new(MemoryStateStore::new());
        let account = registrar(&store).create_account("bob").unwrap();

        assert_eq!(account.prefix, "bob000A");
        assert_eq!(
            store.get_state("acct:bob").unwrap(),
            br#"{"id":"bob","prefix":"bob000A","cashBalance":10000000,"assetIds":[]}"#.to_vec()
        );
    }

    #[test]
    fn test_second_create_is_rejected() {
        let store = Arc::new(MemoryStateStore::new());
        let registrar = registrar(&store);
        registrar.create_account("bob").unwrap();
        let before = store.snapshot();

        assert_eq!(
            registrar.create_account("bob"),
            Err(Error::AlreadyExists("bob".to_string()))
        );
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_empty_record_is_overwritten() {
        let store = Arc::new(MemoryStateStore::with_entries([("acct:bob", "")]));
        registrar(&store).create_account("bob").unwrap();

        let stored = Account::from_bytes(&store.get_state("acct:bob").unwrap()).unwrap();
        assert_eq!(stored.id, "bob");
    }

    #[test]
    fn test_truncated_record_is_overwritten() {
        let store = Arc::new(MemoryStateStore::with_entries([(
            "acct:bob",
            r#"{"id":"bob","prefix":"bo"#,
        )]));
        assert!(registrar(&store).create_account("bob").is_ok());
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let store = Arc::new(MemoryStateStore::with_entries([("acct:bob", "not json")]));
        assert_eq!(
            registrar(&store).create_account("bob"),
            Err(Error::CorruptExistingRecord("bob".to_string()))
        );
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let store = Arc::new(MemoryStateStore::with_entries([(
            "acct:bob",
            r#"{"id":"bob","cashBalance":"lots"}"#,
        )]));
        assert!(matches!(
            registrar(&store).create_account("bob"),
            Err(Error::CorruptExistingRecord(_))
        ));
    }

    #[test]
    fn test_array_record_is_corrupt() {
        for record in ["[]", r#"["x"]"#, r#"["mallory"]"#] {
            let store = Arc::new(MemoryStateStore::with_entries([("acct:bob", record)]));
            assert_eq!(
                registrar(&store).create_account("bob"),
                Err(Error::CorruptExistingRecord("bob".to_string()))
            );
            assert_eq!(store.write_count(), 0);
            assert_eq!(store.get_state("acct:bob").unwrap(), record.as_bytes().to_vec());
        }
    }

    #[test]
    fn test_null_record_counts_as_existing() {
        let store = Arc::new(MemoryStateStore::with_entries([("acct:bob", "null")]));
        assert_eq!(
            registrar(&store).create_account("bob"),
            Err(Error::AlreadyExists("bob".to_string()))
        );
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.get_state("acct:bob").unwrap(), b"null".to_vec());
    }

    #[test]
    fn test_read_failure_is_store_unavailable() {
        let store = Arc::new(MemoryStateStore::new());
        store.fail_reads(true);
        assert!(matches!(
            registrar(&store).create_account("bob"),
            Err(Error::StoreUnavailable(_))
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn test_write_failure_carries_id() {
        let store = Arc::new(MemoryStateStore::new());
        store.fail_writes(true);
        match registrar(&store).create_account("bob") {
            Err(Error::StoreWriteFailed { target, cause }) => {
                assert_eq!(target, "bob");
                assert!(cause.contains("rejected"));
            }
            other => panic!("expected write failure, got {:?}", other),
        }
    }

    #[test]
    fn test_configured_namespace() {
        let store = Arc::new(MemoryStateStore::new());
        let config = RegistrarConfig {
            account_prefix: "user:".to_string(),
            ..RegistrarConfig::default()
        };
        AccountRegistrar::new(store.clone(), config)
            .create_account("alice")
            .unwrap();

        assert!(store.get_state("user:alice").is_ok());
        assert!(store.get_state("acct:alice").is_err());
    }

    #[test]
    fn test_get_account() {
        let store = Arc::new(MemoryStateStore::new());
        let registrar = registrar(&store);
        assert_eq!(registrar.get_account("alice").unwrap(), None);

        registrar.create_account("alice").unwrap();
        let account = registrar.get_account("alice").unwrap().unwrap();
        assert_eq!(account.cash_balance, 10_000_000.0);
        assert!(account.asset_ids.is_empty());
    }
}
