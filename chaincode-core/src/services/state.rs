//! State service - generic key/value passthrough and ledger init

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::result::{Error, Result};
use crate::ports::StateStore;

/// Reserved key holding the value written at ledger initialization
pub const DEFAULT_SENTINEL_KEY: &str = "hello_world";

pub struct StateService {
    store: Arc<dyn StateStore>,
    sentinel_key: String,
}

impl StateService {
    pub fn new(store: Arc<dyn StateStore>, sentinel_key: impl Into<String>) -> Self {
        Self {
            store,
            sentinel_key: sentinel_key.into(),
        }
    }

    pub fn sentinel_key(&self) -> &str {
        &self.sentinel_key
    }

    /// Reset the sentinel value
    pub fn init(&self, value: &str) -> Result<()> {
        self.write(&self.sentinel_key, value)
    }

    /// Store `value` under `key` unconditionally
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        debug!(key, len = value.len(), "running write");
        self.store.put_state(key, value.as_bytes()).map_err(|e| {
            warn!(key, error = %e, "write failed");
            Error::write_failed(key, e)
        })
    }

    /// Raw bytes stored under `key`; a missing key is an error here
    pub fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.store.get_state(key).map_err(|e| {
            debug!(key, error = %e, "read failed");
            Error::KeyReadFailed(key.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStateStore;

    fn service(store: &Arc<MemoryStateStore>) -> StateService {
        StateService::new(store.clone(), DEFAULT_SENTINEL_KEY)
    }

    #[test]
    fn test_init_writes_sentinel() {
        let store = Arc::new(MemoryStateStore::new());
        service(&store).init("hi").unwrap();
        assert_eq!(store.get_state("hello_world").unwrap(), b"hi".to_vec());
    }

    #[test]
    fn test_write_then_read() {
        let store = Arc::new(MemoryStateStore::new());
        let service = service(&store);
        service.write("color", "blue").unwrap();
        assert_eq!(service.read("color").unwrap(), b"blue".to_vec());
    }

    #[test]
    fn test_read_missing_key() {
        let store = Arc::new(MemoryStateStore::new());
        assert_eq!(
            service(&store).read("missing"),
            Err(Error::KeyReadFailed("missing".to_string()))
        );
    }

    #[test]
    fn test_read_outage() {
        let store = Arc::new(MemoryStateStore::with_entries([("k", "v")]));
        store.fail_reads(true);
        assert_eq!(
            service(&store).read("k"),
            Err(Error::KeyReadFailed("k".to_string()))
        );
    }

    #[test]
    fn test_write_outage() {
        let store = Arc::new(MemoryStateStore::new());
        store.fail_writes(true);
        assert!(matches!(
            service(&store).write("k", "v"),
            Err(Error::StoreWriteFailed { .. })
        ));
    }
}
