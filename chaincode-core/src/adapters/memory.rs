//! In-memory state store
//!
//! Keeps world state in a `BTreeMap`. Reads and writes can be made to fail on
//! demand so callers can exercise store outages without a real backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::ports::{StateStore, StoreError, StoreResult};

#[derive(Default)]
pub struct MemoryStateStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing entries
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let store = Self::new();
        if let Ok(mut map) = store.entries.lock() {
            map.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        }
        store
    }

    /// Make every subsequent read fail with `Unavailable`
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail with `Unavailable`
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `put_state` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.entries
            .lock()
            .map(|map| map.clone())
            .unwrap_or_default()
    }
}

impl StateStore for MemoryStateStore {
    fn get_state(&self, key: &str) -> StoreResult<Vec<u8>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("state store is offline"));
        }
        let map = self
            .entries
            .lock()
            .map_err(|e| StoreError::unavailable(format!("Lock poisoned: {}", e)))?;
        map.get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("state store rejected the write"));
        }
        let mut map = self
            .entries
            .lock()
            .map_err(|e| StoreError::unavailable(format!("Lock poisoned: {}", e)))?;
        map.insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
