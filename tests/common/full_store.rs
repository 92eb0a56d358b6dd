use edit_anchor::store::{KvStore, MemoryStore, StoreError};
use serde_json::Value;

/// Reads like a normal store; every write fails as if storage were full.
#[derive(Debug, Default)]
pub struct FullStore {
    pub inner: MemoryStore,
    pub failed_writes: usize,
}

impl FullStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn refuse(&mut self) -> StoreError {
        self.failed_writes += 1;
        StoreError::Io {
            path: "edits.json".into(),
            source: std::io::Error::other("storage quota exceeded"),
        }
    }
}

impl KvStore for FullStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, _key: &str, _value: Value) -> Result<(), StoreError> {
        Err(self.refuse())
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Err(self.refuse())
    }
}
