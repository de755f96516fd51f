//! Durable string-keyed slots and the task snapshot kept in one of them.

use crate::error::AppError;
use std::collections::HashMap;

pub mod file_store;
pub mod json_slot;

pub use file_store::FileStore;

/// A durable key-value store holding string values, one per named slot.
pub trait SlotStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replaces whatever the slot held before.
    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

/// Process-local store. Can be told to refuse writes, the way a full browser
/// quota would.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    write_failure: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }

    pub fn fail_writes<M: Into<String>>(&mut self, message: M) {
        self.write_failure = Some(message.into());
    }

    pub fn allow_writes(&mut self) {
        self.write_failure = None;
    }
}

impl SlotStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        if let Some(message) = self.write_failure.as_deref() {
            return Err(AppError::io(message));
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
