use crate::StoreRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialize failed: {0}")]
    Serialize(String),
    #[error("write failed: {0}")]
    Write(String),
}

/// Durable storage collaborator for the session. `load` never fails: a
/// missing or unreadable record degrades to the empty default so a fresh
/// night can always start.
pub trait StateStore {
    fn load(&mut self) -> StoreRecord;
    fn save(&mut self, record: &StoreRecord) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: StoreRecord,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: StoreRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &StoreRecord {
        &self.record
    }
}

impl StateStore for MemoryStore {
    fn load(&mut self) -> StoreRecord {
        self.record.clone()
    }

    fn save(&mut self, record: &StoreRecord) -> Result<(), StoreError> {
        self.record = record.clone();
        Ok(())
    }
}
