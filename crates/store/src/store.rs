use finebook_core::{StateStore, StoreError, StoreRecord};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Single-file JSON store. Saves go through a temp file, fsync, and
/// rename, so a crash mid-write never truncates the night's ledger.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> StoreRecord {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!("could not read {}: {err}", self.path.display());
                }
                return StoreRecord::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(err) => {
                log::warn!(
                    "discarding unreadable record at {}: {err}",
                    self.path.display()
                );
                StoreRecord::default()
            }
        }
    }

    fn write_record(&self, record: &StoreRecord) -> Result<(), StoreError> {
        let write_err = |err: std::io::Error| StoreError::Write(err.to_string());
        let body = serde_json::to_string_pretty(record)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let temp_path = self.path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path).map_err(write_err)?;
            file.write_all(body.as_bytes()).map_err(write_err)?;
            file.flush().map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }
        fs::rename(&temp_path, &self.path).map_err(write_err)
    }
}

impl StateStore for JsonFileStore {
    fn load(&mut self) -> StoreRecord {
        self.read_record()
    }

    fn save(&mut self, record: &StoreRecord) -> Result<(), StoreError> {
        self.write_record(record)
    }
}

/// `FINEBOOK_SAVE` overrides the location; otherwise the record lives in
/// the home directory. `None` when neither is available.
pub fn default_store_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("FINEBOOK_SAVE") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".finebook_state.json"))
}
