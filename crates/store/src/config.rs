use anyhow::Context;
use finebook_core::FinesConfig;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Loads a fines schedule from a JSON file. Callers that want the built-in
/// schedule use `FinesConfig::default()` instead of passing a path.
pub fn load_fines_config(path: &Path) -> anyhow::Result<FinesConfig> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}
