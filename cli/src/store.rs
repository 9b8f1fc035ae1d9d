use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memora_core::{KeyValueStore, MemoryStore};

/// Key-value store kept in a JSON file, written whole on [`JsonFileStore::flush`].
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    store: MemoryStore,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = if path.exists() {
            let json = fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            MemoryStore::from_json_str(&json)
                .with_context(|| format!("{} is not a save file", path.display()))?
        } else {
            log::debug!("{} does not exist yet, starting empty", path.display());
            MemoryStore::new()
        };
        Ok(Self { path, store })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling temp file first so the save is replaced atomically.
    pub fn flush(&self) -> Result<()> {
        let json = self.store.to_json_string()?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        log::trace!("Flushed {} keys to {}", self.store.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.store.get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.store.set_int(key, value)
    }

    fn remove(&mut self, key: &str) {
        self.store.remove(key)
    }
}
