// foodcart/src/session/file_store.rs

//! JSON-file backed key-value store.
//!
//! The whole map lives in one small JSON object. Every write rewrites the file
//! through a sibling temp file and a rename, so readers see either the old or
//! the new map, never a torn one.

use super::kv::KeyValueStore;
use crate::error::StorageError;
use anyhow::Context;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct FileStore {
  path: PathBuf,
  // Serializes read-modify-write cycles within this process.
  write_lock: Mutex<()>,
}

impl FileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      write_lock: Mutex::new(()),
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(BTreeMap::new()),
      Err(e) => {
        return Err(StorageError::Backend(
          anyhow::Error::new(e).context(format!("reading session file {}", self.path.display())),
        ))
      }
    };
    if raw.trim().is_empty() {
      return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&raw)?)
  }

  fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).with_context(|| format!("creating session directory {}", parent.display()))?;
    }
    let body = serde_json::to_vec_pretty(entries)?;
    let tmp = self.path.with_extension("tmp");
    fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, &self.path)
      .with_context(|| format!("replacing session file {}", self.path.display()))?;
    Ok(())
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
    Ok(self.load()?.remove(key))
  }

  #[instrument(name = "FileStore::set", skip(self, value), fields(path = %self.path.display()))]
  fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
    let _guard = self.write_lock.lock();
    let mut entries = self.load()?;
    entries.insert(key.to_string(), value.to_string());
    self.persist(&entries)?;
    debug!("Key written.");
    Ok(())
  }

  #[instrument(name = "FileStore::remove", skip(self), fields(path = %self.path.display()))]
  fn remove(&self, key: &str) -> Result<(), StorageError> {
    let _guard = self.write_lock.lock();
    let mut entries = self.load()?;
    if entries.remove(key).is_none() {
      return Ok(());
    }
    self.persist(&entries)?;
    debug!("Key removed.");
    Ok(())
  }
}
