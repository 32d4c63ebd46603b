//! Persistence backends.
//!
//! A backend stores opaque text under a key. The store serializes its whole
//! state into one blob and rewrites it on every mutation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::error::{DatebookError, DatebookResult};

pub trait StorageBackend {
    /// Read the blob stored under `key`, or `None` if nothing was written yet.
    fn read(&self, key: &str) -> DatebookResult<Option<String>>;

    fn write(&self, key: &str, contents: &str) -> DatebookResult<()>;
}

/// Stores each key as `<key>.json` inside a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileBackend { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> DatebookResult<Option<String>> {
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, contents: &str) -> DatebookResult<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let temp = self.dir.join(format!("{}.json.tmp", key));

        std::fs::write(&temp, contents).map_err(|e| {
            DatebookError::Persistence(format!("Could not write {}: {}", temp.display(), e))
        })?;
        std::fs::rename(&temp, &path).map_err(|e| {
            DatebookError::Persistence(format!("Could not replace {}: {}", path.display(), e))
        })?;

        Ok(())
    }
}

/// In-process backend. Clones share the same storage, so a second store can
/// be opened over what the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Seed a key directly, bypassing any store.
    pub fn insert(&self, key: &str, contents: impl Into<String>) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), contents.into());
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> DatebookResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, contents: &str) -> DatebookResult<()> {
        self.insert(key, contents);
        Ok(())
    }
}
