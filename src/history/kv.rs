//! Key-value backends for history persistence.
//!
//! ## Backends
//!
//! - `MemoryKvStore`: in-process map; clones share contents. Reads and writes
//!   can be made to fail for testing.
//! - `FileKvStore`: one `<key>.json` file per key under a directory. Writes go
//!   to a temporary file first and are renamed into place.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::core::StoreError;

/// String-keyed, string-valued storage.
pub trait KeyValueStore {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`.
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: FxHashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory key-value store.
///
/// ```
/// use memory_match::history::{KeyValueStore, MemoryKvStore};
///
/// let mut store = MemoryKvStore::new();
/// let view = store.clone();
///
/// store.set("k", "v".to_string()).unwrap();
/// assert_eq!(view.get("k").unwrap().as_deref(), Some("v"));
///
/// view.fail_writes(true);
/// assert!(store.set("k", "w".to_string()).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryKvStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent reads fail.
    pub fn fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_reads = fail;
    }

    /// Make subsequent writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Raw value under `key`, bypassing failure injection.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().values.get(key).cloned()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.borrow();
        if inner.fail_reads {
            return Err(StoreError::unavailable("reads disabled"));
        }
        Ok(inner.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(StoreError::unavailable("writes disabled"));
        }
        inner.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Directory-backed key-value store.
#[derive(Clone, Debug)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Store files under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The backing directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::unavailable(format!("unusable key {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}
