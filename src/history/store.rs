//! The history store collaborator.

use super::entry::HistoryEntry;
use super::kv::KeyValueStore;
use crate::core::StoreError;

/// Persistent, append-only list of won sessions.
///
/// The engine calls `load` once at startup and `append` once per win. Failures
/// are reported back but never stop play.
pub trait HistoryStore {
    /// Read the full history, oldest first.
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Persist one more entry after the existing ones.
    fn append(&mut self, entry: &HistoryEntry) -> Result<(), StoreError>;
}

impl<H: HistoryStore + ?Sized> HistoryStore for Box<H> {
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError> {
        (**self).load()
    }

    fn append(&mut self, entry: &HistoryEntry) -> Result<(), StoreError> {
        (**self).append(entry)
    }
}

/// History kept as one JSON array under a single key.
///
/// Every append re-serializes and rewrites the whole list; there are no
/// partial updates. An entry whose write failed stays in the cached list, so
/// the next successful write carries it too.
///
/// ```
/// use memory_match::history::{HistoryEntry, HistoryStore, KvHistoryStore, MemoryKvStore};
///
/// let kv = MemoryKvStore::new();
/// let mut store = KvHistoryStore::new(kv.clone(), "gameHistory");
///
/// assert!(store.load().unwrap().is_empty());
/// store.append(&HistoryEntry::new(4, "2025-01-01 10:00:00")).unwrap();
///
/// assert_eq!(
///     kv.raw("gameHistory").unwrap(),
///     r#"[{"pairCountMode":4,"date":"2025-01-01 10:00:00"}]"#
/// );
/// ```
#[derive(Debug)]
pub struct KvHistoryStore<K> {
    kv: K,
    key: String,
    entries: Option<Vec<HistoryEntry>>,
}

impl<K: KeyValueStore> KvHistoryStore<K> {
    /// Store history under `key` in `kv`.
    pub fn new(kv: K, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
            entries: None,
        }
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The backing key-value store.
    #[must_use]
    pub fn kv(&self) -> &K {
        &self.kv
    }

    fn read(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match self.kv.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }
}

impl<K: KeyValueStore> HistoryStore for KvHistoryStore<K> {
    fn load(&mut self) -> Result<Vec<HistoryEntry>, StoreError> {
        let entries = self.read()?;
        self.entries = Some(entries.clone());
        Ok(entries)
    }

    fn append(&mut self, entry: &HistoryEntry) -> Result<(), StoreError> {
        // Never overwrite a list we could not read.
        let entries = match self.entries.take() {
            Some(entries) => entries,
            None => self.read()?,
        };
        let entries = self.entries.insert(entries);
        entries.push(entry.clone());

        let raw = serde_json::to_string(entries)?;
        self.kv.set(&self.key, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryKvStore;

    fn entry(mode: usize) -> HistoryEntry {
        HistoryEntry::new(mode, format!("2025-01-01 10:00:{mode:02}"))
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let mut store = KvHistoryStore::new(MemoryKvStore::new(), "gameHistory");
        assert_eq!(store.load().unwrap(), Vec::new());
    }

    #[test]
    fn test_append_rewrites_full_list() {
        let kv = MemoryKvStore::new();
        let mut store = KvHistoryStore::new(kv.clone(), "gameHistory");
        store.load().unwrap();

        store.append(&entry(4)).unwrap();
        store.append(&entry(16)).unwrap();

        let stored: Vec<HistoryEntry> =
            serde_json::from_str(&kv.raw("gameHistory").unwrap()).unwrap();
        assert_eq!(stored, vec![entry(4), entry(16)]);

        let mut reopened = KvHistoryStore::new(kv, "gameHistory");
        assert_eq!(reopened.load().unwrap(), vec![entry(4), entry(16)]);
    }

    #[test]
    fn test_append_without_load_keeps_existing() {
        let mut kv = MemoryKvStore::new();
        kv.set("h", r#"[{"gameMode":4,"date":"old"}]"#.to_string()).unwrap();

        let mut store = KvHistoryStore::new(kv.clone(), "h");
        store.append(&entry(32)).unwrap();

        let mut reopened = KvHistoryStore::new(kv, "h");
        assert_eq!(
            reopened.load().unwrap(),
            vec![HistoryEntry::new(4, "old"), entry(32)]
        );
    }

    #[test]
    fn test_failed_write_is_carried_forward() {
        let kv = MemoryKvStore::new();
        let mut store = KvHistoryStore::new(kv.clone(), "gameHistory");
        store.load().unwrap();

        kv.fail_writes(true);
        assert!(store.append(&entry(4)).is_err());
        assert_eq!(kv.raw("gameHistory"), None);

        kv.fail_writes(false);
        store.append(&entry(16)).unwrap();

        let mut reopened = KvHistoryStore::new(kv, "gameHistory");
        assert_eq!(reopened.load().unwrap(), vec![entry(4), entry(16)]);
    }

    #[test]
    fn test_corrupt_history_is_not_overwritten() {
        let mut kv = MemoryKvStore::new();
        kv.set("gameHistory", "{not json".to_string()).unwrap();

        let mut store = KvHistoryStore::new(kv.clone(), "gameHistory");
        assert!(matches!(store.load(), Err(StoreError::Serialization(_))));
        assert!(store.append(&entry(4)).is_err());
        assert_eq!(kv.raw("gameHistory").as_deref(), Some("{not json"));
    }
}
