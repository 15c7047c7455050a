//! Session history: records of won games and where they are kept.
//!
//! ## Key Types
//!
//! - `HistoryEntry`: One won session (deck size + timestamp)
//! - `HistoryStore`: The engine's persistence collaborator (`load`, `append`)
//! - `KvHistoryStore`: `HistoryStore` over any `KeyValueStore`, one JSON list per key
//! - `MemoryKvStore`, `FileKvStore`: Key-value backends

pub mod entry;
pub mod kv;
pub mod store;

pub use entry::HistoryEntry;
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use store::{HistoryStore, KvHistoryStore};
