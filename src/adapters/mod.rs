// Adapters layer: concrete implementations of the domain ports (file system,
// SQLite, Firebase, in-memory doubles).

pub mod firebase;
pub mod local_storage;
pub mod memory;
pub mod sqlite_store;

pub use local_storage::LocalStorage;
pub use memory::{MemoryDirectory, MemoryPushGateway, MemoryRecordStore};
pub use sqlite_store::SqliteRecordStore;
