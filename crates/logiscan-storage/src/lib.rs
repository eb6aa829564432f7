//! logiscan-storage: storage backends for Logiscan.
//!
//! Backends:
//! - [`memory`]: in-memory (dev/testing, no persistence, feature `memory`, on by default)
//! - [`sqlite`]: SQLite via `sqlx` (single-file persistence, feature `sqlite`)

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "memory")]
pub use memory::MemoryStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;
