//! Durable key-value slot storage
//!
//! The search history persists itself into a single named slot. The
//! trait-based design allows swapping between in-memory, SQLite and
//! plain-file backends.

mod file;
mod memory;
mod sqlite;
mod traits;

pub use file::FileKvStore;
pub use memory::InMemoryKvStore;
pub use sqlite::SqliteKvStore;
pub use traits::KvStore;
