//! SQLite-backed document records and the upload-then-record bridge.

pub mod bridge;
pub mod error;
pub mod sqlite;

pub use bridge::PersistenceBridge;
pub use error::StoreError;
pub use sqlite::{FileRecord, SqliteStore};
