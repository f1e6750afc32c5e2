pub mod database;
pub mod message_db;
pub mod seed;

pub use message_db::MessageDatabase;

use rusqlite::Result as SqlResult;
use std::fs;
use std::path::Path;

use crate::common::ChatMessage;

/// Ordered chat log the UI reads and appends to.
///
/// Callers pull the full log and window it in memory.
pub trait MessageStore {
    /// Every message, oldest first by `created_at_millis`.
    fn all_messages(&self) -> SqlResult<Vec<ChatMessage>>;

    /// Insert a message. Returns `false` when the id already exists.
    fn append(&self, message: &ChatMessage) -> SqlResult<bool>;

    fn is_empty(&self) -> SqlResult<bool>;
}

/// Ensure data directory exists
pub fn ensure_data_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}
