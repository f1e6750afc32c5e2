use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Result as SqlResult, Row, params};
use std::path::Path;

use super::MessageStore;
use super::database::Database;
use crate::common::{ChatMessage, MessageKind, MessageSender};

/// SQLite-backed chat log.
pub struct MessageDatabase {
    db: Database,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        body TEXT NOT NULL,
        kind TEXT NOT NULL,
        attachment_path TEXT,
        attachment_size_bytes INTEGER,
        thumbnail_path TEXT,
        sender TEXT NOT NULL,
        created_at_millis INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at_millis);
";

impl MessageDatabase {
    /// Open (or create) the message database at `path`
    pub fn with_path<P: AsRef<Path>>(path: P) -> SqlResult<Self> {
        Ok(Self {
            db: Database::open(path, SCHEMA)?,
        })
    }

    #[cfg(test)]
    pub fn in_memory() -> SqlResult<Self> {
        Ok(Self {
            db: Database::in_memory(SCHEMA)?,
        })
    }

    /// Get message count
    pub fn message_count(&self) -> SqlResult<usize> {
        let conn = self.db.connection();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn message_from_row(row: &Row<'_>) -> SqlResult<ChatMessage> {
        Ok(ChatMessage {
            id: row.get(0)?,
            body: row.get(1)?,
            kind: row.get(2)?,
            attachment_path: row.get(3)?,
            attachment_size_bytes: row.get::<_, Option<i64>>(4)?.map(|size| size as u64),
            thumbnail_path: row.get(5)?,
            sender: row.get(6)?,
            created_at_millis: row.get(7)?,
        })
    }
}

impl MessageStore for MessageDatabase {
    fn all_messages(&self) -> SqlResult<Vec<ChatMessage>> {
        let conn = self.db.connection();
        // rowid keeps insertion order among equal timestamps
        let mut stmt = conn.prepare(
            "SELECT id, body, kind, attachment_path, attachment_size_bytes,
                    thumbnail_path, sender, created_at_millis
             FROM messages
             ORDER BY created_at_millis ASC, rowid ASC",
        )?;

        let messages = stmt
            .query_map([], Self::message_from_row)?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(messages)
    }

    fn append(&self, message: &ChatMessage) -> SqlResult<bool> {
        let conn = self.db.connection();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO messages (
                id, body, kind, attachment_path, attachment_size_bytes,
                thumbnail_path, sender, created_at_millis
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                message.id,
                message.body,
                message.kind,
                message.attachment_path,
                message.attachment_size_bytes.map(|size| size as i64),
                message.thumbnail_path,
                message.sender,
                message.created_at_millis
            ],
        )?;

        if inserted == 0 {
            log::warn!("Message {} already stored; ignoring duplicate", message.id);
        }
        Ok(inserted > 0)
    }

    fn is_empty(&self) -> SqlResult<bool> {
        Ok(self.message_count()? == 0)
    }
}

impl ToSql for MessageKind {
    fn to_sql(&self) -> SqlResult<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MessageKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        MessageKind::from_tag(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for MessageSender {
    fn to_sql(&self) -> SqlResult<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MessageSender {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        MessageSender::from_tag(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}
