use rusqlite::{Connection, Result as SqlResult};
use std::path::Path;
use std::time::Duration;

/// How long a write waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// SQLite connection with the schema applied on open.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P, schema: &str) -> SqlResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        log::debug!("Opened database {}", path.as_ref().display());
        Self::with_schema(conn, schema)
    }

    #[cfg(test)]
    pub fn in_memory(schema: &str) -> SqlResult<Self> {
        Self::with_schema(Connection::open_in_memory()?, schema)
    }

    fn with_schema(conn: Connection, schema: &str) -> SqlResult<Self> {
        // Every statement is CREATE ... IF NOT EXISTS, so reapplying is a no-op
        conn.execute_batch(schema)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
