//! Database connection management.
//!
//! sieve never owns a schema, so connections are opened as-is with no
//! migrations; the caller's database is queried in place.

use std::path::Path;

use diesel::{sql_query, Connection, RunQueryDsl, SqliteConnection};
use tracing::debug;

use crate::error::{DbError, Result};

/// SQLite connection wrapper.
pub struct DbConnection {
    conn: SqliteConnection,
}

impl DbConnection {
    /// Opens a database file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DbError::ConnectionError(format!(
                "{} is not a database file",
                path.display()
            )));
        }

        let path_str = path.to_string_lossy();
        let mut conn = SqliteConnection::establish(&path_str)?;

        // WAL mode for better concurrent access
        sql_query("PRAGMA journal_mode = WAL;")
            .execute(&mut conn)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;

        debug!("opened database at {}", path.display());
        Ok(Self { conn })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = SqliteConnection::establish(":memory:")?;
        Ok(Self { conn })
    }

    /// Gets a mutable reference to the underlying connection.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = DbConnection::open(dir.path().join("missing.db"));
        assert!(matches!(result, Err(DbError::ConnectionError(_))));
    }

    #[test]
    fn test_open_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.db");

        {
            let mut conn = SqliteConnection::establish(&path.to_string_lossy()).unwrap();
            sql_query("CREATE TABLE t (id INTEGER PRIMARY KEY)")
                .execute(&mut conn)
                .unwrap();
        }

        let mut db = DbConnection::open(&path).unwrap();
        sql_query("INSERT INTO t (id) VALUES (1)")
            .execute(db.conn())
            .unwrap();
    }
}
