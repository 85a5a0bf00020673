//! Process-wide store handle.
//!
//! One SQLite connection opened at startup and reused for every workflow
//! call, behind a mutex. The database itself is the serialization point for
//! concurrent updates (last-write-wins at the record level); this layer adds
//! no client-side locking beyond handle exclusivity.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::db::{self, DatabaseError};

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the on-disk database and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = db::open_database(path)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = db::open_memory_database()?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Run a closure against the shared connection.
    ///
    /// Every workflow operation is a fresh read-modify-write through here;
    /// no state is held between calls.
    pub fn with<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let guard = self
            .conn
            .lock()
            .map_err(|_| DatabaseError::Unavailable("store lock poisoned".into()))?;
        f(&guard)
    }

    /// Tear down the handle, closing the underlying connection.
    pub fn close(self) -> Result<(), DatabaseError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| DatabaseError::Unavailable("store lock poisoned".into()))?;
        conn.close()
            .map_err(|(_, e)| DatabaseError::Sqlite(e))
    }
}
