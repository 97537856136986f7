//! Database connection management with pragma configuration.
//!
//! This module handles opening the SQLite database, applying required pragmas
//! for performance and concurrency (WAL mode), and creating the schema.
//!
//! The schema version lives in `PRAGMA user_version`. A database written by
//! a newer build is refused rather than read with the wrong layout.

use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

const PRAGMAS: &str = "PRAGMA journal_mode=WAL;
     PRAGMA synchronous=NORMAL;
     PRAGMA temp_store=MEMORY;";

/// Schema version written by this build.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = include_str!("../../sql/local_storage.sql");

/// Page storage handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    pub(crate) conn: Connection,
}

impl LocalStorage {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies performance pragmas,
    /// and creates the `local_storage` table.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedSchema` if the file was written by a newer
    /// schema version.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(PRAGMAS)?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        conn.call(|conn| -> Result<(), Error> {
            let found: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
            if found > SCHEMA_VERSION {
                return Err(Error::UnsupportedSchema { found, supported: SCHEMA_VERSION });
            }
            if found < SCHEMA_VERSION {
                tracing::debug!(from = found, to = SCHEMA_VERSION, "creating storage schema");
                conn.execute_batch(SCHEMA)?;
                conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            }
            Ok(())
        })
        .await
        .map_err(Error::from)?;

        Ok(Self { conn })
    }
}
