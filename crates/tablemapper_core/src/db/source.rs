//! SQLite connection source implementations.
//!
//! # Responsibility
//! - Open and configure SQLite connections on checkout.
//! - Release connections on drop without masking the caller's result.
//!
//! # Invariants
//! - File-backed handles own their connection and close it on drop.
//! - Close failures are logged, never propagated or silently dropped.
//! - Shared handles hold the lock for exactly one checkout.

use super::{ConnectionSource, DbError, DbResult};
use crate::config::SourceConfig;
use log::{debug, error, warn};
use rusqlite::{Connection, OpenFlags};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

/// Opens a fresh connection for every checkout.
///
/// Safe for concurrent checkout from many threads; SQLite's own locking and
/// the configured busy timeout arbitrate writers.
#[derive(Debug, Clone)]
pub struct FileConnectionSource {
    config: SourceConfig,
}

impl FileConnectionSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn open_flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        if self.config.read_only {
            base | OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        }
    }
}

impl ConnectionSource for FileConnectionSource {
    type Handle<'a>
        = ScopedConnection
    where
        Self: 'a;

    fn acquire(&self) -> DbResult<ScopedConnection> {
        let started_at = Instant::now();
        let conn = match Connection::open_with_flags(&self.config.path, self.open_flags()) {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=source_acquire module=db status=error mode=file duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        };

        if let Err(err) = configure_connection(&conn, &self.config) {
            error!(
                "event=source_acquire module=db status=error mode=file duration_ms={} error_code=db_configure_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }

        debug!(
            "event=source_acquire module=db status=ok mode=file duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(ScopedConnection { conn: Some(conn) })
    }
}

fn configure_connection(conn: &Connection, config: &SourceConfig) -> DbResult<()> {
    if config.foreign_keys {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    }
    conn.busy_timeout(config.busy_timeout())?;
    Ok(())
}

/// Connection owned by one checkout of a `FileConnectionSource`.
#[derive(Debug)]
pub struct ScopedConnection {
    conn: Option<Connection>,
}

impl Deref for ScopedConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only `Drop` takes the connection out.
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("scoped connection used after release"))
    }
}

impl Drop for ScopedConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_conn, err)) = conn.close() {
                warn!(
                    "event=source_release module=db status=error mode=file error_code=db_close_failed error={}",
                    err
                );
            }
        }
    }
}

/// One connection shared by every checkout, serialized by a mutex.
///
/// Meant for in-memory databases, where each new connection would see an
/// empty database.
#[derive(Debug)]
pub struct SharedConnectionSource {
    conn: Mutex<Connection>,
}

impl SharedConnectionSource {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens a private in-memory database with foreign keys enforced.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self::new(conn))
    }
}

impl ConnectionSource for SharedConnectionSource {
    type Handle<'a>
        = MutexGuard<'a, Connection>
    where
        Self: 'a;

    fn acquire(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=source_acquire module=db status=error mode=shared error_code=source_poisoned");
            DbError::SourcePoisoned
        })
    }
}
