//! Connection sources consumed by mappers.
//!
//! # Responsibility
//! - Define the `ConnectionSource` capability mappers borrow connections from.
//! - Provide file-backed and shared-connection implementations for SQLite.
//!
//! # Invariants
//! - A source is owned by the caller; mappers only borrow it.
//! - A checked-out handle releases its connection on drop, on every exit path.
//!
//! # See also
//! - `crate::mapper::GenericMapper`

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use rusqlite::Connection;

mod source;

pub use source::{FileConnectionSource, ScopedConnection, SharedConnectionSource};

pub type DbResult<T> = Result<T, DbError>;

/// Connectivity failures raised while acquiring or configuring a connection.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A thread panicked while holding the shared connection.
    SourcePoisoned,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SourcePoisoned => {
                write!(f, "shared connection is poisoned by a panicked holder")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SourcePoisoned => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Provider of database connections.
///
/// Implementations decide how checkout works (fresh connection per call,
/// shared connection behind a lock, an external pool). A handle gives access
/// to the connection for as long as it is alive and gives it back on drop.
pub trait ConnectionSource {
    type Handle<'a>: Deref<Target = Connection>
    where
        Self: 'a;

    /// Checks out one connection for a single statement.
    fn acquire(&self) -> DbResult<Self::Handle<'_>>;
}
