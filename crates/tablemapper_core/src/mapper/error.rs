use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MapperResult<T> = Result<T, MapperError>;

/// Failure of one mapper operation.
#[derive(Debug)]
pub enum MapperError {
    /// A connection could not be acquired or configured.
    Db(DbError),
    /// SQLite rejected or failed the statement (syntax, constraint, bind).
    Statement {
        table: String,
        source: rusqlite::Error,
    },
    /// A result row could not be turned into an entity.
    Mapping {
        table: String,
        source: rusqlite::Error,
    },
    /// A serialized object or key does not line up with its column list.
    ArityMismatch {
        table: String,
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A filtered operation was called without any condition.
    EmptyConditions { table: String },
    /// Mapping metadata is unusable (empty, duplicated or unknown columns).
    InvalidMapping(String),
    /// A condition names a column that is not a plain SQL identifier.
    InvalidIdentifier(String),
    /// Required table is missing from the connected database.
    MissingRequiredTable(String),
    /// Required column is missing from the mapped table.
    MissingRequiredColumn { table: String, column: String },
}

impl Display for MapperError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Statement { table, source } => {
                write!(f, "statement on `{table}` failed: {source}")
            }
            Self::Mapping { table, source } => {
                write!(f, "cannot build `{table}` object from row: {source}")
            }
            Self::ArityMismatch {
                table,
                what,
                expected,
                actual,
            } => write!(
                f,
                "{what} for `{table}` has {actual} values, expected {expected}"
            ),
            Self::EmptyConditions { table } => write!(
                f,
                "filtered operation on `{table}` requires at least one condition"
            ),
            Self::InvalidMapping(message) => write!(f, "invalid mapping: {message}"),
            Self::InvalidIdentifier(name) => {
                write!(f, "`{name}` is not a valid column identifier")
            }
            Self::MissingRequiredTable(table) => {
                write!(f, "mapper requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "mapper requires column `{column}` in table `{table}`")
            }
        }
    }
}

impl Error for MapperError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Statement { source, .. } => Some(source),
            Self::Mapping { source, .. } => Some(source),
            Self::ArityMismatch { .. } => None,
            Self::EmptyConditions { .. } => None,
            Self::InvalidMapping(_) => None,
            Self::InvalidIdentifier(_) => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for MapperError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl MapperError {
    /// Short stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) => "db_unavailable",
            Self::Statement { .. } => "statement_failed",
            Self::Mapping { .. } => "row_mapping_failed",
            Self::ArityMismatch { .. } => "arity_mismatch",
            Self::EmptyConditions { .. } => "empty_conditions",
            Self::InvalidMapping(_) => "invalid_mapping",
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}
