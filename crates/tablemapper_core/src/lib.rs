//! Generic table mapper over SQLite.
//! Gives any entity type CRUD operations from a handful of per-table hooks.

pub mod config;
pub mod db;
pub mod logging;
pub mod mapper;
pub mod query;

pub use config::SourceConfig;
pub use db::{
    ConnectionSource, DbError, DbResult, FileConnectionSource, ScopedConnection,
    SharedConnectionSource,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use mapper::{GenericMapper, MapperError, MapperResult, TableMapping};
pub use query::{Operator, QueryCondition, Statement};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
