//! Generic table mapper.
//!
//! # Responsibility
//! - Define the hooks (`TableMapping`) one table needs to be persisted.
//! - Provide CRUD operations for any mapping on top of a `ConnectionSource`.
//!
//! # Invariants
//! - `column_names` order is used for SELECT lists, INSERT lists and
//!   `serialize_object` output alike.
//! - `key_column_names` order matches `serialize_key` output.
//! - Every value, including key predicates of UPDATE, is a bound parameter.
//! - Filtered operations reject an empty condition list.

mod error;
mod generic;
mod validate;

pub use error::{MapperError, MapperResult};
pub use generic::GenericMapper;

use rusqlite::types::Value;
use rusqlite::Row;

/// Per-table hooks driving a `GenericMapper`.
pub trait TableMapping {
    type Entity;
    type Key;

    fn table_name(&self) -> &str;

    /// All persisted columns, in read and write order.
    fn column_names(&self) -> &[&str];

    /// Primary key columns, in `serialize_key` order.
    fn key_column_names(&self) -> &[&str];

    /// Column values of `object`, aligned with `column_names`.
    fn serialize_object(&self, object: &Self::Entity) -> Vec<Value>;

    /// Builds an entity from a row selected as `column_names`, read by index.
    fn build_object(&self, row: &Row<'_>) -> rusqlite::Result<Self::Entity>;

    /// Key values, aligned with `key_column_names`.
    fn serialize_key(&self, key: &Self::Key) -> Vec<Value>;

    fn get_key(&self, object: &Self::Entity) -> Self::Key;
}
