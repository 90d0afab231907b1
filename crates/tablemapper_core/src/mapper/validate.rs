//! Mapping metadata and schema readiness checks.

use super::error::{MapperError, MapperResult};
use super::TableMapping;
use crate::query::QueryCondition;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::Connection;
use std::collections::HashSet;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

pub(crate) fn is_identifier(name: &str) -> bool {
    IDENTIFIER_RE.is_match(name)
}

/// Rejects metadata that could only produce malformed SQL.
pub(crate) fn validate_mapping<M: TableMapping>(mapping: &M) -> MapperResult<()> {
    let table = mapping.table_name();
    if !is_identifier(table) {
        return Err(MapperError::InvalidMapping(format!(
            "table name `{table}` is not a plain identifier"
        )));
    }

    let columns = mapping.column_names();
    if columns.is_empty() {
        return Err(MapperError::InvalidMapping(format!(
            "`{table}` maps no columns"
        )));
    }

    let mut seen = HashSet::new();
    for column in columns {
        if !is_identifier(column) {
            return Err(MapperError::InvalidMapping(format!(
                "column `{column}` of `{table}` is not a plain identifier"
            )));
        }
        if !seen.insert(*column) {
            return Err(MapperError::InvalidMapping(format!(
                "column `{column}` of `{table}` is mapped twice"
            )));
        }
    }

    let key_columns = mapping.key_column_names();
    if key_columns.is_empty() {
        return Err(MapperError::InvalidMapping(format!(
            "`{table}` declares no key columns"
        )));
    }
    for key in key_columns {
        if !seen.contains(key) {
            return Err(MapperError::InvalidMapping(format!(
                "key column `{key}` is not a mapped column of `{table}`"
            )));
        }
    }

    Ok(())
}

pub(crate) fn validate_conditions(conditions: &[QueryCondition]) -> MapperResult<()> {
    for condition in conditions {
        if !is_identifier(condition.column_name()) {
            return Err(MapperError::InvalidIdentifier(
                condition.column_name().to_string(),
            ));
        }
    }
    Ok(())
}

/// Verifies the mapped table and all mapped columns exist.
pub(crate) fn ensure_table_ready<M: TableMapping>(
    conn: &Connection,
    mapping: &M,
) -> MapperResult<()> {
    let table = mapping.table_name();
    let present = table_columns(conn, table).map_err(|source| MapperError::Statement {
        table: table.to_string(),
        source,
    })?;

    if present.is_empty() {
        return Err(MapperError::MissingRequiredTable(table.to_string()));
    }

    for column in mapping.column_names() {
        if !present.iter().any(|name| name.eq_ignore_ascii_case(column)) {
            return Err(MapperError::MissingRequiredColumn {
                table: table.to_string(),
                column: (*column).to_string(),
            });
        }
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get(1)?);
    }
    Ok(columns)
}
