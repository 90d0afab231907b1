//! Parameterized SQL assembly.
//!
//! # Invariants
//! - Every value reaches SQLite as a bound `?` parameter, never as SQL text.
//! - `params` order matches placeholder order in `sql`.
//! - Identifiers are emitted as given; callers validate them beforehand.

use super::condition::QueryCondition;
use rusqlite::types::Value;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

pub fn select_all(table: &str, columns: &[&str]) -> Statement {
    Statement {
        sql: format!("SELECT {} FROM {table}", columns.join(", ")),
        params: Vec::new(),
    }
}

/// `SELECT <columns> FROM <table> WHERE <predicates>`.
///
/// `conditions` must not be empty.
pub fn select_where(table: &str, columns: &[&str], conditions: &[QueryCondition]) -> Statement {
    let (predicates, params) = where_clause(conditions);
    Statement {
        sql: format!(
            "SELECT {} FROM {table} WHERE {predicates}",
            columns.join(", ")
        ),
        params,
    }
}

/// `select_where` limited to one row.
pub fn select_first_where(
    table: &str,
    columns: &[&str],
    conditions: &[QueryCondition],
) -> Statement {
    let mut statement = select_where(table, columns, conditions);
    statement.sql.push_str(" LIMIT 1");
    statement
}

/// `SELECT COUNT(*) FROM <table> WHERE <predicates>`.
pub fn count_where(table: &str, conditions: &[QueryCondition]) -> Statement {
    let (predicates, params) = where_clause(conditions);
    Statement {
        sql: format!("SELECT COUNT(*) FROM {table} WHERE {predicates}"),
        params,
    }
}

pub fn insert(table: &str, columns: &[&str], values: Vec<Value>) -> Statement {
    Statement {
        sql: format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            columns.join(", "),
            placeholders(columns.len())
        ),
        params: values,
    }
}

/// `UPDATE <table> SET c = ?, ... WHERE k = ? AND ...`.
///
/// Column values bind first, key values after them.
pub fn update_by_key(
    table: &str,
    columns: &[&str],
    values: Vec<Value>,
    key_columns: &[&str],
    key_values: Vec<Value>,
) -> Statement {
    let assignments = columns
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let predicates = key_columns
        .iter()
        .map(|column| format!("{column} = ?"))
        .collect::<Vec<_>>()
        .join(" AND ");

    let mut params = values;
    params.extend(key_values);
    Statement {
        sql: format!("UPDATE {table} SET {assignments} WHERE {predicates}"),
        params,
    }
}

/// `DELETE FROM <table> WHERE <predicates>`.
///
/// `conditions` must not be empty.
pub fn delete_where(table: &str, conditions: &[QueryCondition]) -> Statement {
    let (predicates, params) = where_clause(conditions);
    Statement {
        sql: format!("DELETE FROM {table} WHERE {predicates}"),
        params,
    }
}

fn where_clause(conditions: &[QueryCondition]) -> (String, Vec<Value>) {
    let predicates = conditions
        .iter()
        .map(|condition| format!("{} {} ?", condition.column_name(), condition.operator()))
        .collect::<Vec<_>>()
        .join(" AND ");
    let params = conditions
        .iter()
        .map(|condition| condition.value().clone())
        .collect();
    (predicates, params)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
