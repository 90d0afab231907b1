//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `tablemapper_core` linkage and run one CRUD cycle end to end.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `tablemapper_cli [DB_PATH] [--log-dir ABS_DIR]`. Without a path the
//! cycle runs against a private in-memory database.

use clap::Parser;
use log::info;
use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tablemapper_core::{
    default_log_level, init_logging, ConnectionSource, FileConnectionSource, GenericMapper,
    SharedConnectionSource, SourceConfig, TableMapping,
};

const USERS_SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    age INTEGER NOT NULL
);";

#[derive(Debug, Clone, PartialEq, Eq)]
struct User {
    id: i64,
    name: String,
    age: i64,
}

struct UserMapping;

impl TableMapping for UserMapping {
    type Entity = User;
    type Key = i64;

    fn table_name(&self) -> &str {
        "users"
    }

    fn column_names(&self) -> &[&str] {
        &["id", "name", "age"]
    }

    fn key_column_names(&self) -> &[&str] {
        &["id"]
    }

    fn serialize_object(&self, user: &User) -> Vec<Value> {
        vec![
            Value::Integer(user.id),
            Value::Text(user.name.clone()),
            Value::Integer(user.age),
        ]
    }

    fn build_object(&self, row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
        })
    }

    fn serialize_key(&self, key: &i64) -> Vec<Value> {
        vec![Value::Integer(*key)]
    }

    fn get_key(&self, user: &User) -> i64 {
        user.id
    }
}

/// Runs one insert/find/update/delete cycle against a `users` table.
#[derive(Parser, Debug)]
#[command(name = "tablemapper_cli", version)]
struct Args {
    /// SQLite database file; a private in-memory database when omitted.
    db_path: Option<PathBuf>,

    /// Absolute directory for rotating log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    println!("tablemapper_core version={}", tablemapper_core::core_version());

    if let Some(log_dir) = args.log_dir.as_deref() {
        if let Err(err) = init_logging(default_log_level(), log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    let result = match args.db_path {
        Some(path) => {
            let source = FileConnectionSource::new(SourceConfig::new(path));
            run_users_cycle(&source)
        }
        None => SharedConnectionSource::open_in_memory()
            .map_err(Into::into)
            .and_then(|source| run_users_cycle(&source)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_users_cycle<S: ConnectionSource>(source: &S) -> Result<(), Box<dyn Error>> {
    source.acquire()?.execute_batch(USERS_SCHEMA)?;
    let mapper = GenericMapper::try_new_checked(UserMapping, source)?;
    info!("event=cli_cycle module=cli status=start");

    let ann = User {
        id: 1,
        name: "Ann".to_string(),
        age: 30,
    };
    println!("insert rows={}", mapper.insert_object(&ann)?);
    println!("find {:?}", mapper.find_by_id(&ann.id)?);

    let older = User { age: 31, ..ann };
    println!("update rows={}", mapper.update(&older)?);
    println!("find {:?}", mapper.find_by_id(&older.id)?);

    println!("delete rows={}", mapper.delete_by_id(&older.id)?);
    println!("find {:?}", mapper.find_by_id(&older.id)?);

    info!("event=cli_cycle module=cli status=ok");
    Ok(())
}
