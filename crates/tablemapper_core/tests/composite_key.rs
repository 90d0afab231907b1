use rusqlite::types::Value;
use rusqlite::Row;
use std::path::Path;
use tablemapper_core::{
    ConnectionSource, FileConnectionSource, GenericMapper, Operator, QueryCondition,
    SourceConfig, TableMapping,
};
use uuid::Uuid;

const SESSIONS_SCHEMA: &str = "CREATE TABLE sessions (
    tenant TEXT NOT NULL,
    session_id TEXT NOT NULL,
    label TEXT NOT NULL,
    hits INTEGER NOT NULL,
    PRIMARY KEY (tenant, session_id)
);";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    tenant: String,
    session_id: Uuid,
    label: String,
    hits: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SessionKey {
    tenant: String,
    session_id: Uuid,
}

struct SessionMapping;

impl TableMapping for SessionMapping {
    type Entity = Session;
    type Key = SessionKey;

    fn table_name(&self) -> &str {
        "sessions"
    }

    fn column_names(&self) -> &[&str] {
        &["tenant", "session_id", "label", "hits"]
    }

    fn key_column_names(&self) -> &[&str] {
        &["tenant", "session_id"]
    }

    fn serialize_object(&self, session: &Session) -> Vec<Value> {
        vec![
            Value::Text(session.tenant.clone()),
            Value::Text(session.session_id.to_string()),
            Value::Text(session.label.clone()),
            Value::Integer(session.hits),
        ]
    }

    fn build_object(&self, row: &Row<'_>) -> rusqlite::Result<Session> {
        let session_text: String = row.get(1)?;
        let session_id = Uuid::parse_str(&session_text).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                rusqlite::types::Type::Text,
                Box::new(err),
            )
        })?;
        Ok(Session {
            tenant: row.get(0)?,
            session_id,
            label: row.get(2)?,
            hits: row.get(3)?,
        })
    }

    fn serialize_key(&self, key: &SessionKey) -> Vec<Value> {
        vec![
            Value::Text(key.tenant.clone()),
            Value::Text(key.session_id.to_string()),
        ]
    }

    fn get_key(&self, session: &Session) -> SessionKey {
        SessionKey {
            tenant: session.tenant.clone(),
            session_id: session.session_id,
        }
    }
}

fn file_source(dir: &Path) -> FileConnectionSource {
    file_source_from(SourceConfig::new(dir.join("sessions.db")))
}

fn file_source_from(config: SourceConfig) -> FileConnectionSource {
    let source = FileConnectionSource::new(config);
    {
        let conn = source.acquire().unwrap();
        let mode: String = conn
            .query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(mode, "wal");
        conn.execute_batch(SESSIONS_SCHEMA).unwrap();
    }
    source
}

fn session(tenant: &str, label: &str, hits: i64) -> Session {
    Session {
        tenant: tenant.to_string(),
        session_id: Uuid::new_v4(),
        label: label.to_string(),
        hits,
    }
}

#[test]
fn composite_key_round_trips_through_file_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = file_source(dir.path());
    let mapper = GenericMapper::new(SessionMapping, &source).unwrap();

    let stored = session("acme", "login", 3);
    mapper.insert_object(&stored).unwrap();

    let key = SessionMapping.get_key(&stored);
    assert_eq!(mapper.find_by_id(&key).unwrap(), Some(stored.clone()));

    let other_tenant = SessionKey {
        tenant: "globex".to_string(),
        session_id: stored.session_id,
    };
    assert_eq!(mapper.find_by_id(&other_tenant).unwrap(), None);
    assert_eq!(mapper.delete_by_id(&other_tenant).unwrap(), 0);

    assert_eq!(mapper.delete_by_id(&key).unwrap(), 1);
    assert_eq!(mapper.find_by_id(&key).unwrap(), None);
}

#[test]
fn update_binds_key_values_containing_quotes() {
    let dir = tempfile::tempdir().unwrap();
    let source = file_source(dir.path());
    let mapper = GenericMapper::new(SessionMapping, &source).unwrap();

    let plain = session("acme", "plain", 1);
    let mut quoted = session("x' OR '1' = '1", "quoted", 1);
    mapper.insert_object(&plain).unwrap();
    mapper.insert_object(&quoted).unwrap();

    quoted.hits = 99;
    assert_eq!(mapper.update(&quoted).unwrap(), 1);

    let plain_after = mapper
        .find_by_id(&SessionMapping.get_key(&plain))
        .unwrap()
        .unwrap();
    assert_eq!(plain_after.hits, 1);
    let quoted_after = mapper
        .find_by_id(&SessionMapping.get_key(&quoted))
        .unwrap()
        .unwrap();
    assert_eq!(quoted_after.hits, 99);
}

#[test]
fn concurrent_inserts_with_distinct_keys_are_all_retrievable() {
    const WRITERS: usize = 8;
    const PER_WRITER: usize = 10;

    let dir = tempfile::tempdir().unwrap();
    let source = file_source(dir.path());
    let mapper = GenericMapper::new(SessionMapping, &source).unwrap();

    let written: Vec<Vec<Session>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|writer| {
                let mapper = &mapper;
                scope.spawn(move || {
                    (0..PER_WRITER)
                        .map(|index| {
                            let item = session(
                                &format!("tenant-{writer}"),
                                &format!("session-{index}"),
                                index as i64,
                            );
                            assert_eq!(mapper.insert_object(&item).unwrap(), 1);
                            item
                        })
                        .collect::<Vec<Session>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for item in written.iter().flatten() {
        let loaded = mapper.find_by_id(&SessionMapping.get_key(item)).unwrap();
        assert_eq!(loaded.as_ref(), Some(item));
    }
    assert_eq!(mapper.find_all().unwrap().len(), WRITERS * PER_WRITER);

    let tenant_zero = mapper
        .count_by_conditions(&[QueryCondition::new(
            "tenant",
            Operator::Eq,
            "tenant-0".to_string(),
        )])
        .unwrap();
    assert_eq!(tenant_zero, PER_WRITER as u64);
}

#[test]
fn source_config_deserializes_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("configured.db");
    let config: SourceConfig = serde_json::from_value(serde_json::json!({
        "path": path,
        "busy_timeout_ms": 250,
    }))
    .unwrap();

    assert_eq!(config.path, path);
    assert_eq!(config.busy_timeout_ms, 250);
    assert!(config.foreign_keys);
    assert!(!config.read_only);

    let source = file_source_from(config);
    let mapper = GenericMapper::try_new_checked(SessionMapping, &source).unwrap();
    assert!(mapper.find_all().unwrap().is_empty());
}
