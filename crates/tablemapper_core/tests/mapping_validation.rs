use rusqlite::types::Value;
use rusqlite::Row;
use tablemapper_core::{
    ConnectionSource, GenericMapper, MapperError, SharedConnectionSource, TableMapping,
};

/// Row-less mapping whose metadata is set per test.
struct MetaMapping {
    table: &'static str,
    columns: Vec<&'static str>,
    keys: Vec<&'static str>,
}

impl MetaMapping {
    fn new(table: &'static str, columns: &[&'static str], keys: &[&'static str]) -> Self {
        Self {
            table,
            columns: columns.to_vec(),
            keys: keys.to_vec(),
        }
    }
}

impl TableMapping for MetaMapping {
    type Entity = Vec<Value>;
    type Key = Vec<Value>;

    fn table_name(&self) -> &str {
        self.table
    }

    fn column_names(&self) -> &[&str] {
        &self.columns
    }

    fn key_column_names(&self) -> &[&str] {
        &self.keys
    }

    fn serialize_object(&self, object: &Vec<Value>) -> Vec<Value> {
        object.clone()
    }

    fn build_object(&self, row: &Row<'_>) -> rusqlite::Result<Vec<Value>> {
        (0..self.columns.len()).map(|index| row.get(index)).collect()
    }

    fn serialize_key(&self, key: &Vec<Value>) -> Vec<Value> {
        key.clone()
    }

    fn get_key(&self, object: &Vec<Value>) -> Vec<Value> {
        object.iter().take(self.keys.len()).cloned().collect()
    }
}

fn source_with(schema: &str) -> SharedConnectionSource {
    let source = SharedConnectionSource::open_in_memory().unwrap();
    source.acquire().unwrap().execute_batch(schema).unwrap();
    source
}

fn invalid_mapping_message(mapping: MetaMapping) -> String {
    let source = SharedConnectionSource::open_in_memory().unwrap();
    let result = GenericMapper::new(mapping, &source);
    match result {
        Err(MapperError::InvalidMapping(message)) => message,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected invalid mapping"),
    }
}

#[test]
fn mapping_without_columns_or_keys_is_rejected() {
    assert!(invalid_mapping_message(MetaMapping::new("t", &[], &[])).contains("no columns"));
    assert!(invalid_mapping_message(MetaMapping::new("t", &["a"], &[])).contains("no key"));
}

#[test]
fn mapping_with_non_identifier_names_is_rejected() {
    assert!(
        invalid_mapping_message(MetaMapping::new("t; DROP TABLE t", &["a"], &["a"]))
            .contains("table name")
    );
    assert!(
        invalid_mapping_message(MetaMapping::new("t", &["a", "b c"], &["a"]))
            .contains("`b c`")
    );
}

#[test]
fn mapping_with_duplicate_or_unmapped_key_columns_is_rejected() {
    assert!(
        invalid_mapping_message(MetaMapping::new("t", &["a", "a"], &["a"]))
            .contains("mapped twice")
    );
    assert!(
        invalid_mapping_message(MetaMapping::new("t", &["a", "b"], &["c"]))
            .contains("key column `c`")
    );
}

#[test]
fn checked_constructor_accepts_matching_schema() {
    let source = source_with("CREATE TABLE items (code TEXT PRIMARY KEY, qty INTEGER);");
    let mapper = GenericMapper::try_new_checked(
        MetaMapping::new("items", &["code", "qty"], &["code"]),
        &source,
    )
    .unwrap();

    let row = vec![Value::Text("bolt".to_string()), Value::Integer(12)];
    assert_eq!(mapper.insert_object(&row).unwrap(), 1);
    assert_eq!(
        mapper
            .find_by_id(&vec![Value::Text("bolt".to_string())])
            .unwrap(),
        Some(row)
    );
}

#[test]
fn checked_constructor_rejects_missing_table() {
    let source = SharedConnectionSource::open_in_memory().unwrap();
    let result =
        GenericMapper::try_new_checked(MetaMapping::new("items", &["code"], &["code"]), &source);

    assert!(matches!(
        result,
        Err(MapperError::MissingRequiredTable(table)) if table == "items"
    ));
}

#[test]
fn checked_constructor_rejects_missing_column() {
    let source = source_with("CREATE TABLE items (code TEXT PRIMARY KEY);");
    let result = GenericMapper::try_new_checked(
        MetaMapping::new("items", &["code", "qty"], &["code"]),
        &source,
    );

    assert!(matches!(
        result,
        Err(MapperError::MissingRequiredColumn { table, column })
            if table == "items" && column == "qty"
    ));
}
