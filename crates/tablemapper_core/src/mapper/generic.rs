use super::error::{MapperError, MapperResult};
use super::validate::{ensure_table_ready, validate_conditions, validate_mapping};
use super::TableMapping;
use crate::db::ConnectionSource;
use crate::query::statement::{self, Statement};
use crate::query::QueryCondition;
use log::{debug, error};
use rusqlite::params_from_iter;
use rusqlite::types::{Type, Value};
use std::time::Instant;

/// CRUD access object for one mapped table.
///
/// Holds no per-call state: every operation checks out one connection,
/// runs one statement and releases the connection before returning. The
/// source is borrowed and stays owned by the caller.
pub struct GenericMapper<'src, M, S> {
    mapping: M,
    source: &'src S,
}

impl<'src, M, S> GenericMapper<'src, M, S>
where
    M: TableMapping,
    S: ConnectionSource,
{
    /// Creates a mapper after validating the mapping metadata.
    ///
    /// # Errors
    /// - `InvalidMapping` when the table or a column is not a plain
    ///   identifier, no columns or keys are declared, a column repeats, or a
    ///   key column is not mapped.
    pub fn new(mapping: M, source: &'src S) -> MapperResult<Self> {
        validate_mapping(&mapping)?;
        Ok(Self { mapping, source })
    }

    /// Like `new`, and also checks the table and its columns exist.
    ///
    /// # Errors
    /// - Everything `new` returns.
    /// - `Db` when no connection can be acquired.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match the mapping.
    pub fn try_new_checked(mapping: M, source: &'src S) -> MapperResult<Self> {
        let mapper = Self::new(mapping, source)?;
        {
            let conn = mapper.source.acquire()?;
            ensure_table_ready(&conn, &mapper.mapping)?;
        }
        Ok(mapper)
    }

    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Returns the borrowed connection source.
    pub fn source(&self) -> &'src S {
        self.source
    }

    /// Returns every row of the table.
    pub fn find_all(&self) -> MapperResult<Vec<M::Entity>> {
        let statement = statement::select_all(self.table(), self.mapping.column_names());
        self.query("find_all", statement)
    }

    /// Returns every row matching all `conditions`.
    ///
    /// # Errors
    /// - `EmptyConditions` when `conditions` is empty; use `find_all` for a
    ///   full scan.
    /// - `InvalidIdentifier` when a condition column is not a plain
    ///   identifier.
    pub fn find_by_conditions(
        &self,
        conditions: &[QueryCondition],
    ) -> MapperResult<Vec<M::Entity>> {
        self.check_conditions("find_by_conditions", conditions)?;
        let statement =
            statement::select_where(self.table(), self.mapping.column_names(), conditions);
        self.query("find_by_conditions", statement)
    }

    /// Returns the first row matching all `conditions`, if any.
    pub fn find_first_by_conditions(
        &self,
        conditions: &[QueryCondition],
    ) -> MapperResult<Option<M::Entity>> {
        self.check_conditions("find_first_by_conditions", conditions)?;
        let statement =
            statement::select_first_where(self.table(), self.mapping.column_names(), conditions);
        Ok(self
            .query("find_first_by_conditions", statement)?
            .into_iter()
            .next())
    }

    /// Looks up one entity by key. `Ok(None)` means not found.
    ///
    /// # Errors
    /// - `ArityMismatch` when `serialize_key` does not produce one value per
    ///   key column.
    pub fn find_by_id(&self, key: &M::Key) -> MapperResult<Option<M::Entity>> {
        let conditions = self.key_conditions("find_by_id", key)?;
        self.find_first_by_conditions(&conditions)
    }

    pub fn exists_by_id(&self, key: &M::Key) -> MapperResult<bool> {
        let conditions = self.key_conditions("exists_by_id", key)?;
        Ok(self.count_by_conditions(&conditions)? > 0)
    }

    /// Counts rows matching all `conditions`.
    pub fn count_by_conditions(&self, conditions: &[QueryCondition]) -> MapperResult<u64> {
        self.check_conditions("count_by_conditions", conditions)?;
        let statement = statement::count_where(self.table(), conditions);
        self.query_count("count_by_conditions", statement)
    }

    /// Deletes every row matching all `conditions` and returns the count.
    ///
    /// # Errors
    /// - `EmptyConditions` when `conditions` is empty. Clearing a table is
    ///   never implied by a missing filter.
    pub fn delete_by_conditions(&self, conditions: &[QueryCondition]) -> MapperResult<usize> {
        self.check_conditions("delete_by_conditions", conditions)?;
        let statement = statement::delete_where(self.table(), conditions);
        self.execute("delete_by_conditions", statement)
    }

    /// Deletes the row identified by `key`; returns 0 or 1 for a real key.
    pub fn delete_by_id(&self, key: &M::Key) -> MapperResult<usize> {
        let conditions = self.key_conditions("delete_by_id", key)?;
        self.delete_by_conditions(&conditions)
    }

    /// Inserts `object` and returns the affected row count.
    pub fn insert_object(&self, object: &M::Entity) -> MapperResult<usize> {
        let values = self.object_values("insert_object", object)?;
        let statement = statement::insert(self.table(), self.mapping.column_names(), values);
        self.execute("insert_object", statement)
    }

    /// Rewrites every column of the row keyed by `get_key(object)`.
    ///
    /// Returns the affected row count; 0 means no row has that key.
    pub fn update(&self, object: &M::Entity) -> MapperResult<usize> {
        let values = self.object_values("update", object)?;
        let key = self.mapping.get_key(object);
        let key_values = self.key_values("update", &key)?;
        let statement = statement::update_by_key(
            self.table(),
            self.mapping.column_names(),
            values,
            self.mapping.key_column_names(),
            key_values,
        );
        self.execute("update", statement)
    }

    fn table(&self) -> &str {
        self.mapping.table_name()
    }

    fn query(&self, op: &'static str, statement: Statement) -> MapperResult<Vec<M::Entity>> {
        let started_at = Instant::now();
        let conn = self
            .source
            .acquire()
            .map_err(|err| self.fail(op, started_at, err.into()))?;
        let mut stmt = conn
            .prepare(&statement.sql)
            .map_err(|err| self.fail(op, started_at, self.statement_error(err)))?;
        let mut rows = stmt
            .query(params_from_iter(statement.params.iter()))
            .map_err(|err| self.fail(op, started_at, self.statement_error(err)))?;

        let mut entities = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|err| self.fail(op, started_at, self.statement_error(err)))?
        {
            let entity = self.mapping.build_object(row).map_err(|source| {
                let err = MapperError::Mapping {
                    table: self.table().to_string(),
                    source,
                };
                self.fail(op, started_at, err)
            })?;
            entities.push(entity);
        }

        debug!(
            "event=mapper_query module=mapper status=ok table={} op={} params={} rows={} duration_ms={}",
            self.table(),
            op,
            statement.params.len(),
            entities.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entities)
    }

    fn query_count(&self, op: &'static str, statement: Statement) -> MapperResult<u64> {
        let started_at = Instant::now();
        let conn = self
            .source
            .acquire()
            .map_err(|err| self.fail(op, started_at, err.into()))?;
        let raw: i64 = conn
            .query_row(
                &statement.sql,
                params_from_iter(statement.params.iter()),
                |row| row.get(0),
            )
            .map_err(|err| self.fail(op, started_at, self.statement_error(err)))?;
        let count = count_from_sql(raw).map_err(|source| {
            let err = MapperError::Mapping {
                table: self.table().to_string(),
                source,
            };
            self.fail(op, started_at, err)
        })?;

        debug!(
            "event=mapper_query module=mapper status=ok table={} op={} params={} rows=1 duration_ms={}",
            self.table(),
            op,
            statement.params.len(),
            started_at.elapsed().as_millis()
        );
        Ok(count)
    }

    fn execute(&self, op: &'static str, statement: Statement) -> MapperResult<usize> {
        let started_at = Instant::now();
        let conn = self
            .source
            .acquire()
            .map_err(|err| self.fail(op, started_at, err.into()))?;
        let changed = conn
            .execute(&statement.sql, params_from_iter(statement.params.iter()))
            .map_err(|err| self.fail(op, started_at, self.statement_error(err)))?;

        debug!(
            "event=mapper_execute module=mapper status=ok table={} op={} params={} rows={} duration_ms={}",
            self.table(),
            op,
            statement.params.len(),
            changed,
            started_at.elapsed().as_millis()
        );
        Ok(changed)
    }

    fn check_conditions(
        &self,
        op: &'static str,
        conditions: &[QueryCondition],
    ) -> MapperResult<()> {
        let started_at = Instant::now();
        if conditions.is_empty() {
            let err = MapperError::EmptyConditions {
                table: self.table().to_string(),
            };
            return Err(self.fail(op, started_at, err));
        }
        validate_conditions(conditions).map_err(|err| self.fail(op, started_at, err))
    }

    fn key_conditions(
        &self,
        op: &'static str,
        key: &M::Key,
    ) -> MapperResult<Vec<QueryCondition>> {
        let values = self.key_values(op, key)?;
        Ok(self
            .mapping
            .key_column_names()
            .iter()
            .zip(values)
            .map(|(column, value)| QueryCondition::eq(*column, value))
            .collect())
    }

    fn key_values(&self, op: &'static str, key: &M::Key) -> MapperResult<Vec<Value>> {
        let values = self.mapping.serialize_key(key);
        self.check_arity(op, "key", self.mapping.key_column_names().len(), values.len())?;
        Ok(values)
    }

    fn object_values(&self, op: &'static str, object: &M::Entity) -> MapperResult<Vec<Value>> {
        let values = self.mapping.serialize_object(object);
        self.check_arity(op, "object", self.mapping.column_names().len(), values.len())?;
        Ok(values)
    }

    fn check_arity(
        &self,
        op: &'static str,
        what: &'static str,
        expected: usize,
        actual: usize,
    ) -> MapperResult<()> {
        if expected == actual {
            return Ok(());
        }
        let err = MapperError::ArityMismatch {
            table: self.table().to_string(),
            what,
            expected,
            actual,
        };
        Err(self.fail(op, Instant::now(), err))
    }

    fn statement_error(&self, source: rusqlite::Error) -> MapperError {
        MapperError::Statement {
            table: self.table().to_string(),
            source,
        }
    }

    fn fail(&self, op: &'static str, started_at: Instant, err: MapperError) -> MapperError {
        error!(
            "event=mapper_op module=mapper status=error table={} op={} duration_ms={} error_code={} error={}",
            self.table(),
            op,
            started_at.elapsed().as_millis(),
            err.code(),
            err
        );
        err
    }
}

fn count_from_sql(raw: i64) -> rusqlite::Result<u64> {
    u64::try_from(raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err))
    })
}
