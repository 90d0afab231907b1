use super::operator::Operator;
use rusqlite::types::Value;

/// One `column operator value` predicate.
///
/// Column names are not checked here; an unknown column surfaces when the
/// statement is prepared.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    column_name: String,
    operator: Operator,
    value: Value,
}

impl QueryCondition {
    pub fn new(
        column_name: impl Into<String>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            operator,
            value: value.into(),
        }
    }

    /// Shorthand for an equality predicate.
    pub fn eq(column_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(column_name, Operator::Eq, value)
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}
