//! Query building blocks: operators, conditions and statement assembly.
//!
//! # Responsibility
//! - Model WHERE predicates as immutable values.
//! - Turn mapping metadata and predicates into parameterized SQL.
//!
//! # Invariants
//! - No value is ever formatted into SQL text.

mod condition;
mod operator;
pub mod statement;

pub use condition::QueryCondition;
pub use operator::Operator;
pub use statement::Statement;
