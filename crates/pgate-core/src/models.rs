//! Result types returned by the gateway operations.
//!
//! Each type serializes to the JSON body of a successful tool result and
//! implements [`std::fmt::Display`] (see [`crate::display`]) for terminal
//! output.

use serde::{Deserialize, Serialize};

use crate::{db::StatementResult, params::Record};

/// Outcome of `execute_query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutcome {
    /// Rows of a read-type statement, in result order
    Rows { rows: Vec<Record>, row_count: usize },
    /// Row count of a write-type statement
    Affected { affected_rows: u64 },
}

impl From<StatementResult> for QueryOutcome {
    fn from(result: StatementResult) -> Self {
        match result {
            StatementResult::Rows(rows) => Self::Rows {
                row_count: rows.len(),
                rows,
            },
            StatementResult::Affected(affected_rows) => Self::Affected { affected_rows },
        }
    }
}

/// Tables of one schema, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableList {
    pub schema: String,
    pub tables: Vec<String>,
    pub count: usize,
}

impl TableList {
    pub fn new(schema: impl Into<String>, tables: Vec<String>) -> Self {
        Self {
            schema: schema.into(),
            count: tables.len(),
            tables,
        }
    }
}

/// One column as reported by `information_schema.columns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub character_maximum_length: Option<i32>,
    pub column_default: Option<String>,
    /// "YES" or "NO"
    pub is_nullable: String,
}

impl ColumnInfo {
    pub fn nullable(&self) -> bool {
        self.is_nullable.eq_ignore_ascii_case("YES")
    }
}

/// Column metadata and primary key of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescription {
    pub table: String,
    pub schema: String,
    pub columns: Vec<ColumnInfo>,
    pub primary_keys: Vec<String>,
}

/// User schemas, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaList {
    pub schemas: Vec<String>,
    pub count: usize,
}

impl SchemaList {
    pub fn new(schemas: Vec<String>) -> Self {
        Self {
            count: schemas.len(),
            schemas,
        }
    }
}

/// Confirmation of a DDL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub message: String,
}

/// Affected-row count of an INSERT or UPDATE with a summary line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowsChanged {
    pub affected_rows: u64,
    pub message: String,
}
