//! Parameter structures for gateway operations
//!
//! These structures are shared by every interface (MCP tools, terminal
//! commands) and carry no framework-specific derives beyond serde. JSON
//! schema generation for tool registration is enabled with the `schema`
//! feature, so the core stays free of `schemars` unless an interface needs
//! it.
//!
//! Every operation accepts an optional `db_config` holding per-call
//! [`ProfileOverrides`]; its keys take precedence over the process-wide
//! configuration.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ProfileOverrides;

/// One row of data keyed by column name.
pub type Record = Map<String, Value>;

/// Schema used when the caller names none.
pub const DEFAULT_SCHEMA: &str = "public";

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_true() -> bool {
    true
}

/// Parameters for running an arbitrary SQL statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ExecuteQuery {
    /// SQL statement; reference parameters as $1, $2, ...
    pub query: String,
    /// Values bound to the statement's placeholders, in order
    #[serde(default)]
    pub params: Vec<Value>,
    /// Per-call connection settings overriding the server configuration
    #[serde(default)]
    pub db_config: Option<ProfileOverrides>,
}

/// Parameters for listing the tables of a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListTables {
    /// Schema to list (defaults to "public")
    #[serde(default = "default_schema")]
    pub schema_name: String,
    /// Per-call connection settings overriding the server configuration
    #[serde(default)]
    pub db_config: Option<ProfileOverrides>,
}

impl Default for ListTables {
    fn default() -> Self {
        Self {
            schema_name: default_schema(),
            db_config: None,
        }
    }
}

/// Parameters for describing one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DescribeTable {
    /// Name of the table
    pub table_name: String,
    /// Schema containing the table (defaults to "public")
    #[serde(default = "default_schema")]
    pub schema_name: String,
    /// Per-call connection settings overriding the server configuration
    #[serde(default)]
    pub db_config: Option<ProfileOverrides>,
}

/// Parameters for listing schemas.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListSchemas {
    /// Per-call connection settings overriding the server configuration
    #[serde(default)]
    pub db_config: Option<ProfileOverrides>,
}

/// Definition of one column in a CREATE TABLE request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// SQL type, e.g. "integer" or "varchar(255)"
    #[serde(rename = "type")]
    pub data_type: String,
    /// Set to false to add NOT NULL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Default expression; strings are used verbatim as SQL (quote text
    /// literals yourself, e.g. "'pending'" or "now()")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether the column is part of the primary key
    #[serde(default)]
    pub primary_key: bool,
}

/// Parameters for creating a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateTable {
    /// Name of the new table
    pub table_name: String,
    /// Column definitions, in table order
    pub columns: Vec<ColumnDefinition>,
    /// Schema to create the table in (defaults to "public")
    #[serde(default = "default_schema")]
    pub schema_name: String,
    /// Add IF NOT EXISTS (defaults to true)
    #[serde(default = "default_true")]
    pub if_not_exists: bool,
    /// Per-call connection settings overriding the server configuration
    #[serde(default)]
    pub db_config: Option<ProfileOverrides>,
}

/// A single record or a list of records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(untagged)]
pub enum Records {
    One(Record),
    Many(Vec<Record>),
}

impl Records {
    /// Normalizes to a list of rows.
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            Self::One(record) => vec![record],
            Self::Many(records) => records,
        }
    }
}

impl Default for Records {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// Parameters for inserting rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct InsertData {
    /// Target table
    pub table_name: String,
    /// One record or a list of records; the keys of the first record
    /// decide the column list
    pub data: Records,
    /// Schema containing the table (defaults to "public")
    #[serde(default = "default_schema")]
    pub schema_name: String,
    /// Per-call connection settings overriding the server configuration
    #[serde(default)]
    pub db_config: Option<ProfileOverrides>,
}

/// Parameters for updating rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateData {
    /// Target table
    pub table_name: String,
    /// Column values to set
    pub data: Record,
    /// WHERE condition (required); placeholders $1, $2, ... refer to
    /// `params`
    #[serde(default)]
    pub condition: String,
    /// Values bound to the condition's placeholders
    #[serde(default)]
    pub params: Vec<Value>,
    /// Schema containing the table (defaults to "public")
    #[serde(default = "default_schema")]
    pub schema_name: String,
    /// Per-call connection settings overriding the server configuration
    #[serde(default)]
    pub db_config: Option<ProfileOverrides>,
}
