//! Terminal commands.
//!
//! Each command maps its clap arguments onto the core parameter structure
//! through a `From` impl, runs the matching gateway operation once and
//! renders the markdown result:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Gateway → Markdown
//! ```
//!
//! Core parameter types stay free of clap attributes so the MCP server and
//! the terminal share them unchanged.

use std::fmt::Display;

use anyhow::Result;
use clap::Args;
use log::debug;
use pgate_core::{
    params::{DescribeTable, ExecuteQuery, ListSchemas, ListTables, DEFAULT_SCHEMA},
    Gateway,
};
use serde_json::Value;

use crate::renderer::TerminalRenderer;

/// Run a SQL statement
///
/// SELECT, SHOW, DESCRIBE and EXPLAIN print their rows; any other statement
/// is committed and prints the affected-row count.
#[derive(Args)]
pub struct QueryArgs {
    /// SQL statement; reference parameters as $1, $2, ...
    pub sql: String,
    /// Value for the next placeholder, as JSON (plain text is taken as a
    /// string)
    #[arg(short, long = "param", value_name = "JSON", value_parser = parse_param)]
    pub params: Vec<Value>,
}

impl From<QueryArgs> for ExecuteQuery {
    fn from(val: QueryArgs) -> Self {
        ExecuteQuery {
            query: val.sql,
            params: val.params,
            db_config: None,
        }
    }
}

/// Parses a `--param` value, falling back to a JSON string.
fn parse_param(raw: &str) -> Result<Value, std::convert::Infallible> {
    Ok(serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())))
}

/// List the tables of a schema
#[derive(Args)]
pub struct TablesArgs {
    /// Schema to list
    #[arg(short, long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,
}

impl From<TablesArgs> for ListTables {
    fn from(val: TablesArgs) -> Self {
        ListTables {
            schema_name: val.schema,
            db_config: None,
        }
    }
}

/// Show the columns and primary key of a table
#[derive(Args)]
pub struct DescribeArgs {
    /// Table to describe
    pub table: String,
    /// Schema containing the table
    #[arg(short, long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,
}

impl From<DescribeArgs> for DescribeTable {
    fn from(val: DescribeArgs) -> Self {
        DescribeTable {
            table_name: val.table,
            schema_name: val.schema,
            db_config: None,
        }
    }
}

/// Runs terminal commands against a gateway.
pub struct Cli {
    gateway: Gateway,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(gateway: Gateway, renderer: TerminalRenderer) -> Self {
        Self { gateway, renderer }
    }

    pub async fn query(&self, args: QueryArgs) -> Result<()> {
        let params = ExecuteQuery::from(args);
        debug!("query: {}", params.query);
        let outcome = self.gateway.execute_query(&params).await?;
        self.show(&outcome)
    }

    pub async fn tables(&self, args: TablesArgs) -> Result<()> {
        let tables = self.gateway.list_tables(&args.into()).await?;
        self.show(&tables)
    }

    pub async fn describe(&self, args: DescribeArgs) -> Result<()> {
        let description = self.gateway.describe_table(&args.into()).await?;
        self.show(&description)
    }

    pub async fn schemas(&self) -> Result<()> {
        let schemas = self.gateway.list_schemas(&ListSchemas::default()).await?;
        self.show(&schemas)
    }

    fn show(&self, result: &impl Display) -> Result<()> {
        self.renderer.render(&result.to_string())
    }
}
