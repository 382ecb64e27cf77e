//! High-level gateway API exposing the database operations.
//!
//! The [`Gateway`] is the single entry point shared by the MCP server and
//! the terminal commands. It holds the process-wide connection profile and
//! runs each operation on a connection of its own:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Operations    │    │   SQL assembly  │    │    Database     │
//! │ (catalog,       │───▶│   (sql) and     │───▶│  (db::connect,  │
//! │  statements)    │    │   validation    │    │   db::execute)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Every operation validates its arguments before touching the network,
//! resolves the effective profile from the per-call `db_config`, acquires a
//! connection, runs one statement and drops the connection on return.
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Gateway`] instances
//! - [`catalog`]: Read-only schema inspection (tables, columns, schemas)
//! - [`statements`]: Arbitrary queries and data-changing operations
//!
//! # Usage
//!
//! ```rust,no_run
//! use pgate_core::{params::ListTables, GatewayBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GatewayBuilder::new().build();
//! let tables = gateway.list_tables(&ListTables::default()).await?;
//! println!("{tables}");
//! # Ok(())
//! # }
//! ```

use log::debug;
use serde_json::Value;

use crate::{
    config::{resolve, Profile, ProfileOverrides},
    db::{self, StatementKind, StatementResult},
    diagnosis::OperationKind,
    error::{GatewayError, Result},
    params::Record,
};

pub mod builder;
pub mod catalog;
pub mod statements;

pub use builder::GatewayBuilder;

/// Main gateway interface.
#[derive(Debug, Clone)]
pub struct Gateway {
    defaults: Profile,
    overrides: Option<ProfileOverrides>,
}

impl Gateway {
    pub(crate) fn new(defaults: Profile, overrides: Option<ProfileOverrides>) -> Self {
        Self {
            defaults,
            overrides,
        }
    }

    /// Effective profile for a call carrying `db_config`.
    pub fn profile_for(&self, db_config: Option<&ProfileOverrides>) -> Profile {
        resolve(self.defaults.clone(), self.overrides.as_ref(), db_config)
    }

    /// Acquires a connection for one call and runs `text` on it.
    async fn run(
        &self,
        operation: OperationKind,
        db_config: Option<&ProfileOverrides>,
        text: &str,
        params: &[Value],
        kind: StatementKind,
    ) -> Result<StatementResult> {
        let profile = self.profile_for(db_config);
        debug!(
            "{operation}: using {}@{}:{}/{}",
            profile.connection.user,
            profile.connection.host,
            profile.connection.port,
            profile.connection.database
        );
        let mut connection = db::acquire(&profile).await?;
        db::execute(&mut connection, text, params, kind, operation).await
    }

    /// Runs a catalog query and returns its rows.
    async fn query_rows(
        &self,
        operation: OperationKind,
        db_config: Option<&ProfileOverrides>,
        text: &str,
        params: &[Value],
    ) -> Result<Vec<Record>> {
        let result = self
            .run(operation, db_config, text, params, StatementKind::Read)
            .await?;
        into_rows(operation, result)
    }

    /// Runs a data-changing statement and returns the affected-row count.
    async fn write(
        &self,
        operation: OperationKind,
        db_config: Option<&ProfileOverrides>,
        text: &str,
        params: &[Value],
    ) -> Result<u64> {
        match self
            .run(operation, db_config, text, params, StatementKind::Write)
            .await?
        {
            StatementResult::Affected(count) => Ok(count),
            StatementResult::Rows(rows) => Ok(rows.len() as u64),
        }
    }
}

fn into_rows(operation: OperationKind, result: StatementResult) -> Result<Vec<Record>> {
    match result {
        StatementResult::Rows(rows) => Ok(rows),
        StatementResult::Affected(_) => Err(GatewayError::unknown(
            operation,
            "catalog query returned no row set",
        )),
    }
}

/// Collects the text column `column` of every row.
fn text_column(operation: OperationKind, rows: Vec<Record>, column: &str) -> Result<Vec<String>> {
    rows.into_iter()
        .map(|mut row| match row.remove(column) {
            Some(Value::String(text)) => Ok(text),
            other => Err(GatewayError::unknown(
                operation,
                format!("expected text in column '{column}', got {other:?}"),
            )),
        })
        .collect()
}
