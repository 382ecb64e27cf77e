//! Statement execution on an acquired connection.

use log::{debug, trace};
use serde_json::Value;
use tokio_postgres::{types::ToSql, SimpleQueryMessage};

use super::{
    value::{row_to_record, SqlParam},
    Connection,
};
use crate::{
    diagnosis::OperationKind,
    error::{driver_message, GatewayError, Result},
    params::Record,
};

/// Statement prefixes that produce a row set.
const READ_PREFIXES: [&str; 4] = ["SELECT", "SHOW", "DESCRIBE", "EXPLAIN"];

/// How a statement's outcome is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns its rows
    Read,
    /// Runs in a committed transaction and returns the affected-row count
    Write,
}

impl StatementKind {
    /// Classifies `text` by its leading keyword, ignoring case and leading
    /// whitespace.
    pub fn of(text: &str) -> Self {
        let head = text.trim_start();
        let is_read = READ_PREFIXES.iter().any(|prefix| {
            head.get(..prefix.len())
                .is_some_and(|word| word.eq_ignore_ascii_case(prefix))
        });
        if is_read {
            Self::Read
        } else {
            Self::Write
        }
    }
}

/// Outcome of one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementResult {
    Rows(Vec<Record>),
    Affected(u64),
}

/// Runs `text` with `params` bound to `$1..$n`.
///
/// Every statement runs inside a transaction. Reads are rolled back once
/// their rows are collected, so side effects of statements such as
/// `EXPLAIN ANALYZE` never persist. Writes are committed only after the
/// statement succeeds; on any failure the transaction is dropped and rolled
/// back. A write without parameters is sent as a simple-protocol script and
/// may hold several statements; the count reported is that of the last one.
///
/// # Errors
///
/// Returns `GatewayError::Statement` when the server rejects the statement
/// and `GatewayError::Unknown` when a returned row cannot be decoded.
pub async fn execute(
    connection: &mut Connection,
    text: &str,
    params: &[Value],
    kind: StatementKind,
    operation: OperationKind,
) -> Result<StatementResult> {
    trace!("{operation} ({kind:?}): {text}");

    let bound: Vec<SqlParam<'_>> = params.iter().map(SqlParam).collect();
    let refs: Vec<&(dyn ToSql + Sync)> = bound
        .iter()
        .map(|param| param as &(dyn ToSql + Sync))
        .collect();
    let rejected = |e: tokio_postgres::Error| {
        debug!("{operation} rejected: {text}");
        GatewayError::statement(operation, &e)
    };

    let transaction = connection
        .client_mut()
        .transaction()
        .await
        .map_err(rejected)?;

    match kind {
        StatementKind::Read => {
            let rows = transaction.query(text, &refs).await.map_err(rejected)?;
            let records = rows
                .iter()
                .map(row_to_record)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| GatewayError::unknown(operation, driver_message(&e)))?;
            transaction.rollback().await.map_err(rejected)?;
            Ok(StatementResult::Rows(records))
        }
        StatementKind::Write => {
            let affected = if refs.is_empty() {
                let messages = transaction.simple_query(text).await.map_err(rejected)?;
                last_command_count(&messages)
            } else {
                transaction.execute(text, &refs).await.map_err(rejected)?
            };
            transaction.commit().await.map_err(rejected)?;
            Ok(StatementResult::Affected(affected))
        }
    }
}

/// Row count of the last completed command in a simple-protocol response.
fn last_command_count(messages: &[SimpleQueryMessage]) -> u64 {
    messages
        .iter()
        .rev()
        .find_map(|message| match message {
            SimpleQueryMessage::CommandComplete(count) => Some(*count),
            _ => None,
        })
        .unwrap_or(0)
}
