//! Diagnosis of raw PostgreSQL error text.
//!
//! The driver reports failures as free-form server messages. This module
//! matches those messages against a fixed table of substrings and returns a
//! short human-readable hint that is appended to the surfaced error. The
//! tables are plain data so the matching order stays visible and testable;
//! they are tied to the server's English wording and degrade to "no hint"
//! when that wording changes.

use std::fmt;

use crate::config::ConnectionParams;
use OperationKind::*;

/// The operation on whose behalf a statement was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    ExecuteQuery,
    ListTables,
    DescribeTable,
    ListSchemas,
    CreateTable,
    InsertData,
    UpdateData,
}

impl OperationKind {
    /// Tool name of the operation.
    pub fn name(self) -> &'static str {
        match self {
            Self::ExecuteQuery => "execute_query",
            Self::ListTables => "list_tables",
            Self::DescribeTable => "describe_table",
            Self::ListSchemas => "list_schemas",
            Self::CreateTable => "create_table",
            Self::InsertData => "insert_data",
            Self::UpdateData => "update_data",
        }
    }

    /// Prefix of statement failure messages.
    pub fn failure(self) -> &'static str {
        match self {
            Self::ExecuteQuery => "Failed to execute query",
            Self::ListTables => "Failed to list tables",
            Self::DescribeTable => "Failed to describe table",
            Self::ListSchemas => "Failed to list schemas",
            Self::CreateTable => "Failed to create table",
            Self::InsertData => "Failed to insert data",
            Self::UpdateData => "Failed to update data",
        }
    }

    /// What the operation was doing, as in "while listing tables".
    pub fn action(self) -> &'static str {
        match self {
            Self::ExecuteQuery => "executing query",
            Self::ListTables => "listing tables",
            Self::DescribeTable => "describing table",
            Self::ListSchemas => "listing schemas",
            Self::CreateTable => "creating table",
            Self::InsertData => "inserting data",
            Self::UpdateData => "updating data",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A hint explaining the likely cause of a statement failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnosis {
    UnknownColumn,
    MissingTable,
    SyntaxError,
    PermissionDenied,
    TableOrSchemaMissing,
    TableExists,
    InvalidColumnDefinition,
    TargetTableMissing,
    ConstraintViolation,
    UnknownInsertColumn,
    UnknownSetColumn,
    InvalidCondition,
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnknownColumn => "the query references a column that does not exist",
            Self::MissingTable => "the queried table does not exist",
            Self::SyntaxError => "the SQL statement has a syntax error",
            Self::PermissionDenied => "the current user lacks the privileges for this operation",
            Self::TableOrSchemaMissing => "the table or schema does not exist",
            Self::TableExists => "the table already exists",
            Self::InvalidColumnDefinition => {
                "the generated statement has a syntax error, check the column definitions"
            }
            Self::TargetTableMissing => "the target table does not exist",
            Self::ConstraintViolation => "the data violates a table constraint",
            Self::UnknownInsertColumn => "the data contains a column the table does not have",
            Self::UnknownSetColumn => "the update sets a column the table does not have",
            Self::InvalidCondition => "the statement has a syntax error, check the WHERE condition",
        };
        f.write_str(text)
    }
}

/// One row of the classification table: all triggers must occur in the
/// lowercased message.
struct Rule {
    operation: OperationKind,
    triggers: &'static [&'static str],
    diagnosis: Diagnosis,
}

const fn rule(
    operation: OperationKind,
    triggers: &'static [&'static str],
    diagnosis: Diagnosis,
) -> Rule {
    Rule {
        operation,
        triggers,
        diagnosis,
    }
}

// Order matters: the first matching row for an operation wins.
const RULES: &[Rule] = &[
    rule(ExecuteQuery, &["column", "does not exist"], Diagnosis::UnknownColumn),
    rule(ExecuteQuery, &["relation", "does not exist"], Diagnosis::MissingTable),
    rule(ExecuteQuery, &["syntax error"], Diagnosis::SyntaxError),
    rule(ListTables, &["permission denied"], Diagnosis::PermissionDenied),
    rule(DescribeTable, &["does not exist"], Diagnosis::TableOrSchemaMissing),
    rule(DescribeTable, &["permission denied"], Diagnosis::PermissionDenied),
    rule(CreateTable, &["already exists"], Diagnosis::TableExists),
    rule(CreateTable, &["syntax error"], Diagnosis::InvalidColumnDefinition),
    rule(InsertData, &["does not exist"], Diagnosis::TargetTableMissing),
    rule(InsertData, &["violates", "constraint"], Diagnosis::ConstraintViolation),
    rule(InsertData, &["column", "does not exist"], Diagnosis::UnknownInsertColumn),
    rule(UpdateData, &["does not exist"], Diagnosis::TargetTableMissing),
    rule(UpdateData, &["column", "does not exist"], Diagnosis::UnknownSetColumn),
    rule(UpdateData, &["syntax error"], Diagnosis::InvalidCondition),
];

/// Classifies a raw statement error for the given operation.
///
/// Returns `None` when no rule matches.
pub fn classify(operation: OperationKind, raw: &str) -> Option<Diagnosis> {
    let message = raw.to_lowercase();
    RULES
        .iter()
        .filter(|rule| rule.operation == operation)
        .find(|rule| rule.triggers.iter().all(|t| message.contains(t)))
        .map(|rule| rule.diagnosis)
}

/// Explains why a connection attempt failed, using the parameters that were
/// tried.
pub fn diagnose_connection(raw: &str, params: &ConnectionParams) -> Option<String> {
    let message = raw.to_lowercase();
    if message.contains("connection refused") {
        Some(format!(
            "cannot reach the PostgreSQL server, check that host {} and port {} are correct \
             (connect timeout {}s)",
            params.host,
            params.port,
            params.connect_timeout.as_secs()
        ))
    } else if message.contains("password") && message.contains("authentication failed") {
        Some(format!(
            "authentication failed, check the password for user {}",
            params.user
        ))
    } else if message.contains("does not exist") && message.contains("database") {
        Some(format!(
            "unknown database {}, check the database name",
            params.database
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_missing_relation() {
        let diagnosis = classify(ExecuteQuery, "ERROR: relation \"foo\" does not exist");
        assert_eq!(diagnosis, Some(Diagnosis::MissingTable));
        assert!(diagnosis.unwrap().to_string().contains("table does not exist"));
    }

    #[test]
    fn test_query_unknown_column_wins_over_relation() {
        let raw = "ERROR: column \"nme\" of relation \"users\" does not exist";
        assert_eq!(classify(ExecuteQuery, raw), Some(Diagnosis::UnknownColumn));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(
            classify(ExecuteQuery, "ERROR: SYNTAX ERROR at or near \"SELEC\""),
            Some(Diagnosis::SyntaxError)
        );
    }

    #[test]
    fn test_rules_are_scoped_to_operation() {
        let raw = "ERROR: permission denied for table secrets";
        assert_eq!(classify(ListTables, raw), Some(Diagnosis::PermissionDenied));
        assert_eq!(classify(ExecuteQuery, raw), None);
        assert_eq!(classify(ListSchemas, raw), None);
    }

    #[test]
    fn test_insert_missing_table_shadows_unknown_column() {
        let raw = "ERROR: column \"x\" of relation \"t\" does not exist";
        assert_eq!(classify(InsertData, raw), Some(Diagnosis::TargetTableMissing));
        assert_eq!(classify(UpdateData, raw), Some(Diagnosis::TargetTableMissing));
    }

    #[test]
    fn test_insert_constraint_violation() {
        let raw = "ERROR: duplicate key value violates unique constraint \"users_pkey\"";
        assert_eq!(classify(InsertData, raw), Some(Diagnosis::ConstraintViolation));
    }

    #[test]
    fn test_create_table_already_exists() {
        let raw = "ERROR: relation \"users\" already exists";
        assert_eq!(classify(CreateTable, raw), Some(Diagnosis::TableExists));
    }

    #[test]
    fn test_unmatched_message() {
        assert_eq!(classify(UpdateData, "ERROR: deadlock detected"), None);
    }

    #[test]
    fn test_connection_refused_mentions_host_and_port() {
        let params = ConnectionParams::default();
        let hint = diagnose_connection(
            "error connecting to server: Connection refused (os error 111)",
            &params,
        )
        .expect("refused connection is diagnosed");
        assert!(hint.contains("localhost"));
        assert!(hint.contains("5432"));
        assert!(hint.contains("10s"));
    }

    #[test]
    fn test_connection_authentication_failed() {
        let params = ConnectionParams {
            user: "reporter".to_string(),
            ..ConnectionParams::default()
        };
        let hint = diagnose_connection(
            "db error: FATAL: password authentication failed for user \"reporter\"",
            &params,
        )
        .expect("authentication failure is diagnosed");
        assert!(hint.contains("reporter"));
    }

    #[test]
    fn test_connection_unknown_database() {
        let params = ConnectionParams {
            database: "analytics".to_string(),
            ..ConnectionParams::default()
        };
        let hint = diagnose_connection(
            "db error: FATAL: database \"analytics\" does not exist",
            &params,
        )
        .expect("missing database is diagnosed");
        assert!(hint.contains("analytics"));
        assert_eq!(diagnose_connection("timed out", &params), None);
    }
}
