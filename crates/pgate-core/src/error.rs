//! Error types for the gateway library.

use std::fmt;

use thiserror::Error;

use crate::diagnosis::{Diagnosis, OperationKind};

/// Comprehensive error type for all gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or malformed caller arguments, detected before any database
    /// interaction
    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },
    /// No connection could be opened within the retry budget
    #[error(
        "Database connection failed after {attempts} attempt(s): {cause}{}",
        reason_line(.diagnosis)
    )]
    Connection {
        attempts: u32,
        cause: String,
        diagnosis: Option<String>,
    },
    /// The server rejected a statement
    #[error(
        "{}: {message}{}",
        .operation.failure(),
        reason_line(.diagnosis)
    )]
    Statement {
        operation: OperationKind,
        message: String,
        diagnosis: Option<Diagnosis>,
    },
    /// Anything else that went wrong while serving a call
    #[error("Unexpected error while {}: {message}", .operation.action())]
    Unknown {
        operation: OperationKind,
        message: String,
    },
}

fn reason_line<D: fmt::Display>(diagnosis: &Option<D>) -> String {
    diagnosis
        .as_ref()
        .map(|d| format!("\nReason: {d}"))
        .unwrap_or_default()
}

/// Builder for creating input validation errors.
pub struct InvalidInputBuilder {
    field: String,
}

impl InvalidInputBuilder {
    /// Create a new invalid input error builder for a field.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Build the error with the given reason.
    pub fn with_reason(self, reason: impl Into<String>) -> GatewayError {
        GatewayError::InvalidInput {
            field: self.field,
            reason: reason.into(),
        }
    }
}

impl GatewayError {
    /// Creates a builder for input validation errors.
    pub fn invalid_input(field: impl Into<String>) -> InvalidInputBuilder {
        InvalidInputBuilder::new(field)
    }

    /// Wraps a driver error raised by a statement, attaching the diagnosis
    /// for `operation`.
    pub fn statement(operation: OperationKind, source: &tokio_postgres::Error) -> Self {
        let message = driver_message(source);
        Self::Statement {
            operation,
            diagnosis: crate::diagnosis::classify(operation, &message),
            message,
        }
    }

    /// Creates an error for failures outside the driver.
    pub fn unknown(operation: OperationKind, message: impl Into<String>) -> Self {
        Self::Unknown {
            operation,
            message: message.into(),
        }
    }
}

/// Renders a driver error the way the server phrased it.
///
/// Server-side errors carry severity, message, detail and hint; everything
/// else (I/O, protocol, parameter conversion) uses the driver's own text.
pub(crate) fn driver_message(error: &tokio_postgres::Error) -> String {
    match error.as_db_error() {
        Some(db) => db.to_string(),
        None => error.to_string(),
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let error = GatewayError::invalid_input("condition")
            .with_reason("must not be empty");
        assert_eq!(
            error.to_string(),
            "Invalid input for field 'condition': must not be empty"
        );
    }

    #[test]
    fn test_connection_display_with_diagnosis() {
        let error = GatewayError::Connection {
            attempts: 3,
            cause: "Connection refused".to_string(),
            diagnosis: Some("check host".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Database connection failed after 3 attempt(s): Connection refused\nReason: check host"
        );
    }

    #[test]
    fn test_statement_display_appends_reason() {
        let error = GatewayError::Statement {
            operation: OperationKind::ExecuteQuery,
            message: "ERROR: relation \"foo\" does not exist".to_string(),
            diagnosis: Some(Diagnosis::MissingTable),
        };
        let text = error.to_string();
        assert!(text.starts_with("Failed to execute query: ERROR: relation"));
        assert!(text.ends_with("Reason: the queried table does not exist"));
    }

    #[test]
    fn test_unknown_display() {
        let error = GatewayError::unknown(OperationKind::ListSchemas, "boom");
        assert_eq!(error.to_string(), "Unexpected error while listing schemas: boom");
    }
}
