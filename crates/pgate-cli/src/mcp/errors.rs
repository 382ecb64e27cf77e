//! Error handling utilities for MCP server

use pgate_core::GatewayError;
use rmcp::{
    model::{CallToolResult, Content},
    ErrorData,
};
use serde::Serialize;

/// Body of a failed tool result.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: String,
    /// Statement the caller sent, echoed back by `execute_query` failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a str>,
}

impl<'a> ErrorBody<'a> {
    pub fn new(error: &GatewayError, query: Option<&'a str>) -> Self {
        Self {
            error: error.to_string(),
            query,
        }
    }
}

/// Converts a gateway error into a tool result flagged as an error,
/// echoing `query` when one is given.
pub fn tool_error(error: &GatewayError, query: Option<&str>) -> Result<CallToolResult, ErrorData> {
    let body = serde_json::to_string(&ErrorBody::new(error, query))
        .map_err(|e| to_mcp_error("Failed to serialize error", &e))?;
    Ok(CallToolResult::error(vec![Content::text(body)]))
}

/// Helper for failures of the MCP layer itself
pub fn to_mcp_error(message: &str, error: &dyn std::error::Error) -> ErrorData {
    ErrorData::internal_error(format!("{message}: {error}"), None)
}

#[cfg(test)]
mod tests {
    use pgate_core::{Diagnosis, OperationKind};
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn test_echoes_given_query() {
        let error = GatewayError::Statement {
            operation: OperationKind::ExecuteQuery,
            message: "ERROR: syntax error at or near \"SELEC\"".to_string(),
            diagnosis: Some(Diagnosis::SyntaxError),
        };
        let body = serde_json::to_value(ErrorBody::new(&error, Some("SELEC 1"))).unwrap();
        assert_eq!(body["query"], json!("SELEC 1"));
        assert!(body["error"]
            .as_str()
            .unwrap()
            .contains("Reason: the SQL statement has a syntax error"));
    }

    #[test]
    fn test_omits_query_when_none_given() {
        let error = GatewayError::invalid_input("condition").with_reason("must not be empty");
        let body = serde_json::to_value(ErrorBody::new(&error, None)).unwrap();
        assert_eq!(
            body,
            json!({"error": "Invalid input for field 'condition': must not be empty"})
        );
        assert_eq!(body.get("success"), None::<&Value>);
    }

    #[test]
    fn test_tool_error_is_flagged() {
        let error = GatewayError::unknown(OperationKind::ListSchemas, "boom");
        let result = tool_error(&error, None).unwrap();
        assert_eq!(result.is_error, Some(true));
    }
}
