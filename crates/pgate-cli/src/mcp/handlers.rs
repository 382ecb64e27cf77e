//! MCP tool handlers implementation

use std::sync::Arc;

use log::debug;
use pgate_core::{params as core, Gateway};
use rmcp::{
    handler::server::tool::Parameters,
    model::{CallToolResult, Content},
    ErrorData,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::errors::{to_mcp_error, tool_error};

// ============================================================================
// Generic Parameter Wrapper Implementation
// ============================================================================
//
// The wrapper puts any core parameter type in a transparent serde container
// so the tool signatures name MCP-facing types while the core keeps its own.
// #[serde(transparent)] passes deserialization straight through to the
// wrapped type and the JsonSchema impl forwards to it as well.

/// Generic MCP wrapper for core parameter types with serde integration
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

// Type aliases for cleaner usage in function signatures
pub type ExecuteQuery = McpParams<core::ExecuteQuery>;
pub type ListTables = McpParams<core::ListTables>;
pub type DescribeTable = McpParams<core::DescribeTable>;
pub type ListSchemas = McpParams<core::ListSchemas>;
pub type CreateTable = McpParams<core::CreateTable>;
pub type InsertData = McpParams<core::InsertData>;
pub type UpdateData = McpParams<core::UpdateData>;

pub type McpResult = Result<CallToolResult, ErrorData>;

/// Body of a successful tool result: the operation's fields plus
/// `"success": true`.
#[derive(Serialize)]
struct Success<'a, T: Serialize> {
    success: bool,
    #[serde(flatten)]
    body: &'a T,
}

/// Maps an operation outcome onto a tool result.
///
/// Gateway errors become error-flagged results rather than protocol errors,
/// so a failing statement never tears down the session. `echo` is the
/// caller's statement, returned with any failure of `execute_query`.
fn respond<T: Serialize>(outcome: pgate_core::Result<T>, echo: Option<&str>) -> McpResult {
    match outcome {
        Ok(body) => {
            let text = serde_json::to_string(&Success {
                success: true,
                body: &body,
            })
            .map_err(|e| to_mcp_error("Failed to serialize result", &e))?;
            Ok(CallToolResult::success(vec![Content::text(text)]))
        }
        Err(error) => {
            debug!("Tool call failed: {error}");
            tool_error(&error, echo)
        }
    }
}

/// Handler implementations for the MCP server
pub struct McpHandlers {
    gateway: Arc<Gateway>,
}

impl McpHandlers {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn execute_query(
        &self,
        Parameters(params): Parameters<ExecuteQuery>,
    ) -> McpResult {
        let params = params.as_ref();
        debug!(
            "execute_query: {} ({} params)",
            params.query,
            params.params.len()
        );
        respond(
            self.gateway.execute_query(params).await,
            Some(&params.query),
        )
    }

    pub async fn list_tables(&self, Parameters(params): Parameters<ListTables>) -> McpResult {
        let params = params.as_ref();
        debug!("list_tables: schema {}", params.schema_name);
        respond(self.gateway.list_tables(params).await, None)
    }

    pub async fn describe_table(
        &self,
        Parameters(params): Parameters<DescribeTable>,
    ) -> McpResult {
        let params = params.as_ref();
        debug!(
            "describe_table: {}.{}",
            params.schema_name, params.table_name
        );
        respond(self.gateway.describe_table(params).await, None)
    }

    pub async fn list_schemas(&self, Parameters(params): Parameters<ListSchemas>) -> McpResult {
        debug!("list_schemas");
        respond(self.gateway.list_schemas(params.as_ref()).await, None)
    }

    pub async fn create_table(&self, Parameters(params): Parameters<CreateTable>) -> McpResult {
        let params = params.as_ref();
        debug!(
            "create_table: {}.{} ({} columns)",
            params.schema_name,
            params.table_name,
            params.columns.len()
        );
        respond(self.gateway.create_table(params).await, None)
    }

    pub async fn insert_data(&self, Parameters(params): Parameters<InsertData>) -> McpResult {
        let params = params.as_ref();
        debug!("insert_data: {}.{}", params.schema_name, params.table_name);
        respond(self.gateway.insert_data(params).await, None)
    }

    pub async fn update_data(&self, Parameters(params): Parameters<UpdateData>) -> McpResult {
        let params = params.as_ref();
        debug!(
            "update_data: {}.{} where {}",
            params.schema_name, params.table_name, params.condition
        );
        respond(self.gateway.update_data(params).await, None)
    }
}
