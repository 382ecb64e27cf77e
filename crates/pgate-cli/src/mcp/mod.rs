//! MCP server implementation for pgate
//!
//! This module exposes the gateway operations as Model Context Protocol
//! tools over stdio. Every tool returns its result as JSON text; failures
//! come back as error-flagged tool results carrying `{error, query?}`.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use log::{debug, error, info};
use pgate_core::Gateway;
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use tokio::signal::unix::{signal, SignalKind};

pub mod errors;
pub mod handlers;

pub use handlers::{
    CreateTable, DescribeTable, ExecuteQuery, InsertData, ListSchemas, ListTables, McpResult,
    UpdateData,
};

/// MCP server for pgate
#[derive(Clone)]
pub struct PgateMcpServer {
    gateway: Arc<Gateway>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PgateMcpServer {
    /// Create a new pgate MCP server
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway: Arc::new(gateway),
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> handlers::McpHandlers {
        handlers::McpHandlers::new(self.gateway.clone())
    }

    #[tool(
        name = "execute_query",
        description = "Execute a SQL statement. Reference parameters as $1, $2, ... and pass their values in `params`. SELECT, SHOW, DESCRIBE and EXPLAIN return {rows, row_count}; any other statement runs in a committed transaction and returns {affected_rows}. On failure the error includes a likely reason and echoes the query."
    )]
    async fn execute_query(&self, params: Parameters<ExecuteQuery>) -> McpResult {
        self.handlers().execute_query(params).await
    }

    #[tool(
        name = "list_tables",
        description = "List the tables of a schema (default \"public\"), sorted by name. Returns {schema, tables, count}."
    )]
    async fn list_tables(&self, params: Parameters<ListTables>) -> McpResult {
        self.handlers().list_tables(params).await
    }

    #[tool(
        name = "describe_table",
        description = "Describe a table: its columns in order (column_name, data_type, character_maximum_length, column_default, is_nullable) and its primary key columns. Fails with a reason if the table or schema does not exist."
    )]
    async fn describe_table(&self, params: Parameters<DescribeTable>) -> McpResult {
        self.handlers().describe_table(params).await
    }

    #[tool(
        name = "list_schemas",
        description = "List the user schemas of the database, excluding pg_* system schemas and information_schema. Returns {schemas, count}."
    )]
    async fn list_schemas(&self, params: Parameters<ListSchemas>) -> McpResult {
        self.handlers().list_schemas(params).await
    }

    #[tool(
        name = "create_table",
        description = "Create a table from column definitions. Each column needs a name and a SQL type; optional fields are nullable (false adds NOT NULL), default (a SQL expression such as \"now()\" or \"'pending'\", or a number/boolean) and primary_key (flagged columns form one composite key). if_not_exists defaults to true."
    )]
    async fn create_table(&self, params: Parameters<CreateTable>) -> McpResult {
        self.handlers().create_table(params).await
    }

    #[tool(
        name = "insert_data",
        description = "Insert one record (an object) or several (an array of objects) in a single statement. The keys of the first record are the column list; keys missing from later records are inserted as NULL. Returns {affected_rows, message}."
    )]
    async fn insert_data(&self, params: Parameters<InsertData>) -> McpResult {
        self.handlers().insert_data(params).await
    }

    #[tool(
        name = "update_data",
        description = "Update rows matching a WHERE condition, which is required. `data` maps columns to new values. Placeholders in the condition are numbered from $1 and refer to `params`, e.g. condition \"id = $1\" with params [42]. Returns {affected_rows, message}."
    )]
    async fn update_data(&self, params: Parameters<UpdateData>) -> McpResult {
        self.handlers().update_data(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for PgateMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "pgate".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"pgate gives access to a PostgreSQL database.

## Tools
- **Inspection**: list_schemas, list_tables, describe_table
- **Queries**: execute_query runs any statement with bound $n parameters
- **Changes**: create_table, insert_data, update_data

## Connection
Every tool accepts an optional `db_config` object with any of host, port, user, password, database, connect_timeout (seconds) and connect_retry_count. Keys given there override the server's configuration for that call only.

## Results
Successful calls return JSON with "success": true. Failed calls return {"error": ...}, with a "Reason:" line when the cause is recognized and the failing statement in "query" where one was run."#.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: PgateMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting pgate MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    // Set up signal handlers for graceful shutdown
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}
