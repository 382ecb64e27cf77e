use clap::{Args as ClapArgs, Parser, Subcommand};
use pgate_core::ProfileOverrides;

use crate::cli::{DescribeArgs, QueryArgs, TablesArgs};

/// PostgreSQL gateway for tool-calling clients
///
/// pgate exposes a PostgreSQL database as a set of MCP tools (run queries,
/// inspect tables and schemas, create tables, insert and update rows) over
/// stdio. The read-only operations can also be run directly from a shell.
///
/// Connection defaults come from the POSTGRES_HOST, POSTGRES_PORT,
/// POSTGRES_USER, POSTGRES_PASSWORD, POSTGRES_DATABASE,
/// POSTGRES_CONNECTION_TIMEOUT and POSTGRES_CONNECT_RETRY_COUNT environment
/// variables; the flags below take precedence over them.
#[derive(Parser)]
#[command(version, about, name = "pgate")]
pub struct Args {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Process-wide connection settings
#[derive(ClapArgs, Debug, Default)]
pub struct ConnectionArgs {
    /// Database server host
    #[arg(long, global = true)]
    pub host: Option<String>,
    /// Database server port
    #[arg(long, global = true)]
    pub port: Option<u16>,
    /// User to connect as
    #[arg(long, global = true)]
    pub user: Option<String>,
    /// Password for the user
    #[arg(long, global = true)]
    pub password: Option<String>,
    /// Database to connect to
    #[arg(long, global = true)]
    pub database: Option<String>,
    /// Connection timeout in seconds
    #[arg(long, global = true, alias = "connection-timeout", value_name = "SECS")]
    pub connect_timeout: Option<u64>,
    /// Number of connection attempts before giving up
    #[arg(long, global = true, value_name = "N")]
    pub connect_retry_count: Option<u32>,
}

impl From<ConnectionArgs> for ProfileOverrides {
    fn from(val: ConnectionArgs) -> Self {
        ProfileOverrides {
            host: val.host,
            port: val.port,
            user: val.user,
            password: val.password,
            database: val.database,
            connect_timeout: val.connect_timeout,
            connect_retry_count: val.connect_retry_count,
        }
    }
}

/// Available commands
///
/// Without a command, pgate starts the MCP server.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP server on stdio (default)
    Serve,
    /// Run a SQL statement
    #[command(alias = "q")]
    Query(QueryArgs),
    /// List the tables of a schema
    #[command(aliases = ["t", "ls"])]
    Tables(TablesArgs),
    /// Show the columns and primary key of a table
    #[command(alias = "d")]
    Describe(DescribeArgs),
    /// List user schemas
    Schemas,
}
