//! pgate: expose a PostgreSQL database as MCP tools.
//!
//! Without a subcommand the binary serves MCP over stdio; the terminal
//! subcommands run one read operation and print markdown.

mod args;
mod cli;
mod mcp;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{run_stdio_server, PgateMcpServer};
use pgate_core::{GatewayBuilder, Profile};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        connection,
        no_color,
        command,
    } = Args::parse();

    let gateway = GatewayBuilder::new()
        .with_defaults(Profile::from_env())
        .with_overrides(connection.into())
        .build();

    let renderer = TerminalRenderer::new(!no_color);

    match command.unwrap_or(Serve) {
        Serve => {
            info!("Starting pgate MCP server");
            run_stdio_server(PgateMcpServer::new(gateway))
                .await
                .context("MCP server failed")
        }
        Query(args) => Cli::new(gateway, renderer).query(args).await,
        Tables(args) => Cli::new(gateway, renderer).tables(args).await,
        Describe(args) => Cli::new(gateway, renderer).describe(args).await,
        Schemas => Cli::new(gateway, renderer).schemas().await,
    }
}
