//! Core library for pgate, a PostgreSQL gateway for tool-calling clients.
//!
//! This crate provides the connection handling, statement execution, error
//! diagnosis and the seven gateway operations. Interfaces (the MCP server
//! and the terminal commands in `pgate-cli`) only translate arguments into
//! [`params`] structures and render the returned [`models`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pgate_core::{params::ExecuteQuery, GatewayBuilder, Profile};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = GatewayBuilder::new()
//!     .with_defaults(Profile::from_env())
//!     .build();
//!
//! let outcome = gateway
//!     .execute_query(&ExecuteQuery {
//!         query: "SELECT $1::int + 1 AS answer".to_string(),
//!         params: vec![41.into()],
//!         db_config: None,
//!     })
//!     .await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod diagnosis;
pub mod display;
pub mod error;
pub mod gateway;
pub mod models;
pub mod params;
pub mod sql;

// Re-export commonly used types
pub use config::{Profile, ProfileOverrides};
pub use diagnosis::{Diagnosis, OperationKind};
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayBuilder};
pub use models::{
    ColumnInfo, Confirmation, QueryOutcome, RowsChanged, SchemaList, TableDescription, TableList,
};
