//! PostgreSQL access: connection lifecycle, statement execution and value
//! conversion.
//!
//! Every operation opens its own [`Connection`] through
//! [`connect::acquire`] and drops it before returning. There is no pool and
//! nothing is shared between calls.

use log::{debug, error};
use tokio_postgres::{tls::NoTlsStream, Client, Socket};

pub mod connect;
pub mod executor;
pub mod value;

pub use connect::acquire;
pub use executor::{execute, StatementKind, StatementResult};

/// A live session owned by a single call.
///
/// The driver splits a session into a [`Client`] and a background task that
/// drives the socket. The task runs until its client is gone, so dropping
/// the `Connection` terminates the session on every exit path of the call.
pub struct Connection {
    client: Client,
}

impl Connection {
    /// Spawns the socket task for a freshly opened session.
    pub(crate) fn spawn(
        client: Client,
        connection: tokio_postgres::Connection<Socket, NoTlsStream>,
    ) -> Self {
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {e}");
            }
            debug!("Database connection closed");
        });
        Self { client }
    }

    /// Client for issuing statements on this session.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Mutable client, needed to open transactions.
    pub fn client_mut(&mut self) -> &mut Client {
        &mut self.client
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Releasing database connection");
    }
}
