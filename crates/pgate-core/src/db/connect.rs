//! Connection acquisition with bounded retries.

use std::future::Future;

use log::{debug, warn};
use tokio_postgres::{Config, NoTls};

use super::Connection;
use crate::{
    config::{ConnectionParams, Profile, RetryPolicy},
    diagnosis::diagnose_connection,
    error::{driver_message, GatewayError, Result},
};

/// Opens a connection under `profile`, retrying per its retry policy.
///
/// # Errors
///
/// Returns `GatewayError::Connection` once every attempt has failed.
pub async fn acquire(profile: &Profile) -> Result<Connection> {
    acquire_with(&profile.connection, &profile.retry, |params| {
        let config = driver_config(params);
        async move {
            let (client, connection) = config.connect(NoTls).await?;
            Ok::<_, tokio_postgres::Error>(Connection::spawn(client, connection))
        }
    })
    .await
}

/// Retry loop shared by [`acquire`] and anything that needs a different
/// connect function.
///
/// `connect` is called at most `policy.max_attempts()` times; the first
/// success is returned as is. Between failures the loop sleeps for
/// `policy.delay`.
pub async fn acquire_with<C, E, F, Fut>(
    params: &ConnectionParams,
    policy: &RetryPolicy,
    mut connect: F,
) -> Result<C>
where
    E: ConnectError,
    F: FnMut(&ConnectionParams) -> Fut,
    Fut: Future<Output = std::result::Result<C, E>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempts = 0;
    let mut last_error = String::new();

    while attempts < max_attempts {
        attempts += 1;
        match connect(params).await {
            Ok(connection) => {
                debug!(
                    "Connected to {}:{}/{} on attempt {attempts}",
                    params.host, params.port, params.database
                );
                return Ok(connection);
            }
            Err(e) => {
                last_error = e.message();
                if attempts < max_attempts {
                    warn!(
                        "Connection attempt {attempts}/{max_attempts} failed, retrying: {last_error}"
                    );
                    if !policy.delay.is_zero() {
                        tokio::time::sleep(policy.delay).await;
                    }
                }
            }
        }
    }

    Err(GatewayError::Connection {
        attempts,
        diagnosis: diagnose_connection(&last_error, params),
        cause: last_error,
    })
}

/// Text of a failed connect call, as matched by the connection diagnosis.
pub trait ConnectError {
    fn message(&self) -> String;
}

impl ConnectError for tokio_postgres::Error {
    fn message(&self) -> String {
        driver_message(self)
    }
}

impl ConnectError for String {
    fn message(&self) -> String {
        self.clone()
    }
}

impl ConnectError for &str {
    fn message(&self) -> String {
        (*self).to_string()
    }
}

fn driver_config(params: &ConnectionParams) -> Config {
    let mut config = Config::new();
    config
        .host(&params.host)
        .port(params.port)
        .user(&params.user)
        .password(&params.password)
        .dbname(&params.database)
        .application_name(env!("CARGO_PKG_NAME"));
    if !params.connect_timeout.is_zero() {
        config.connect_timeout(params.connect_timeout);
    }
    config
}
