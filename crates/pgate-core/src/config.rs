//! Connection configuration and its precedence chain.
//!
//! A [`Profile`] is assembled from four layers, lowest to highest:
//!
//! 1. built-in defaults ([`Profile::default`]),
//! 2. `POSTGRES_*` environment variables ([`Profile::from_env`]),
//! 3. the process-wide override given on the command line,
//! 4. the per-call override supplied by the caller (`db_config`).
//!
//! Layers 3 and 4 are [`ProfileOverrides`], merged key by key with
//! [`resolve`]. The retry count lives in [`RetryPolicy`] and never reaches
//! the driver.

use std::{env, fmt, time::Duration};

use log::warn;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_PASSWORD: &str = "postgres";
pub const DEFAULT_DATABASE: &str = "postgres";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_RETRY_COUNT: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Parameters handed to the driver's connect call.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub connect_timeout: Duration,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// How many times, and how patiently, a connection is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt count and the default delay.
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts,
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Sets the pause between failed attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of attempts actually made; a zero count still tries once.
    pub fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECT_RETRY_COUNT)
    }
}

/// A fully populated connection profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub connection: ConnectionParams,
    pub retry: RetryPolicy,
}

impl Profile {
    /// Built-in defaults overlaid with the `POSTGRES_*` environment
    /// variables.
    ///
    /// Meant to be called once at startup; the result is passed around as
    /// an immutable value.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Profile::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides = ProfileOverrides {
            host: lookup("POSTGRES_HOST"),
            port: parse_var(&lookup, "POSTGRES_PORT"),
            user: lookup("POSTGRES_USER"),
            password: lookup("POSTGRES_PASSWORD"),
            database: lookup("POSTGRES_DATABASE"),
            connect_timeout: parse_var(&lookup, "POSTGRES_CONNECTION_TIMEOUT"),
            connect_retry_count: parse_var(&lookup, "POSTGRES_CONNECT_RETRY_COUNT"),
        };
        Self::default().overlay(&overrides)
    }

    /// Returns a copy with every key present in `overrides` replaced.
    pub fn overlay(mut self, overrides: &ProfileOverrides) -> Self {
        let connection = &mut self.connection;
        if let Some(host) = &overrides.host {
            connection.host.clone_from(host);
        }
        if let Some(port) = overrides.port {
            connection.port = port;
        }
        if let Some(user) = &overrides.user {
            connection.user.clone_from(user);
        }
        if let Some(password) = &overrides.password {
            connection.password.clone_from(password);
        }
        if let Some(database) = &overrides.database {
            connection.database.clone_from(database);
        }
        if let Some(secs) = overrides.connect_timeout {
            connection.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(count) = overrides.connect_retry_count {
            self.retry.attempts = count;
        }
        self
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}

/// Partial connection settings; absent keys leave the lower layer intact.
///
/// This is the shape of the `db_config` argument every operation accepts
/// and of the command-line override.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ProfileOverrides {
    /// Database server host name or address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Database server port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// User name to connect as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Password for the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Name of the database to connect to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Connection establishment timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<u64>,
    /// Number of connection attempts before giving up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_retry_count: Option<u32>,
}

impl fmt::Debug for ProfileOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileOverrides")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .field("connect_retry_count", &self.connect_retry_count)
            .finish()
    }
}

/// Resolves the effective profile for one call.
pub fn resolve(
    defaults: Profile,
    process: Option<&ProfileOverrides>,
    call: Option<&ProfileOverrides>,
) -> Profile {
    [process, call]
        .into_iter()
        .flatten()
        .fold(defaults, Profile::overlay)
}
