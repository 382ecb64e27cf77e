use std::{
    env,
    sync::atomic::{AtomicU32, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use pgate_core::{Gateway, GatewayBuilder, Profile, ProfileOverrides};

/// Environment variable naming the database the live tests run against.
pub const TEST_DATABASE_VAR: &str = "PGATE_TEST_DATABASE";

/// Gateway for the live tests, or `None` when no test database is set.
///
/// Host, port and credentials come from the usual `POSTGRES_*` variables.
pub fn test_gateway() -> Option<Gateway> {
    let database = env::var(TEST_DATABASE_VAR).ok()?;
    Some(
        GatewayBuilder::new()
            .with_defaults(Profile::from_env())
            .with_overrides(ProfileOverrides {
                database: Some(database),
                connect_retry_count: Some(1),
                ..ProfileOverrides::default()
            })
            .build(),
    )
}

/// A table name no other test run uses.
pub fn unique_table(prefix: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    format!(
        "{prefix}_{}_{nanos}_{}",
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}
