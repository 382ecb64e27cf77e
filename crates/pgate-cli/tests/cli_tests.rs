use assert_cmd::Command;
use predicates::prelude::*;

const POSTGRES_VARS: [&str; 7] = [
    "POSTGRES_HOST",
    "POSTGRES_PORT",
    "POSTGRES_USER",
    "POSTGRES_PASSWORD",
    "POSTGRES_DATABASE",
    "POSTGRES_CONNECTION_TIMEOUT",
    "POSTGRES_CONNECT_RETRY_COUNT",
];

/// Helper function to create a Command with --no-color and a clean
/// environment
fn pgate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("pgate").expect("Failed to find pgate binary");
    for var in POSTGRES_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--no-color");
    cmd
}

#[test]
fn test_cli_help_lists_commands() {
    pgate_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("schemas"))
        .stdout(predicate::str::contains("--connect-retry-count"));
}

#[test]
fn test_cli_version() {
    pgate_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_rejects_empty_query_without_connecting() {
    pgate_cmd()
        .args(["--host", "127.0.0.1", "--port", "1", "query", "  "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid input for field 'query'"))
        .stderr(predicate::str::contains("connection failed").not());
}

#[test]
fn test_cli_reports_unreachable_server() {
    pgate_cmd()
        .args([
            "--host",
            "127.0.0.1",
            "--port",
            "1",
            "--connect-retry-count",
            "1",
            "--connect-timeout",
            "2",
            "tables",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Database connection failed after 1 attempt(s)",
        ))
        .stderr(predicate::str::contains("Reason:"))
        .stderr(predicate::str::contains("port 1"));
}

#[test]
fn test_cli_rejects_invalid_port() {
    pgate_cmd()
        .args(["--port", "not-a-port", "schemas"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--port"));
}

#[test]
fn test_cli_describe_requires_table() {
    pgate_cmd()
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TABLE>"));
}
