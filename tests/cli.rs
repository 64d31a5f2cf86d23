use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn run(data_dir: &TempDir, args: &[&str]) -> Output {
    let db_path = data_dir.path().join("cli.db");
    Command::new(env!("CARGO_BIN_EXE_litepolis-db"))
        .env("DOTENV_PATH", data_dir.path().join("missing.env"))
        .env_remove("LITEPOLIS_DATABASE_URL")
        .env_remove("LITEPOLIS_LOG_FILE")
        .arg("--database-url")
        .arg(database_url(&db_path))
        .args(args)
        .output()
        .expect("spawn litepolis-db")
}

fn database_url(path: &Path) -> String {
    // absolute path: scheme, empty authority, then the path itself
    format!("sqlite:///{}", path.display())
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json on stdout")
}

#[test]
fn init_then_stats_on_fresh_database() {
    let dir = TempDir::new().unwrap();
    assert!(run(&dir, &["init"]).status.success());
    assert!(dir.path().join("cli.db").exists());

    let stats = stdout_json(&run(&dir, &["stats"]));
    assert_eq!(stats["users"], 0);
    assert_eq!(stats["conversations"], 0);
}

#[test]
fn create_user_then_list() {
    let dir = TempDir::new().unwrap();
    let created = stdout_json(&run(
        &dir,
        &["create-user", "--username", "alice", "--hashed-password", "x1"],
    ));
    assert_eq!(created["username"], "alice");

    let duplicate = run(
        &dir,
        &["create-user", "--username", "alice", "--hashed-password", "x2"],
    );
    assert!(!duplicate.status.success());

    let users = stdout_json(&run(&dir, &["users", "--page", "1", "--page-size", "5"]));
    assert_eq!(users.as_array().map(Vec::len), Some(1));

    let stats = stdout_json(&run(&dir, &["--reset", "stats"]));
    assert_eq!(stats["users"], 0);
}

#[test]
fn rejects_unsupported_database_url() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_litepolis-db"))
        .env("DOTENV_PATH", dir.path().join("missing.env"))
        .args(["--database-url", "postgres://localhost/db", "stats"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
