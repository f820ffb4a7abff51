use std::process::Command;

#[test]
fn cli_smoke_help() {
    let exe = env!("CARGO_BIN_EXE_todos");
    let output = Command::new(exe)
        .arg("--help")
        .output()
        .expect("failed to run todos --help");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("toggle-all"));
}

#[test]
fn cli_rejects_unknown_subcommand() {
    let exe = env!("CARGO_BIN_EXE_todos");
    let output = Command::new(exe)
        .arg("frobnicate")
        .output()
        .expect("failed to run todos");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn cli_rejects_missing_user() {
    let exe = env!("CARGO_BIN_EXE_todos");
    let output = Command::new(exe)
        .args(["list", "--config-override", "user_id=0"])
        .env("TODOS_CONFIG_PATH", std::env::temp_dir().join("todos-missing-config.json"))
        .env_remove("TODOS_BASE_URL")
        .env_remove("TODOS_USER_ID")
        .output()
        .expect("failed to run todos list");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no user configured"));
}
