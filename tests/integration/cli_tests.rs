//! Integration tests for the CLI binary.
//!
//! Runs the `ocq` binary against temp directories. Nothing here touches the
//! network.
//!
//! This test is registered as a [[test]] in the ocean-acquire-cli crate
//! so that CARGO_BIN_EXE_ocq is available.

use std::path::Path;
use std::process::{Command, Output};

/// Get a Command pointing to the `ocq` binary, isolated from the caller's
/// environment.
fn ocq_binary(workdir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ocq"));
    cmd.current_dir(workdir)
        .env_remove("WALLET_KEYSTORE_PATH")
        .env_remove("ACQUIRE_OUTPUT_DIR")
        .env_remove("ACQUIRE_RECORDS_PATH")
        .env_remove("WALLET_PASSWORD");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn cli_responds_to_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = ocq_binary(dir.path())
        .arg("--help")
        .output()
        .expect("failed to execute ocq --help");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Usage"), "got: {out}");
    assert!(out.contains("acquire-all"), "got: {out}");
}

#[test]
fn cli_responds_to_version() {
    let dir = tempfile::tempdir().unwrap();
    let output = ocq_binary(dir.path())
        .arg("--version")
        .output()
        .expect("failed to execute ocq --version");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("ocq") && out.contains("0.1"), "got: {out}");
}

#[test]
fn cli_exits_with_error_on_unknown_flag() {
    let dir = tempfile::tempdir().unwrap();
    let output = ocq_binary(dir.path())
        .arg("--nonexistent-flag")
        .output()
        .expect("failed to execute ocq");

    assert!(!output.status.success());
}

#[test]
fn cli_lists_default_assets() {
    let dir = tempfile::tempdir().unwrap();
    let output = ocq_binary(dir.path()).arg("assets").output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("enron"));
    assert!(out.contains("cameroon"));
    assert!(out.contains("0.1 OCEAN"));
    assert!(out.contains("0.05 OCEAN"));
}

#[test]
fn cli_records_empty_log() {
    let dir = tempfile::tempdir().unwrap();
    let output = ocq_binary(dir.path()).arg("records").output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No purchase records"));

    let output = ocq_binary(dir.path())
        .args(["records", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "[]");
}

#[test]
fn cli_summarizes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("enron_full_dataset.csv");
    std::fs::write(&file, "from,to\na,b\nc,d\n").unwrap();

    let output = ocq_binary(dir.path())
        .arg("summarize")
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Lines:  3"), "got: {out}");
    assert!(out.contains("Header: from,to"), "got: {out}");
}

#[test]
fn cli_acquire_without_wallet_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = ocq_binary(dir.path())
        .args(["acquire", "enron"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("no credentials"), "stderr: {}", stderr(&output));
}

#[test]
fn cli_init_then_wallet() {
    let dir = tempfile::tempdir().unwrap();
    let output = ocq_binary(dir.path())
        .args(["--keystore", "wallet.json", "init"])
        .env("WALLET_PASSWORD", "test-passphrase")
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("wallet.json").exists());

    let output = ocq_binary(dir.path())
        .args(["--keystore", "wallet.json", "wallet"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Sealed:  yes"), "got: {out}");
    assert!(out.contains("10.5 OCEAN"), "got: {out}");

    let output = ocq_binary(dir.path())
        .args(["--keystore", "wallet.json", "init"])
        .env("WALLET_PASSWORD", "test-passphrase")
        .output()
        .unwrap();
    assert!(!output.status.success(), "init must not overwrite");
}

#[test]
fn cli_acquires_from_local_mirror() {
    let dir = tempfile::tempdir().unwrap();
    let mirror = dir.path().join("enron.csv");
    std::fs::write(&mirror, "from,to\na,b\n").unwrap();
    std::fs::write(
        dir.path().join("wallet.json"),
        r#"{"address": "abc", "id": "k1", "version": 3}"#,
    )
    .unwrap();
    let config = serde_json::json!({
        "output_dir": dir.path().join("out"),
        "records_path": dir.path().join("out/purchase_records.json"),
        "keystore_path": dir.path().join("wallet.json"),
        "assets": [{
            "key": "enron",
            "did": "did:op:test",
            "name": "Enron Email Dataset",
            "format": "csv",
            "locator": format!("file://{}", mirror.display()),
            "price": "0.1 OCEAN"
        }]
    });
    let config_path = dir.path().join("acquire.json");
    std::fs::write(&config_path, config.to_string()).unwrap();

    let output = ocq_binary(dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["acquire", "enron"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(dir.path().join("out/enron_full_dataset.csv").exists());

    let output = ocq_binary(dir.path())
        .arg("--config")
        .arg(&config_path)
        .args(["records", "--json"])
        .output()
        .unwrap();
    let records: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(records[0]["dataset"], "enron");
    assert_eq!(records[0]["status"], "completed");
    assert_eq!(records[0]["wallet_address"], "0xabc");
}
