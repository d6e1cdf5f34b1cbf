//! Integration tests that run the CLI binary.

use std::path::Path;

fn bin() -> std::process::Command {
    // CARGO_BIN_EXE_<name> uses the binary target name; hyphens require concat! for env!()
    let bin = env!(concat!("CARGO_BIN_EXE_bedrock", "-", "blocks"));
    let mut cmd = std::process::Command::new(bin);
    for key in [
        "BEDROCK_BLOCKS_DIR",
        "BEDROCK_REGION",
        "BEDROCK_VENDORS",
        "BEDROCK_AWS_CLI",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

fn yaml_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .expect("blocks dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "yaml"))
        .count()
}

fn sync_offline(dir: &Path, cwd: &Path) -> std::process::Output {
    bin()
        .args(["sync", "--offline", "--no-commit", "--blocks-dir"])
        .arg(dir)
        .current_dir(cwd)
        .output()
        .expect("binary not found - run cargo build first")
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let output = bin()
        .arg("--help")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sync"), "expected usage text in output");
    assert!(stdout.contains("BEDROCK_BLOCKS_DIR"));
}

#[test]
fn cli_version_succeeds() {
    let output = bin()
        .arg("--version")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("bedrock-blocks"));
}

#[test]
fn offline_sync_creates_twelve_blocks_then_is_idempotent() {
    // Run from temp dir so dotenv() won't load .env from project root
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let dir = tmp.path().join("blocks");

    let first = sync_offline(&dir, tmp.path());
    assert!(
        first.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&first.stderr)
    );
    assert_eq!(yaml_count(&dir), 12);
    let manifest = std::fs::read_to_string(dir.join("manifest.json")).expect("manifest");
    assert!(manifest.contains("\"version\": \"1.0.0\""));
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("Written:   12"), "stdout: {}", stdout);
    assert!(stdout.contains("Committed: no"));

    let second = sync_offline(&dir, tmp.path());
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("Written:   0"), "stdout: {}", stdout);
    assert_eq!(
        std::fs::read_to_string(dir.join("manifest.json")).expect("manifest"),
        manifest
    );
}

#[test]
fn check_passes_on_synced_blocks_and_fails_on_broken_ones() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let dir = tmp.path().join("blocks");
    assert!(sync_offline(&dir, tmp.path()).status.success());

    let ok = bin()
        .args(["check", "--blocks-dir"])
        .arg(&dir)
        .current_dir(tmp.path())
        .output()
        .expect("binary not found - run cargo build first");
    assert!(
        ok.status.success(),
        "stdout: {}",
        String::from_utf8_lossy(&ok.stdout)
    );
    assert!(String::from_utf8_lossy(&ok.stdout).contains("12 block(s) OK"));

    std::fs::write(dir.join("zz-broken.yaml"), "name: Broken\n").expect("write");
    let bad = bin()
        .args(["check", "--blocks-dir"])
        .arg(&dir)
        .current_dir(tmp.path())
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!bad.status.success());
    assert!(String::from_utf8_lossy(&bad.stdout).contains("missing required key 'version'"));
}

#[test]
fn sync_outside_git_without_no_commit_exits_with_error() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let git_check = std::process::Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(tmp.path())
        .output();
    if matches!(&git_check, Ok(o) if o.status.success()) {
        // Temp dir lives inside a repository on this machine.
        return;
    }

    let dir = tmp.path().join("blocks");
    let output = bin()
        .args(["sync", "--offline", "--blocks-dir"])
        .arg(&dir)
        .current_dir(tmp.path())
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not inside a git work tree"));
    assert!(!dir.exists());
}

#[test]
fn empty_vendor_list_is_a_config_error() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin()
        .arg("config")
        .env("BEDROCK_VENDORS", ",")
        .current_dir(tmp.path())
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("BEDROCK_VENDORS"));
}

#[test]
fn offline_catalog_lists_the_builtin_table() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin()
        .args(["catalog", "--offline", "--query", "opus"])
        .current_dir(tmp.path())
        .output()
        .expect("binary not found - run cargo build first");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("anthropic-claude-3-opus-20240229-v1-0-200k"));
    assert!(stdout.contains("200k"));
    assert!(!stdout.contains("llama"));
    assert!(stdout.contains("from fallback table"));
}

#[test]
fn check_on_missing_directory_exits_with_error() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin()
        .args(["check", "--blocks-dir"])
        .arg(tmp.path().join("nowhere"))
        .current_dir(tmp.path())
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("OK"));
}
