use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn reel_rank_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_reel-rank"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/movies.sqlite"

[server]
bind = "127.0.0.1:0"
"#,
        root.display()
    );

    let config_path = config_dir.join("reel-rank.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_reel_rank(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = reel_rank_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run reel-rank binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_reel_rank(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/movies.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_reel_rank(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_reel_rank(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_list_empty_collection() {
    let (_tmp, config_path) = setup_test_env();

    run_reel_rank(&config_path, &["init"]);
    let (stdout, stderr, success) = run_reel_rank(&config_path, &["list"]);
    assert!(success, "list failed: stderr={}", stderr);
    assert!(stdout.contains("No movies."));
}

#[test]
fn test_missing_config_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.toml");

    let (_, stderr, success) = run_reel_rank(&missing, &["list"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_invalid_config_rejected() {
    let (tmp, _) = setup_test_env();
    let config_path = tmp.path().join("bad.toml");
    fs::write(
        &config_path,
        r#"[db]
path = "movies.sqlite"

[server]
bind = "127.0.0.1:0"

[tmdb]
base_url = "api.themoviedb.org/3"
"#,
    )
    .unwrap();

    let (_, stderr, success) = run_reel_rank(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("tmdb.base_url"));
}
