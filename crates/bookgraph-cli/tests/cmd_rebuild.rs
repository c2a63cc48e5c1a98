//! Integration tests for `bookgraph rebuild` and the on-disk cache.
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path to the compiled `bookgraph` binary.
fn bookgraph_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("bookgraph");
    path
}

fn bookgraph() -> Command {
    let mut cmd = Command::new(bookgraph_bin());
    cmd.env_remove("BOOKGRAPH_CACHE_DIR")
        .env_remove("BOOKGRAPH_MAX_FILE_SIZE")
        .env_remove("RUST_LOG");
    cmd
}

/// Path to a shared fixture file.
fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

/// Runs `bookgraph <subcommand> <fixture>` against the cache in `cache`.
fn cached(cache: &Path, subcommand: &str, name: &str) -> Output {
    bookgraph()
        .args([
            subcommand,
            "--cache-dir",
            cache.to_str().expect("cache path"),
            fixture(name).to_str().expect("path"),
        ])
        .output()
        .expect("run bookgraph")
}

// ---------------------------------------------------------------------------
// rebuild: output
// ---------------------------------------------------------------------------

#[test]
fn rebuild_reports_counts_and_rejected_roots() {
    let out = bookgraph()
        .args(["rebuild", fixture("cycle.json").to_str().expect("path")])
        .output()
        .expect("run bookgraph rebuild");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "rebuilt 1 trees, 1 indexed nodes, 1 rejected roots\nrejected a: cycle through b\n"
    );
}

#[test]
fn rebuild_json_summary() {
    let out = bookgraph()
        .args([
            "rebuild",
            "-f",
            "json",
            fixture("books.json").to_str().expect("path"),
        ])
        .output()
        .expect("run bookgraph rebuild -f json");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid JSON");
    assert_eq!(
        value,
        serde_json::json!({"trees": 2, "indexed_nodes": 4, "rejected": []})
    );
}

#[test]
fn rejected_root_is_logged_as_warning() {
    let out = bookgraph()
        .args(["trees", fixture("cycle.json").to_str().expect("path")])
        .output()
        .expect("run bookgraph trees");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("WARN"), "stderr: {stderr}");
    assert!(stderr.contains("cycle detected"), "stderr: {stderr}");
}

#[test]
fn quiet_suppresses_warnings() {
    let out = bookgraph()
        .args(["-q", "trees", fixture("cycle.json").to_str().expect("path")])
        .output()
        .expect("run bookgraph -q trees");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    assert!(out.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

// ---------------------------------------------------------------------------
// cache directory
// ---------------------------------------------------------------------------

#[test]
fn cached_build_is_written_to_cache_dir() {
    let cache = tempfile::tempdir().expect("tempdir");
    let out = cached(cache.path(), "trees", "books.json");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());

    let stored = std::fs::read(cache.path().join("bookgraph_latest.json")).expect("cache file");
    let value: serde_json::Value = serde_json::from_slice(&stored).expect("valid JSON");
    assert_eq!(value["roots"]["page 2"], serde_json::json!(["book 1", "book 2"]));
}

#[test]
fn warm_cache_is_served_until_rebuild() {
    let cache = tempfile::tempdir().expect("tempdir");
    assert!(cached(cache.path(), "trees", "books.json").status.success());

    let warm = cached(cache.path(), "trees", "numeric.json");
    assert!(warm.status.success(), "exit code: {:?}", warm.status.code());
    assert!(
        String::from_utf8_lossy(&warm.stdout).starts_with("book 1\n"),
        "cached forest should be served: {}",
        String::from_utf8_lossy(&warm.stdout)
    );

    assert!(cached(cache.path(), "rebuild", "numeric.json").status.success());
    let fresh = cached(cache.path(), "trees", "books.json");
    assert_eq!(String::from_utf8_lossy(&fresh.stdout), "1\n  2\n    3\n  4\n");
}

#[test]
fn corrupt_cache_entry_is_rebuilt() {
    let cache = tempfile::tempdir().expect("tempdir");
    std::fs::write(cache.path().join("bookgraph_latest.json"), "{\"trees\":").expect("seed");

    let out = cached(cache.path(), "roots", "books.json");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    assert!(String::from_utf8_lossy(&out.stdout).contains("page 2: book 1, book 2"));

    let stored = std::fs::read(cache.path().join("bookgraph_latest.json")).expect("cache file");
    serde_json::from_slice::<serde_json::Value>(&stored).expect("repaired entry is JSON");
}

#[test]
fn cache_dir_from_env() {
    let cache = tempfile::tempdir().expect("tempdir");
    let out = bookgraph()
        .env("BOOKGRAPH_CACHE_DIR", cache.path())
        .args(["trees", fixture("books.json").to_str().expect("path")])
        .output()
        .expect("run bookgraph trees");
    assert!(out.status.success(), "exit code: {:?}", out.status.code());
    assert!(cache.path().join("bookgraph_latest.json").is_file());
}

#[test]
fn unusable_cache_dir_exits_2() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let out = bookgraph()
        .args([
            "trees",
            "--cache-dir",
            file.path().to_str().expect("path"),
            fixture("books.json").to_str().expect("path"),
        ])
        .output()
        .expect("run bookgraph trees");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("cache unavailable"), "stderr: {stderr}");
}
