//! Test utilities for GHOST crates.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = write_file(dir.path(), "test_file", content);
    (dir, path)
}

/// Writes `content` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(&path, content).expect("Failed to write file");
    path
}

/// Rewrites a JSON file in place through `edit`.
///
/// Used to simulate an attacker editing a persisted chain.
pub fn edit_json(path: &Path, edit: impl FnOnce(&mut Value)) {
    let raw = std::fs::read_to_string(path).expect("Failed to read JSON file");
    let mut value: Value = serde_json::from_str(&raw).expect("Invalid JSON");
    edit(&mut value);
    let out = serde_json::to_string_pretty(&value).expect("Failed to encode JSON");
    std::fs::write(path, out).expect("Failed to write JSON file");
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}
