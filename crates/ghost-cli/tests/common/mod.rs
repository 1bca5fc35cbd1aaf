//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

/// Test context with a temporary project directory
pub struct TestContext {
    pub temp_dir: TempDir,
    pub chain_path: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let chain_path = temp_dir.path().join("logs").join("blockchain.json");

        Self {
            temp_dir,
            chain_path,
        }
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a file relative to the project directory
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        ghost_test_utils::write_file(self.path(), relative, content)
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("ghost").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("GHOST_CONFIG_PATH")
            .env_remove("GHOST_CHAIN_FILE")
            .env_remove("GHOST_LOG_LEVEL")
            .env_remove("RUST_LOG")
            .env("GHOST_DIFFICULTY", "1")
            .env("NO_COLOR", "1")
            .arg("--chain")
            .arg(&self.chain_path);
        cmd
    }

    /// Run a command with `--format json` and parse its stdout
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .command()
            .args(["--format", "json"])
            .args(args)
            .output()
            .expect("Failed to run command");
        assert!(
            output.status.success(),
            "Command failed with status: {}\nstderr: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
