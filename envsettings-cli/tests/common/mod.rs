//! Common test utilities for CLI integration tests.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test environment with an isolated working directory.
///
/// Every command runs with a cleared process environment so results do not
/// depend on the developer's shell.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the temporary directory
    pub temp_path: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let temp_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            temp_path,
        }
    }

    /// Command with the envsettings binary and an empty environment.
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("envsettings").expect("Failed to find envsettings binary");
        cmd.env_clear().current_dir(&self.temp_path);
        cmd
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Write a file relative to the test directory and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_path.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    /// Write `schema.yaml` and return its path.
    pub fn schema(&self, contents: &str) -> PathBuf {
        self.write("schema.yaml", contents)
    }
}
