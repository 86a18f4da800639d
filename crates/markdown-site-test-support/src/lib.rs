//! Shared test harness utilities for markdown-site crates.

use std::fs;
use std::path::Path;

use markdown_site_config::{Config, LoadOptions};
use tempfile::TempDir;

/// A scratch project directory with a `.git` marker so config discovery stops
/// at its root.
pub fn project_dir() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    fs::create_dir(temp.path().join(".git")).expect("create .git");
    temp
}

/// Returns the configuration resolved for `root` (defaults plus any
/// `.markdown-site.toml` present there).
pub fn test_config(root: &Path) -> Config {
    Config::load(LoadOptions::default().with_working_dir(root)).expect("load test config")
}

/// Write `contents` to `relative` under `root`, creating parent directories.
pub fn write_fixture(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(&path, contents).expect("write fixture");
}
