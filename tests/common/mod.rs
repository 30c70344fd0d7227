#![allow(dead_code)]

use dealchart::config::ConfigManager;
use dealchart::DataPoint;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temporary config directory and a manager rooted in it.
pub fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

/// Write `content` to `name` inside `dir` and return the path.
pub fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

pub fn won_lost() -> Vec<DataPoint> {
    vec![DataPoint::new("Won", 80.0), DataPoint::new("Lost", 10.0)]
}
