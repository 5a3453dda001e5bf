//! Usage: Resolve asset roots and per-surface storage directories.

use crate::launch_config::LaunchConfig;
use std::path::PathBuf;
use tauri::Manager;

const PARTITIONS_DIR_NAME: &str = "partitions";

fn is_safe_partition_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }
    if name.contains('/') || name.contains('\\') {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

/// Public asset root: `<app root>/public` in dev-server runs, bundled `public/` otherwise.
pub fn public_dir(app: &tauri::AppHandle, config: &LaunchConfig) -> PathBuf {
    if config.is_dev_server() {
        return config.dev_public_dir();
    }

    match app.path().resource_dir() {
        Ok(dir) => dir.join("public"),
        Err(err) => {
            tracing::warn!("资源目录解析失败，回退到应用根目录: {}", err);
            config.dev_public_dir()
        }
    }
}

/// Persistent webview data directory dedicated to one named partition.
pub fn partition_dir(app: &tauri::AppHandle, partition: &str) -> Result<PathBuf, String> {
    if !is_safe_partition_name(partition) {
        return Err(format!("SEC_INVALID_INPUT: unsafe partition name={partition}"));
    }

    let base = app
        .path()
        .app_local_data_dir()
        .map_err(|e| format!("failed to resolve app local data dir: {e}"))?;

    let dir = base.join(PARTITIONS_DIR_NAME).join(partition);
    std::fs::create_dir_all(&dir)
        .map_err(|e| format!("failed to create partition dir {}: {e}", dir.display()))?;

    Ok(dir)
}
