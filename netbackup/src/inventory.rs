//! Device inventory: a plain text file with one address per line.
//!
//! Read fresh on every collector run, so edits take effect on the next cycle.

use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::errors::InventoryError;

pub async fn load_inventory(path: &Path) -> Result<Vec<String>, InventoryError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|source| InventoryError {
            path: path.to_path_buf(),
            source,
        })?;

    let hosts = parse_inventory(&content);
    debug!("Read {} hosts from {}", hosts.len(), path.display());
    Ok(hosts)
}

/// Lines are trimmed; blank lines and `#` comments are dropped.
pub fn parse_inventory(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
