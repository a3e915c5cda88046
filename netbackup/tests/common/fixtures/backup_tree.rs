//! Backup directories populated with files of known age

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temp backup root plus a fixed reference "now" that file ages are
/// measured against, so sweeps can be run at exact instants.
pub struct BackupTree {
    temp_dir: TempDir,
    pub now: SystemTime,
}

impl BackupTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
            now: SystemTime::now(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create `relative` with an mtime `age` before `self.now`.
    pub fn file_aged(&self, relative: &str, age: Duration) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        let file = File::create(&path).expect("Failed to create backup file");
        file.set_modified(self.now - age)
            .expect("Failed to set modification time");
        path
    }

    pub fn file_aged_minutes(&self, relative: &str, minutes: u64) -> PathBuf {
        self.file_aged(relative, Duration::from_secs(minutes * 60))
    }

    /// Every regular file under the root, relative and sorted.
    pub fn files(&self) -> BTreeSet<String> {
        walk(self.root(), self.root())
    }
}

impl Default for BackupTree {
    fn default() -> Self {
        Self::new()
    }
}

fn walk(root: &Path, dir: &Path) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    for entry in fs::read_dir(dir).expect("Failed to read dir") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            found.extend(walk(root, &path));
        } else {
            let relative = path.strip_prefix(root).expect("Path outside root");
            found.insert(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    found
}
