//! Age-based pruning of the backup store
//!
//! Every regular file under the backup root is judged by its mtime alone:
//! a file older than the threshold is deleted on the spot. Deletion is
//! final; there is no trash directory and no grace period.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub inspected: usize,
    pub deleted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    root: PathBuf,
    threshold: Duration,
}

impl RetentionSweeper {
    pub fn new(root: impl Into<PathBuf>, threshold: Duration) -> Self {
        Self {
            root: root.into(),
            threshold,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn sweep(&self) -> SweepReport {
        self.sweep_at(SystemTime::now())
    }

    /// Sweep as if the clock read `now`.
    pub fn sweep_at(&self, now: SystemTime) -> SweepReport {
        let mut report = SweepReport::default();

        if !self.root.exists() {
            warn!(
                "Backup directory {} does not exist, nothing to sweep",
                self.root.display()
            );
            return report;
        }

        info!("...checking old files in {}...", self.root.display());

        for entry in WalkDir::new(&self.root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    report.failed += 1;
                    continue;
                }
            };

            // WalkDir does not follow symlinks, so this is a real file
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            report.inspected += 1;
            debug!("Checking file {}", path.display());

            let modified = match entry
                .metadata()
                .map_err(std::io::Error::from)
                .and_then(|m| m.modified())
            {
                Ok(modified) => modified,
                Err(e) => {
                    warn!("Cannot read modification time of {}: {}", path.display(), e);
                    report.failed += 1;
                    continue;
                }
            };

            let age = file_age(modified, now);
            info!(
                "File {} was modified {:.2} minutes ago",
                path.display(),
                age.as_secs_f64() / 60.0
            );

            if age > self.threshold {
                match std::fs::remove_file(path) {
                    Ok(()) => {
                        info!("Deleted: {}", path.display());
                        report.deleted += 1;
                    }
                    Err(e) => {
                        warn!("Failed to delete {}: {}", path.display(), e);
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            "...done: {} files checked, {} deleted, {} failures...",
            report.inspected, report.deleted, report.failed
        );

        report
    }
}

/// `now - modified`, clamped to zero for files stamped in the future.
pub fn file_age(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}
