// File: netbackup/src/scheduler/operations.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

use super::Job;
use crate::capture::{BatchReport, CaptureDriver};
use crate::inventory::load_inventory;
use crate::retention::{RetentionSweeper, SweepReport};

/// Collector cycle: re-read the inventory, then capture every device in order.
pub struct BackupJob {
    driver: CaptureDriver,
    inventory_path: PathBuf,
    last_report: Option<BatchReport>,
}

impl BackupJob {
    pub fn new(driver: CaptureDriver, inventory_path: impl Into<PathBuf>) -> Self {
        Self {
            driver,
            inventory_path: inventory_path.into(),
            last_report: None,
        }
    }

    pub fn last_report(&self) -> Option<&BatchReport> {
        self.last_report.as_ref()
    }

    pub async fn run_once(&mut self) -> Result<BatchReport> {
        info!("Starting backup");

        // An unreadable inventory fails this run only; the scheduler logs it
        let hosts = load_inventory(&self.inventory_path)
            .await
            .context("Backup run aborted")?;

        let report = self.driver.run_batch(&hosts).await;
        self.last_report = Some(report.clone());
        Ok(report)
    }
}

#[async_trait]
impl Job for BackupJob {
    async fn run(&mut self) -> Result<()> {
        self.run_once().await.map(|_| ())
    }
}

/// Retention cycle: one sweep of the backup tree.
pub struct RetentionJob {
    sweeper: RetentionSweeper,
}

impl RetentionJob {
    pub fn new(sweeper: RetentionSweeper) -> Self {
        Self { sweeper }
    }

    pub async fn run_once(&self) -> Result<SweepReport> {
        let sweeper = self.sweeper.clone();
        // walkdir and remove_file are blocking calls
        tokio::task::spawn_blocking(move || sweeper.sweep())
            .await
            .context("Retention sweep panicked")
    }
}

#[async_trait]
impl Job for RetentionJob {
    async fn run(&mut self) -> Result<()> {
        self.run_once().await.map(|_| ())
    }
}
