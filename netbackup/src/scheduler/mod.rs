//! Interval scheduler driving the backup and retention cycles
//!
//! A single polling loop owns every registration. Each tick it runs, in
//! registration order, every job that was due when the tick started, then
//! sleeps for the poll interval.
//!
//! # Behavior
//!
//! - **No overlap**: a job runs to completion before anything else happens,
//!   so the same job never runs twice at once and siblings never interleave.
//! - **Delay, never skip**: a sibling already due when the tick started runs
//!   after the long job in that same tick; one that became due while the long
//!   job ran runs on the next tick. Neither is skipped.
//! - **Next run from completion**: after a run the job is next due one
//!   interval after it *finished*, so a slow job cannot pile up catch-up runs.
//! - **Failures stay local**: a job error is logged and the loop carries on.
//!
//! # Configuration
//!
//! ```toml
//! [schedule]
//! backup_interval_seconds = 3600
//! retention_interval_seconds = 86400
//! poll_interval_ms = 1000
//! run_on_start = true
//! ```

pub mod operations;
pub use operations::{BackupJob, RetentionJob};

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// A unit of periodic work.
#[async_trait]
pub trait Job: Send {
    async fn run(&mut self) -> anyhow::Result<()>;
}

struct Registration {
    name: String,
    interval: Duration,
    next_run: Instant,
    runs: u64,
    job: Box<dyn Job>,
}

pub struct Scheduler {
    jobs: Vec<Registration>,
    poll_interval: Duration,
    run_on_start: bool,
}

impl Scheduler {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            jobs: Vec::new(),
            poll_interval,
            run_on_start: false,
        }
    }

    /// Make jobs registered from now on due immediately instead of one
    /// interval after registration.
    pub fn run_on_start(mut self, enabled: bool) -> Self {
        self.run_on_start = enabled;
        self
    }

    pub fn every(&mut self, name: impl Into<String>, interval: Duration, job: impl Job + 'static) {
        let name = name.into();
        let now = Instant::now();
        let next_run = if self.run_on_start { now } else { due_after(now, interval) };

        info!("Scheduled '{}' every {}s", name, interval.as_secs_f64());

        self.jobs.push(Registration {
            name,
            interval,
            next_run,
            runs: 0,
            job: Box::new(job),
        });
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// How many times the named job has run.
    pub fn runs(&self, name: &str) -> Option<u64> {
        self.jobs.iter().find(|r| r.name == name).map(|r| r.runs)
    }

    /// Time until the earliest job is due; zero if one is overdue.
    pub fn next_due_in(&self) -> Option<Duration> {
        let now = Instant::now();
        self.jobs
            .iter()
            .map(|r| r.next_run.saturating_duration_since(now))
            .min()
    }

    /// Run every job that is due right now. Returns how many ran.
    pub async fn run_pending(&mut self) -> usize {
        let tick = Instant::now();
        let mut ran = 0;

        for registration in self.jobs.iter_mut() {
            if tick < registration.next_run {
                continue;
            }

            debug!("Running job '{}'", registration.name);
            let started = Instant::now();

            match registration.job.run().await {
                Ok(()) => info!(
                    "✓ Job '{}' finished in {:.1}s",
                    registration.name,
                    started.elapsed().as_secs_f64()
                ),
                Err(e) => error!("✗ Job '{}' failed: {:#}", registration.name, e),
            }

            registration.runs += 1;
            registration.next_run = due_after(Instant::now(), registration.interval);
            ran += 1;
        }

        ran
    }

    /// Poll forever. Only process termination stops it.
    pub async fn run_forever(&mut self) {
        info!(
            "Scheduler running {} jobs, polling every {}ms",
            self.jobs.len(),
            self.poll_interval.as_millis()
        );

        loop {
            if self.run_pending().await > 0 {
                if let Some(idle) = self.next_due_in() {
                    debug!("Next job due in {}s", idle.as_secs());
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// `from + interval`, saturating at a far-future instant instead of
/// overflowing.
fn due_after(from: Instant, interval: Duration) -> Instant {
    from.checked_add(interval).unwrap_or_else(|| from + FAR_FUTURE)
}

// Roughly 30 years
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);
