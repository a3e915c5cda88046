// File: netbackup/src/capture/driver.rs
use chrono::Local;
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::{backup_filename, CaptureMode, CaptureTimings, Credentials, DeviceTarget};
use crate::config::Config;
use crate::constants::protocol::{
    CONFIG_END_MARKER, COPY_RUNNING_TO_TFTP, DISABLE_PAGING, SHOW_RUNNING_CONFIG,
};
use crate::errors::{CaptureError, ConfigError};
use crate::ssh::{SessionConnector, ShellSession};

/// One line typed into the shell and the pause that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellStep {
    pub line: String,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub host: String,
    pub filename: String,
    /// Raw session text (side channel) or the extracted config (direct)
    pub output: String,
    /// Set only when this process wrote the file itself
    pub saved_to: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed_hosts: Vec<String>,
}

pub struct CaptureDriver {
    connector: Arc<dyn SessionConnector>,
    credentials: Credentials,
    mode: CaptureMode,
    transfer_target: String,
    backup_dir: PathBuf,
    timings: CaptureTimings,
    prompt: Regex,
}

impl CaptureDriver {
    pub fn new(
        connector: Arc<dyn SessionConnector>,
        credentials: Credentials,
        mode: CaptureMode,
        transfer_target: impl Into<String>,
        backup_dir: impl Into<PathBuf>,
        timings: CaptureTimings,
        prompt: Regex,
    ) -> Self {
        Self {
            connector,
            credentials,
            mode,
            transfer_target: transfer_target.into(),
            backup_dir: backup_dir.into(),
            timings,
            prompt,
        }
    }

    pub fn from_config(
        config: &Config,
        connector: Arc<dyn SessionConnector>,
    ) -> Result<Self, ConfigError> {
        let prompt =
            Regex::new(&config.capture.prompt_pattern).map_err(|e| ConfigError::InvalidValue {
                field: "capture.prompt_pattern".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self::new(
            connector,
            config.credentials()?,
            config.capture.mode,
            config.capture.transfer_target.clone(),
            config.backup_dir.clone(),
            config.capture_timings(),
            prompt,
        ))
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    /// Capture every host in order. A failed device is logged and counted,
    /// then the batch moves on.
    pub async fn run_batch(&self, hosts: &[String]) -> BatchReport {
        info!("Starting backup of {} devices ({} mode)", hosts.len(), self.mode);
        let mut report = BatchReport::default();

        for host in hosts {
            info!("Get running config from {}", host);
            let target = self.credentials.target_for(host);
            report.attempted += 1;

            match self.capture_device(&target).await {
                Some(_) => report.succeeded += 1,
                None => report.failed_hosts.push(host.clone()),
            }

            if !self.timings.inter_device_pause.is_zero() {
                tokio::time::sleep(self.timings.inter_device_pause).await;
            }
        }

        if report.failed_hosts.is_empty() {
            info!(
                "Backup finished: {}/{} devices captured",
                report.succeeded, report.attempted
            );
        } else {
            warn!(
                "Backup finished: {}/{} devices captured, failed: {}",
                report.succeeded,
                report.attempted,
                report.failed_hosts.join(", ")
            );
        }

        report
    }

    /// Capture one device. Any connect, auth or session error is logged here
    /// and turned into `None`.
    pub async fn capture_device(&self, target: &DeviceTarget) -> Option<CaptureOutcome> {
        match self.try_capture(target).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Error fetching running config from {}: {}", target.host(), e);
                None
            }
        }
    }

    async fn try_capture(&self, target: &DeviceTarget) -> Result<CaptureOutcome, CaptureError> {
        let mut session = self.connector.open_shell(target).await?;
        info!("Connected to {}", target.host());

        let filename = backup_filename(&Local::now(), target.host());
        info!("File path: {}", filename);

        let result = match self.mode {
            CaptureMode::SideChannel => self.run_side_channel(session.as_mut(), &filename).await,
            CaptureMode::Direct => self.run_direct(session.as_mut(), &filename).await,
        };

        if let Err(e) = session.close().await {
            warn!("Failed to close session on {}: {}", target.host(), e);
        }

        let (output, saved_to) = result?;
        Ok(CaptureOutcome {
            host: target.host().to_string(),
            filename,
            output,
            saved_to,
        })
    }

    /// Lines sent in side-channel mode, in order, with their trailing pauses.
    pub fn side_channel_plan(&self, filename: &str) -> Vec<ShellStep> {
        let t = &self.timings;
        vec![
            step(DISABLE_PAGING, t.after_pagination),
            step(COPY_RUNNING_TO_TFTP, t.after_copy),
            step(&self.transfer_target, t.after_target),
            step(filename, t.after_filename),
        ]
    }

    async fn run_side_channel(
        &self,
        session: &mut dyn ShellSession,
        filename: &str,
    ) -> Result<(String, Option<PathBuf>), CaptureError> {
        pause(self.timings.shell_settle).await;

        for step in self.side_channel_plan(filename) {
            session.send_line(&step.line).await?;
            pause(step.delay).await;
        }

        let output = session
            .read_available(self.timings.read_buffer_bytes, self.timings.read_timeout)
            .await?;
        debug!("Session output from {}:\n{}", session.host(), output);

        Ok((output, None))
    }

    async fn run_direct(
        &self,
        session: &mut dyn ShellSession,
        filename: &str,
    ) -> Result<(String, Option<PathBuf>), CaptureError> {
        pause(self.timings.shell_settle).await;

        session.send_line(DISABLE_PAGING).await?;
        pause(self.timings.after_pagination).await;
        // Login banner and the paging echo are not part of the config
        let discarded = session
            .read_available(self.timings.read_buffer_bytes, self.timings.read_timeout)
            .await?;
        debug!("Discarded {} bytes of preamble from {}", discarded.len(), session.host());

        session.send_line(SHOW_RUNNING_CONFIG).await?;

        let deadline = Instant::now().checked_add(self.timings.direct_timeout);
        let mut raw = String::new();
        loop {
            let read_started = Instant::now();
            let chunk = session
                .read_available(self.timings.read_buffer_bytes, self.timings.direct_idle)
                .await?;
            raw.push_str(&chunk);

            if let Some(body) = command_output(&raw, SHOW_RUNNING_CONFIG) {
                if self.prompt.is_match(body) {
                    if has_end_marker(body) {
                        break;
                    }
                    // Prompt back and the device has gone quiet: nothing more is coming
                    if chunk.is_empty() {
                        return Err(CaptureError::IncompleteConfig {
                            host: session.host().to_string(),
                            marker: CONFIG_END_MARKER,
                        });
                    }
                }
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(CaptureError::PromptTimeout {
                    host: session.host().to_string(),
                    seconds: self.timings.direct_timeout.as_secs(),
                });
            }
            // An empty read must take at least one idle period before the next poll
            if chunk.is_empty() {
                if let Some(until) = read_started.checked_add(self.timings.direct_idle) {
                    tokio::time::sleep_until(until).await;
                }
            }
        }

        let config_text = extract_config(&raw, SHOW_RUNNING_CONFIG, &self.prompt);

        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|source| CaptureError::WriteFailed {
                path: self.backup_dir.clone(),
                source,
            })?;
        let path = self.backup_dir.join(filename);
        tokio::fs::write(&path, config_text.as_bytes())
            .await
            .map_err(|source| CaptureError::WriteFailed {
                path: path.clone(),
                source,
            })?;
        info!(
            "Saved {} bytes of running config from {} to {}",
            config_text.len(),
            session.host(),
            path.display()
        );

        Ok((config_text, Some(path)))
    }
}

fn step(line: &str, delay: Duration) -> ShellStep {
    ShellStep {
        line: line.to_string(),
        delay,
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Everything after the line echoing `command`, if the echo has arrived.
fn command_output<'a>(raw: &'a str, command: &str) -> Option<&'a str> {
    let echo = raw.find(command)?;
    let rest = &raw[echo..];
    let newline = rest.find('\n')?;
    Some(&rest[newline + 1..])
}

/// Whether the closing `end` line of the running config has arrived.
fn has_end_marker(body: &str) -> bool {
    body.lines().any(|line| line.trim_end() == CONFIG_END_MARKER)
}

/// Strip the command echo, carriage returns and the closing prompt.
fn extract_config(raw: &str, command: &str, prompt: &Regex) -> String {
    let body = command_output(raw, command).unwrap_or(raw).replace('\r', "");
    let mut lines: Vec<&str> = body.lines().collect();

    trim_blank_tail(&mut lines);
    if lines.last().is_some_and(|l| prompt.is_match(l)) {
        lines.pop();
        trim_blank_tail(&mut lines);
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn trim_blank_tail(lines: &mut Vec<&str>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
}
