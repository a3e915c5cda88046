// File: netbackup/src/config/mod.rs
pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::capture::{CaptureMode, CaptureTimings, Credentials};
use crate::constants::{delays, paths, protocol, retention, schedule, ssh, DEFAULT_TRANSFER_TARGET};
use crate::errors::ConfigError;

pub use manager::ConfigManager;
pub use secrets::SecretsLoader;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_inventory_path")]
    pub inventory_path: PathBuf,
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub username: String,
    // May instead come from secrets.toml
    pub password: Option<String>,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub mode: CaptureMode,
    pub transfer_target: String,
    pub shell_settle_ms: u64,
    pub pagination_delay_ms: u64,
    pub copy_delay_ms: u64,
    pub target_delay_ms: u64,
    pub filename_delay_ms: u64,
    pub read_buffer_bytes: usize,
    pub read_timeout_ms: u64,
    pub connect_timeout_seconds: u64,
    pub inter_device_pause_ms: u64,
    pub prompt_pattern: String,
    pub direct_timeout_seconds: u64,
    pub direct_idle_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::SideChannel,
            transfer_target: DEFAULT_TRANSFER_TARGET.to_string(),
            shell_settle_ms: millis(delays::SHELL_SETTLE),
            pagination_delay_ms: millis(delays::AFTER_PAGINATION),
            copy_delay_ms: millis(delays::AFTER_COPY),
            target_delay_ms: millis(delays::AFTER_TARGET),
            filename_delay_ms: millis(delays::AFTER_FILENAME),
            read_buffer_bytes: ssh::READ_BUFFER_BYTES,
            read_timeout_ms: millis(ssh::READ_TIMEOUT),
            connect_timeout_seconds: ssh::CONNECT_TIMEOUT.as_secs(),
            inter_device_pause_ms: millis(delays::INTER_DEVICE_PAUSE),
            prompt_pattern: protocol::DEFAULT_PROMPT_PATTERN.to_string(),
            direct_timeout_seconds: delays::DIRECT_CAPTURE_TIMEOUT.as_secs(),
            direct_idle_ms: millis(delays::DIRECT_IDLE),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub backup_interval_seconds: u64,
    pub retention_interval_seconds: u64,
    pub poll_interval_ms: u64,
    pub run_on_start: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            backup_interval_seconds: schedule::BACKUP_INTERVAL_SECONDS,
            retention_interval_seconds: schedule::RETENTION_INTERVAL_SECONDS,
            poll_interval_ms: schedule::POLL_INTERVAL_MS,
            run_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub max_age_seconds: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_seconds: retention::MAX_AGE_SECONDS,
        }
    }
}

fn default_inventory_path() -> PathBuf {
    PathBuf::from(paths::INVENTORY_FILE)
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(paths::BACKUP_DIR)
}

fn default_ssh_port() -> u16 {
    ssh::DEFAULT_PORT
}

fn millis(d: Duration) -> u64 {
    d.as_millis() as u64
}

impl Config {
    /// Base credentials shared by every inventory host.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let password = self
            .credentials
            .password
            .clone()
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "credentials.password".to_string(),
            })?;

        Ok(Credentials::new(
            self.credentials.username.clone(),
            password,
            self.credentials.port,
        ))
    }

    pub fn capture_timings(&self) -> CaptureTimings {
        let c = &self.capture;
        CaptureTimings {
            shell_settle: Duration::from_millis(c.shell_settle_ms),
            after_pagination: Duration::from_millis(c.pagination_delay_ms),
            after_copy: Duration::from_millis(c.copy_delay_ms),
            after_target: Duration::from_millis(c.target_delay_ms),
            after_filename: Duration::from_millis(c.filename_delay_ms),
            read_timeout: Duration::from_millis(c.read_timeout_ms),
            read_buffer_bytes: c.read_buffer_bytes,
            inter_device_pause: Duration::from_millis(c.inter_device_pause_ms),
            direct_timeout: Duration::from_secs(c.direct_timeout_seconds),
            direct_idle: Duration::from_millis(c.direct_idle_ms),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.capture.connect_timeout_seconds)
    }

    pub fn backup_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.backup_interval_seconds)
    }

    pub fn retention_interval(&self) -> Duration {
        Duration::from_secs(self.schedule.retention_interval_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.schedule.poll_interval_ms)
    }

    pub fn retention_threshold(&self) -> Duration {
        Duration::from_secs(self.retention.max_age_seconds)
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.username.trim().is_empty() {
            return Err(invalid("credentials.username", "must not be empty"));
        }
        match &self.credentials.password {
            None => {
                return Err(ConfigError::MissingRequired {
                    field: "credentials.password".to_string(),
                })
            }
            Some(p) if p.is_empty() => {
                return Err(invalid("credentials.password", "must not be empty"))
            }
            Some(_) => {}
        }
        if self.credentials.port == 0 {
            return Err(invalid("credentials.port", "must be non-zero"));
        }
        if self.capture.mode == CaptureMode::SideChannel
            && self.capture.transfer_target.trim().is_empty()
        {
            return Err(invalid(
                "capture.transfer_target",
                "required when capture.mode = \"side_channel\"",
            ));
        }
        if self.capture.read_buffer_bytes == 0 {
            return Err(invalid("capture.read_buffer_bytes", "must be non-zero"));
        }
        if self.capture.connect_timeout_seconds == 0 {
            return Err(invalid("capture.connect_timeout_seconds", "must be non-zero"));
        }
        if let Err(e) = regex::Regex::new(&self.capture.prompt_pattern) {
            return Err(invalid("capture.prompt_pattern", &e.to_string()));
        }
        if self.capture.direct_timeout_seconds > delays::MAX_DIRECT_CAPTURE_TIMEOUT_SECONDS {
            return Err(invalid(
                "capture.direct_timeout_seconds",
                &format!("must be at most {}", delays::MAX_DIRECT_CAPTURE_TIMEOUT_SECONDS),
            ));
        }
        for (field, seconds) in [
            (
                "schedule.backup_interval_seconds",
                self.schedule.backup_interval_seconds,
            ),
            (
                "schedule.retention_interval_seconds",
                self.schedule.retention_interval_seconds,
            ),
        ] {
            if seconds == 0 {
                return Err(invalid(field, "must be non-zero"));
            }
            if seconds > schedule::MAX_INTERVAL_SECONDS {
                return Err(invalid(
                    field,
                    &format!("must be at most {}", schedule::MAX_INTERVAL_SECONDS),
                ));
            }
        }
        if self.schedule.poll_interval_ms == 0 {
            return Err(invalid("schedule.poll_interval_ms", "must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
