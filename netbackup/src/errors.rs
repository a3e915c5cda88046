//! Error types for the backup engine
//!
//! Each seam gets its own enum so callers can tell a device that was
//! unreachable from a config file that failed to parse. Orchestration code
//! above these seams works with `anyhow::Result`.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while capturing one device. Always handled per device; never
/// allowed to abort the batch.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to connect to {host}:{port}: {reason}")]
    ConnectionFailed {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Connection to {host}:{port} timed out after {seconds}s")]
    ConnectTimeout { host: String, port: u16, seconds: u64 },

    #[error("Authentication failed for {username}@{host}: {reason}")]
    AuthenticationFailed {
        host: String,
        username: String,
        reason: String,
    },

    #[error("Could not open interactive shell on {host}: {reason}")]
    ShellFailed { host: String, reason: String },

    #[error("Session I/O error on {host}: {reason}")]
    SessionIo { host: String, reason: String },

    #[error("Device {host} closed the session")]
    ChannelClosed { host: String },

    #[error("Device {host} did not return to its prompt within {seconds}s")]
    PromptTimeout { host: String, seconds: u64 },

    #[error("Device {host} returned to its prompt without a closing '{marker}' line")]
    IncompleteConfig { host: String, marker: &'static str },

    #[error("Failed to write backup {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaptureError {
    pub fn io(host: &str, err: impl std::fmt::Display) -> Self {
        CaptureError::SessionIo {
            host: host.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Configuration error variants
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config from '{path}': {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Failed to parse config '{path}': {reason}")]
    ParseError { path: String, reason: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Missing required field: {field}")]
    MissingRequired { field: String },
}

/// The inventory could not be read. Fails one collector run only.
#[derive(Debug, Error)]
#[error("Failed to read inventory {path:?}: {source}")]
pub struct InventoryError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
