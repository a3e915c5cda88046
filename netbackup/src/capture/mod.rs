//! Configuration capture over interactive device shells
//!
//! The devices expose nothing but a CLI, so a capture is a fixed script of
//! lines typed into a shell with pauses in between. Two strategies exist:
//!
//! - **side_channel** (default): the device is told to `copy run tftp` to a
//!   transfer target and pushes the file itself. Whether the file arrives is
//!   never observed here; the session output is mostly prompt chatter.
//! - **direct**: the driver runs `show running-config`, reads until the
//!   prompt returns and writes the text into the backup directory itself.

pub mod driver;
pub mod filename;
pub mod target;

pub use driver::{BatchReport, CaptureDriver, CaptureOutcome, ShellStep};
pub use filename::backup_filename;
pub use target::{Credentials, DeviceTarget};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    #[default]
    SideChannel,
    Direct,
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureMode::SideChannel => write!(f, "side_channel"),
            CaptureMode::Direct => write!(f, "direct"),
        }
    }
}

/// Every pause in the capture script. Zero is allowed (tests use it).
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureTimings {
    pub shell_settle: Duration,
    pub after_pagination: Duration,
    pub after_copy: Duration,
    pub after_target: Duration,
    pub after_filename: Duration,
    pub read_timeout: Duration,
    pub read_buffer_bytes: usize,
    pub inter_device_pause: Duration,
    pub direct_timeout: Duration,
    pub direct_idle: Duration,
}

impl CaptureTimings {
    /// No pauses at all, short read waits.
    pub fn immediate() -> Self {
        Self {
            shell_settle: Duration::ZERO,
            after_pagination: Duration::ZERO,
            after_copy: Duration::ZERO,
            after_target: Duration::ZERO,
            after_filename: Duration::ZERO,
            read_timeout: Duration::from_millis(10),
            read_buffer_bytes: crate::constants::ssh::READ_BUFFER_BYTES,
            inter_device_pause: Duration::ZERO,
            direct_timeout: Duration::from_secs(1),
            direct_idle: Duration::from_millis(10),
        }
    }
}
