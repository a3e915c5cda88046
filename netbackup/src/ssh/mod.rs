// File: netbackup/src/ssh/mod.rs

pub mod connection;

pub use connection::{SshConnection, SshConnector, SshShell};

use async_trait::async_trait;
use std::time::Duration;

use crate::capture::DeviceTarget;
use crate::errors::CaptureError;

/// An interactive shell on one device.
///
/// The capture driver only ever writes whole lines and reads whatever the
/// device has produced so far; there is no request/response framing because
/// the device CLI offers none.
#[async_trait]
pub trait ShellSession: Send {
    fn host(&self) -> &str;

    /// Write `line` followed by `\n`.
    async fn send_line(&mut self, line: &str) -> Result<(), CaptureError>;

    /// One bounded read: waits up to `wait` for the first byte, then drains
    /// what is already buffered, returning at most `max_bytes`. An empty
    /// string means nothing arrived in time, or that the device has just
    /// closed the channel; any read after that fails with
    /// `CaptureError::ChannelClosed`.
    async fn read_available(
        &mut self,
        max_bytes: usize,
        wait: Duration,
    ) -> Result<String, CaptureError>;

    async fn close(&mut self) -> Result<(), CaptureError>;
}

/// Opens authenticated interactive shells. Implemented over SSH in
/// production and by scripted sessions in tests.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn open_shell(
        &self,
        target: &DeviceTarget,
    ) -> Result<Box<dyn ShellSession>, CaptureError>;
}
