// File: netbackup/src/ssh/connection.rs

use async_ssh2_tokio::client::{AuthMethod, Client, ServerCheckMethod};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::{SessionConnector, ShellSession};
use crate::capture::DeviceTarget;
use crate::constants::ssh::{DRAIN_GAP, PTY_COLUMNS, PTY_ROWS, PTY_TERM};
use crate::errors::CaptureError;

trait ShellStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> ShellStream for T {}

pub struct SshConnection {
    client: Client,
    host: String,
}

impl SshConnection {
    pub async fn new(
        target: &DeviceTarget,
        connect_timeout: Duration,
    ) -> Result<Self, CaptureError> {
        debug!(
            "Establishing SSH connection to {}@{}:{}",
            target.username(),
            target.host(),
            target.port()
        );

        let auth_method = AuthMethod::with_password(target.password());

        // Network devices rarely ship stable host keys across reloads
        let client = tokio::time::timeout(
            connect_timeout,
            Client::connect(
                (target.host(), target.port()),
                target.username(),
                auth_method,
                ServerCheckMethod::NoCheck,
            ),
        )
        .await
        .map_err(|_| CaptureError::ConnectTimeout {
            host: target.host().to_string(),
            port: target.port(),
            seconds: connect_timeout.as_secs(),
        })?
        .map_err(|e| match e {
            async_ssh2_tokio::Error::PasswordWrong => CaptureError::AuthenticationFailed {
                host: target.host().to_string(),
                username: target.username().to_string(),
                reason: "password rejected".to_string(),
            },
            other => CaptureError::ConnectionFailed {
                host: target.host().to_string(),
                port: target.port(),
                reason: other.to_string(),
            },
        })?;

        debug!("SSH connection established to {}", target.host());

        Ok(Self {
            client,
            host: target.host().to_string(),
        })
    }

    /// Request a PTY and a login shell on a fresh channel.
    pub async fn invoke_shell(self) -> Result<SshShell, CaptureError> {
        let shell_error = |e: &dyn std::fmt::Display| CaptureError::ShellFailed {
            host: self.host.clone(),
            reason: e.to_string(),
        };

        let channel = self
            .client
            .get_channel()
            .await
            .map_err(|e| shell_error(&e))?;
        channel
            .request_pty(true, PTY_TERM, PTY_COLUMNS, PTY_ROWS, 0, 0, &[])
            .await
            .map_err(|e| shell_error(&e))?;
        channel
            .request_shell(true)
            .await
            .map_err(|e| shell_error(&e))?;

        debug!("Interactive shell opened on {}", self.host);

        Ok(SshShell {
            host: self.host,
            client: self.client,
            stream: Box::new(channel.into_stream()),
            closed: false,
        })
    }
}

pub struct SshShell {
    host: String,
    client: Client,
    stream: Box<dyn ShellStream>,
    // set once the device has sent EOF
    closed: bool,
}

#[async_trait]
impl ShellSession for SshShell {
    fn host(&self) -> &str {
        &self.host
    }

    async fn send_line(&mut self, line: &str) -> Result<(), CaptureError> {
        debug!("Sending to {}: {}", self.host, line);
        let payload = format!("{}\n", line);
        self.stream
            .write_all(payload.as_bytes())
            .await
            .map_err(|e| CaptureError::io(&self.host, e))?;
        self.stream
            .flush()
            .await
            .map_err(|e| CaptureError::io(&self.host, e))
    }

    async fn read_available(
        &mut self,
        max_bytes: usize,
        wait: Duration,
    ) -> Result<String, CaptureError> {
        if self.closed {
            return Err(CaptureError::ChannelClosed {
                host: self.host.clone(),
            });
        }

        let mut collected = Vec::new();
        let mut buf = vec![0u8; max_bytes];
        let mut patience = wait;

        while collected.len() < max_bytes {
            let room = max_bytes - collected.len();
            match tokio::time::timeout(patience, self.stream.read(&mut buf[..room])).await {
                Err(_) => break,
                Ok(Ok(0)) => {
                    debug!("{} closed the channel", self.host);
                    self.closed = true;
                    break;
                }
                Ok(Ok(n)) => {
                    collected.extend_from_slice(&buf[..n]);
                    patience = DRAIN_GAP;
                }
                Ok(Err(e)) if collected.is_empty() => {
                    return Err(CaptureError::io(&self.host, e));
                }
                Ok(Err(e)) => {
                    warn!("Read from {} ended early: {}", self.host, e);
                    break;
                }
            }
        }

        debug!("Read {} bytes from {}", collected.len(), self.host);
        Ok(String::from_utf8_lossy(&collected).into_owned())
    }

    async fn close(&mut self) -> Result<(), CaptureError> {
        if let Err(e) = self.stream.shutdown().await {
            debug!("Shell shutdown on {} reported: {}", self.host, e);
        }
        self.client
            .disconnect()
            .await
            .map_err(|e| CaptureError::io(&self.host, e))
    }
}

/// Opens a fresh connection per device; nothing is pooled between captures.
pub struct SshConnector {
    connect_timeout: Duration,
}

impl SshConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl SessionConnector for SshConnector {
    async fn open_shell(
        &self,
        target: &DeviceTarget,
    ) -> Result<Box<dyn ShellSession>, CaptureError> {
        let connection = SshConnection::new(target, self.connect_timeout).await?;
        let shell = connection.invoke_shell().await?;
        Ok(Box::new(shell))
    }
}
