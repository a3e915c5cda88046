//! Scripted device sessions for testing the capture driver
//!
//! `MockConnector` hands out shells that record every line sent, answer
//! reads from a per-host script and can be told to refuse connections, so
//! batches can be exercised without any SSH server.

use async_trait::async_trait;
use netbackup::errors::CaptureError;
use netbackup::{DeviceTarget, SessionConnector, ShellSession};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connect(String),
    Refused(String),
    Send(String, String),
    Read(String),
    Close(String),
}

/// How a shell answers once its scripted chunks are used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptEnd {
    /// Each read waits its full `wait`, then returns nothing (idle device)
    #[default]
    Idle,
    /// Reads return nothing without waiting at all
    Instant,
    /// One empty read (EOF), then every read fails with `ChannelClosed`
    HangUp,
}

#[derive(Clone, Default)]
pub struct MockConnector {
    events: Arc<Mutex<Vec<SessionEvent>>>,
    unreachable: Arc<HashSet<String>>,
    fail_reads: Arc<HashSet<String>>,
    scripts: Arc<HashMap<String, Vec<String>>>,
    script_ends: Arc<HashMap<String, ScriptEnd>>,
    seen_targets: Arc<Mutex<Vec<DeviceTarget>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connections to `host` fail as if the device were down.
    pub fn unreachable(mut self, host: &str) -> Self {
        Arc::make_mut(&mut self.unreachable).insert(host.to_string());
        self
    }

    /// The session to `host` connects but every read errors.
    pub fn failing_reads(mut self, host: &str) -> Self {
        Arc::make_mut(&mut self.fail_reads).insert(host.to_string());
        self
    }

    /// Chunks returned by successive reads on `host`; afterwards reads are empty.
    pub fn script(mut self, host: &str, chunks: &[&str]) -> Self {
        Arc::make_mut(&mut self.scripts).insert(
            host.to_string(),
            chunks.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// What reads on `host` do after the script runs out.
    pub fn script_end(mut self, host: &str, end: ScriptEnd) -> Self {
        Arc::make_mut(&mut self.script_ends).insert(host.to_string(), end);
        self
    }

    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Hosts in the order connections were attempted, refused ones included.
    pub fn attempted_hosts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Connect(h) | SessionEvent::Refused(h) => Some(h),
                _ => None,
            })
            .collect()
    }

    pub fn lines_sent_to(&self, host: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::Send(h, line) if h == host => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn reads_from(&self, host: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, SessionEvent::Read(h) if h == host))
            .count()
    }

    pub fn targets(&self) -> Vec<DeviceTarget> {
        self.seen_targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn open_shell(
        &self,
        target: &DeviceTarget,
    ) -> Result<Box<dyn ShellSession>, CaptureError> {
        let host = target.host().to_string();
        self.seen_targets.lock().unwrap().push(target.clone());

        if self.unreachable.contains(&host) {
            self.events
                .lock()
                .unwrap()
                .push(SessionEvent::Refused(host.clone()));
            return Err(CaptureError::ConnectionFailed {
                host,
                port: target.port(),
                reason: "No route to host".to_string(),
            });
        }

        self.events
            .lock()
            .unwrap()
            .push(SessionEvent::Connect(host.clone()));

        let chunks = self.scripts.get(&host).cloned().unwrap_or_default();
        Ok(Box::new(MockShell {
            fail_reads: self.fail_reads.contains(&host),
            script_end: self.script_ends.get(&host).copied().unwrap_or_default(),
            hung_up: false,
            host,
            chunks: chunks.into(),
            events: self.events.clone(),
        }))
    }
}

struct MockShell {
    host: String,
    chunks: VecDeque<String>,
    fail_reads: bool,
    script_end: ScriptEnd,
    hung_up: bool,
    events: Arc<Mutex<Vec<SessionEvent>>>,
}

#[async_trait]
impl ShellSession for MockShell {
    fn host(&self) -> &str {
        &self.host
    }

    async fn send_line(&mut self, line: &str) -> Result<(), CaptureError> {
        self.events
            .lock()
            .unwrap()
            .push(SessionEvent::Send(self.host.clone(), line.to_string()));
        Ok(())
    }

    async fn read_available(
        &mut self,
        max_bytes: usize,
        wait: Duration,
    ) -> Result<String, CaptureError> {
        self.events
            .lock()
            .unwrap()
            .push(SessionEvent::Read(self.host.clone()));

        if self.fail_reads {
            return Err(CaptureError::io(&self.host, "connection reset by peer"));
        }

        match self.chunks.pop_front() {
            Some(mut chunk) => {
                chunk.truncate(max_bytes);
                Ok(chunk)
            }
            None => match self.script_end {
                ScriptEnd::Idle => {
                    tokio::time::sleep(wait).await;
                    Ok(String::new())
                }
                ScriptEnd::Instant => Ok(String::new()),
                ScriptEnd::HangUp if self.hung_up => Err(CaptureError::ChannelClosed {
                    host: self.host.clone(),
                }),
                ScriptEnd::HangUp => {
                    self.hung_up = true;
                    Ok(String::new())
                }
            },
        }
    }

    async fn close(&mut self) -> Result<(), CaptureError> {
        self.events
            .lock()
            .unwrap()
            .push(SessionEvent::Close(self.host.clone()));
        Ok(())
    }
}
