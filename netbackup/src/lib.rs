pub mod capture;
pub mod config;
pub mod constants;
pub mod errors;
pub mod inventory;
pub mod retention;
pub mod scheduler;
pub mod ssh;

// Re-export commonly used types
pub use capture::{CaptureDriver, CaptureMode, Credentials, DeviceTarget};
pub use config::{Config, ConfigManager};
pub use retention::RetentionSweeper;
pub use scheduler::{BackupJob, RetentionJob, Scheduler};
pub use ssh::{SessionConnector, ShellSession, SshConnector};
