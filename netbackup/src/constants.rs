//! Default timings, limits and protocol literals
//!
//! Every timing value here is only a default: the matching field in
//! `config/main.toml` overrides it. The interactive shell gives no structured
//! completion signal, so the fixed delays are the main source of flaky
//! captures on slow devices; tune them per fleet rather than editing this file.

use std::time::Duration;

/// File and directory locations, relative to the working directory
pub mod paths {
    /// Directory holding `main.toml` and the optional `secrets.toml`
    pub const CONFIG_DIR: &str = "config";

    /// Line-delimited list of device addresses
    pub const INVENTORY_FILE: &str = "hosts.txt";

    /// Root of the backup store swept by the retention job
    pub const BACKUP_DIR: &str = "backups";
}

/// Strings sent over the interactive shell
pub mod protocol {
    /// Disables output paging so long output is not held behind `--More--`
    pub const DISABLE_PAGING: &str = "terminal length 0";

    /// Starts a push of the running config over TFTP
    pub const COPY_RUNNING_TO_TFTP: &str = "copy run tftp";

    /// Prints the running config into the session (direct mode)
    pub const SHOW_RUNNING_CONFIG: &str = "show running-config";

    /// Marker placed between the capture timestamp and the host in file names
    pub const FILENAME_MARKER: &str = "_cisco_backup_";

    /// Extension of every backup file
    pub const FILENAME_EXTENSION: &str = "cfg";

    /// `strftime` layout of the capture timestamp
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H.%M.%S";

    /// Matches an IOS exec prompt as the last line of the buffer, with
    /// nothing after it but an optional space, e.g. `core-sw1#`
    pub const DEFAULT_PROMPT_PATTERN: &str = r"(?:^|\n)[\w.\-()/]+[#>] ?$";

    /// Last line of every `show running-config` listing
    pub const CONFIG_END_MARKER: &str = "end";
}

/// SSH session defaults
pub mod ssh {
    use super::Duration;

    pub const DEFAULT_PORT: u16 = 22;

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Upper bound of the single post-sequence read
    pub const READ_BUFFER_BYTES: usize = 65535;

    /// How long the bounded read waits for the first byte
    pub const READ_TIMEOUT: Duration = Duration::from_secs(5);

    /// Once data is flowing, a gap this long means the buffer is drained
    pub const DRAIN_GAP: Duration = Duration::from_millis(50);

    pub const PTY_TERM: &str = "vt100";
    pub const PTY_COLUMNS: u32 = 200;
    pub const PTY_ROWS: u32 = 24;
}

/// Delays between the steps of the capture sequence
pub mod delays {
    use super::Duration;

    /// After the shell opens, before the first command
    pub const SHELL_SETTLE: Duration = Duration::from_secs(1);

    /// After `terminal length 0`
    pub const AFTER_PAGINATION: Duration = Duration::from_secs(1);

    /// After `copy run tftp`
    pub const AFTER_COPY: Duration = Duration::from_secs(2);

    /// After the transfer target address
    pub const AFTER_TARGET: Duration = Duration::from_secs(2);

    /// After the file name, before the bounded read
    pub const AFTER_FILENAME: Duration = Duration::from_secs(2);

    /// Pause after each device, success or not
    pub const INTER_DEVICE_PAUSE: Duration = Duration::from_secs(2);

    /// Direct mode: overall budget for `show running-config` to finish
    pub const DIRECT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(60);

    /// Upper bound accepted for `capture.direct_timeout_seconds`
    pub const MAX_DIRECT_CAPTURE_TIMEOUT_SECONDS: u64 = 24 * 60 * 60;

    /// Direct mode: wait per read while collecting output
    pub const DIRECT_IDLE: Duration = Duration::from_millis(1500);
}

/// Scheduler defaults
pub mod schedule {
    pub const BACKUP_INTERVAL_SECONDS: u64 = 30;
    pub const RETENTION_INTERVAL_SECONDS: u64 = 30;

    /// Upper bound accepted for either cycle interval (10 years)
    pub const MAX_INTERVAL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

    /// Sleep between two "is anything due?" checks
    pub const POLL_INTERVAL_MS: u64 = 1000;
}

/// Retention defaults
pub mod retention {
    /// 30 days
    pub const MAX_AGE_SECONDS: u64 = 30 * 24 * 60 * 60;
}

/// Default transfer target for the side-channel (TFTP) push
pub const DEFAULT_TRANSFER_TARGET: &str = "127.0.0.1";
