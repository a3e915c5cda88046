//! Test configuration builder for writing config directories programmatically

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for a temp directory holding `config/main.toml`, an inventory
/// file and an empty backup directory. Every capture delay defaults to zero.
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    username: String,
    password: Option<String>,
    secrets_password: Option<String>,
    port: u16,
    mode: String,
    transfer_target: String,
    hosts: Option<String>,
    max_age_seconds: u64,
    backup_interval_seconds: u64,
    retention_interval_seconds: u64,
    extra: String,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            username: "backup".to_string(),
            password: Some("test-password".to_string()),
            secrets_password: None,
            port: 22,
            mode: "side_channel".to_string(),
            transfer_target: "198.51.100.10".to_string(),
            hosts: Some(String::new()),
            max_age_seconds: 1800,
            backup_interval_seconds: 30,
            retention_interval_seconds: 30,
            extra: String::new(),
        }
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    pub fn password(mut self, password: Option<&str>) -> Self {
        self.password = password.map(str::to_string);
        self
    }

    pub fn secrets_password(mut self, password: &str) -> Self {
        self.secrets_password = Some(password.to_string());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn mode(mut self, mode: &str) -> Self {
        self.mode = mode.to_string();
        self
    }

    pub fn transfer_target(mut self, target: &str) -> Self {
        self.transfer_target = target.to_string();
        self
    }

    /// Raw inventory file content.
    pub fn hosts(mut self, content: &str) -> Self {
        self.hosts = Some(content.to_string());
        self
    }

    /// Do not create the inventory file at all.
    pub fn without_inventory(mut self) -> Self {
        self.hosts = None;
        self
    }

    pub fn max_age_seconds(mut self, seconds: u64) -> Self {
        self.max_age_seconds = seconds;
        self
    }

    pub fn intervals(mut self, backup_seconds: u64, retention_seconds: u64) -> Self {
        self.backup_interval_seconds = backup_seconds;
        self.retention_interval_seconds = retention_seconds;
        self
    }

    /// Extra TOML appended to main.toml verbatim.
    pub fn extra(mut self, toml: &str) -> Self {
        self.extra.push_str(toml);
        self
    }

    pub fn build(self) -> TestConfig {
        let root = self.temp_dir.path().to_path_buf();
        let config_dir = root.join("config");
        let backup_dir = root.join("backups");
        let inventory_path = root.join("hosts.txt");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        fs::create_dir_all(&backup_dir).expect("Failed to create backup dir");

        if let Some(hosts) = &self.hosts {
            fs::write(&inventory_path, hosts).expect("Failed to write hosts.txt");
        }

        let password_line = self
            .password
            .as_deref()
            .map(|p| format!("password = \"{}\"\n", p))
            .unwrap_or_default();

        let main_toml = format!(
            r#"
inventory_path = "{inventory}"
backup_dir = "{backups}"

[credentials]
username = "{username}"
{password_line}port = {port}

[capture]
mode = "{mode}"
transfer_target = "{target}"
shell_settle_ms = 0
pagination_delay_ms = 0
copy_delay_ms = 0
target_delay_ms = 0
filename_delay_ms = 0
read_timeout_ms = 10
inter_device_pause_ms = 0
direct_timeout_seconds = 1
direct_idle_ms = 10

[schedule]
backup_interval_seconds = {backup_interval}
retention_interval_seconds = {retention_interval}
poll_interval_ms = 10

[retention]
max_age_seconds = {max_age}
{extra}"#,
            inventory = inventory_path.display(),
            backups = backup_dir.display(),
            username = self.username,
            password_line = password_line,
            port = self.port,
            mode = self.mode,
            target = self.transfer_target,
            backup_interval = self.backup_interval_seconds,
            retention_interval = self.retention_interval_seconds,
            max_age = self.max_age_seconds,
            extra = self.extra,
        );
        fs::write(config_dir.join("main.toml"), main_toml).expect("Failed to write main.toml");

        if let Some(secret) = &self.secrets_password {
            fs::write(
                config_dir.join("secrets.toml"),
                format!("[credentials]\npassword = \"{}\"\n", secret),
            )
            .expect("Failed to write secrets.toml");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
            backup_dir,
            inventory_path,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A written config directory; removed when dropped.
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub inventory_path: PathBuf,
}

impl TestConfig {
    pub async fn load(&self) -> netbackup::Config {
        let manager = netbackup::ConfigManager::new(&self.config_dir)
            .await
            .expect("Failed to load test config");
        (*manager.get_current_config()).clone()
    }
}
