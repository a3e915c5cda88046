// File: netbackup/src/config/manager.rs
use super::{Config, SecretsLoader};
use crate::errors::ConfigError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

pub struct ConfigManager {
    config_dir: PathBuf,
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: impl Into<PathBuf>) -> Result<Self> {
        let config_dir = config_dir.into();
        let config = Self::load_configuration(&config_dir).await?;
        Ok(Self {
            config_dir,
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    async fn load_configuration(config_dir: &Path) -> Result<Config, ConfigError> {
        let main_config_path = config_dir.join("main.toml");
        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.display().to_string(),
                    reason: e.to_string(),
                })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                path: main_config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        // secrets.toml wins over an inline password
        let secrets_path = config_dir.join("secrets.toml");
        let secrets = SecretsLoader::load(&secrets_path).map_err(|e| ConfigError::LoadFailed {
            path: secrets_path.display().to_string(),
            reason: format!("{:#}", e),
        })?;
        if let Some(password) = secrets.credentials_password() {
            debug!("Using SSH password from {}", secrets_path.display());
            config.credentials.password = Some(password.to_string());
        }

        config.validate()?;

        info!(
            "Loaded configuration: inventory {}, backups in {}, mode {}, backup every {}s, retention sweep every {}s, max age {}s",
            config.inventory_path.display(),
            config.backup_dir.display(),
            config.capture.mode,
            config.schedule.backup_interval_seconds,
            config.schedule.retention_interval_seconds,
            config.retention.max_age_seconds
        );

        Ok(config)
    }
}
