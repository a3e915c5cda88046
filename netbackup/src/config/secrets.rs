// File: netbackup/src/config/secrets.rs
//! Secrets loader for the shared device password.
//!
//! The password can live in a separate TOML file (config/secrets.toml) that
//! is kept out of version control while main.toml is not. When present it
//! overrides `credentials.password` from main.toml.
//!
//! Example secrets.toml:
//! ```toml
//! [credentials]
//! password = "device-password"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Default)]
pub struct SecretsFile {
    #[serde(default)]
    pub credentials: CredentialSecrets,
}

#[derive(Debug, Deserialize, Default)]
pub struct CredentialSecrets {
    pub password: Option<String>,
}

pub struct SecretsLoader {
    secrets: SecretsFile,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            debug!(
                "No secrets file at {:?}, using credentials from main.toml",
                secrets_path
            );
            return Ok(Self {
                secrets: SecretsFile::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: SecretsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!("Loaded device credentials from {:?}", secrets_path);

        Ok(Self { secrets })
    }

    pub fn credentials_password(&self) -> Option<&str> {
        self.secrets
            .credentials
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
    }
}
