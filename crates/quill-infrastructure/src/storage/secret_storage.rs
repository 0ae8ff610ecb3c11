//! secret.json storage.
//!
//! The API key is kept out of config.toml so the latter can be shared or
//! synced. The file is plaintext JSON and is written with mode 600 on Unix.

use quill_core::config::{AiSecret, SecretConfig};
use quill_core::error::{QuillError, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::write_atomically;

pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads secret.json. A missing file is [`QuillError::NotFound`].
    pub fn load(&self) -> Result<SecretConfig> {
        if !self.path.exists() {
            return Err(QuillError::not_found(
                "secret file",
                self.path.display().to_string(),
            ));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Like [`load`](Self::load) but a missing file is an empty config.
    pub fn load_or_default(&self) -> Result<SecretConfig> {
        match self.load() {
            Err(err) if err.is_not_found() => Ok(SecretConfig::default()),
            other => other,
        }
    }

    pub fn save(&self, config: &SecretConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomically(&self.path, json.as_bytes())?;
        restrict_permissions(&self.path)
    }

    /// Stores `api_key`, or removes the AI entry when it is blank.
    pub fn save_api_key(&self, api_key: &str) -> Result<()> {
        let mut config = self.load_or_default()?;
        let api_key = api_key.trim();
        config.ai = (!api_key.is_empty()).then(|| AiSecret {
            api_key: api_key.to_string(),
        });
        self.save(&config)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
