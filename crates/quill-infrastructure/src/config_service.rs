//! Configuration service.
//!
//! Reads config.toml and secret.json once, caches the merged result and
//! serves it to the stream client through [`ConfigProvider`].
//!
//! Fallbacks: `QUILL_API_KEY` when secret.json has no key; `QUILL_BASE_URL`
//! and `QUILL_MODEL` when config.toml does not exist yet.

use quill_core::config::{AiSettings, AppConfig, AssistConfig};
use quill_core::editor::ConfigProvider;
use quill_core::error::Result;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::paths::QuillPaths;
use crate::storage::{AtomicTomlFile, SecretStorage};

pub const API_KEY_ENV: &str = "QUILL_API_KEY";
pub const BASE_URL_ENV: &str = "QUILL_BASE_URL";
pub const MODEL_ENV: &str = "QUILL_MODEL";

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Loads and caches configuration.
#[derive(Clone)]
pub struct ConfigService {
    paths: QuillPaths,
    env: EnvLookup,
    cache: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Uses the platform config directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_paths(QuillPaths::resolve()?))
    }

    pub fn with_paths(paths: QuillPaths) -> Self {
        Self {
            paths,
            env: Arc::new(|key| std::env::var(key).ok()),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Replaces the environment lookup.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self.invalidate_cache();
        self
    }

    pub fn paths(&self) -> &QuillPaths {
        &self.paths
    }

    /// Merged configuration, loading on first access.
    ///
    /// Unreadable files are logged and replaced by defaults.
    pub fn app_config(&self) -> AppConfig {
        if let Some(cached) = self.read_cache().as_ref() {
            return cached.clone();
        }

        let loaded = self.load();
        *self.write_cache() = Some(loaded.clone());
        loaded
    }

    pub fn ai_settings(&self) -> AiSettings {
        self.app_config().ai
    }

    pub fn assist_config(&self) -> AssistConfig {
        self.app_config().assist
    }

    /// Persists AI settings: key to secret.json, the rest to config.toml.
    pub fn save_ai_settings(&self, settings: &AiSettings) -> Result<()> {
        self.config_file().update(AppConfig::default(), |config| {
            config.ai = AiSettings {
                api_key: String::new(),
                ..settings.clone()
            };
            Ok(())
        })?;
        self.secret_storage().save_api_key(&settings.api_key)?;
        self.invalidate_cache();

        tracing::info!(
            "[ConfigService] saved AI settings: provider={:?}, model={}",
            settings.provider,
            settings.model
        );
        Ok(())
    }

    pub fn save_assist_config(&self, assist: &AssistConfig) -> Result<()> {
        self.config_file().update(AppConfig::default(), |config| {
            config.assist = assist.clone();
            Ok(())
        })?;
        self.invalidate_cache();
        Ok(())
    }

    /// Forces a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.write_cache() = None;
    }

    fn load(&self) -> AppConfig {
        let config_file = self.config_file();
        let mut config = match config_file.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::debug!(
                    "[ConfigService] {} not found, using defaults",
                    config_file.path().display()
                );
                let mut config = AppConfig::default();
                if let Some(base_url) = (self.env)(BASE_URL_ENV) {
                    config.ai.base_url = base_url;
                }
                if let Some(model) = (self.env)(MODEL_ENV) {
                    config.ai.model = model;
                }
                config
            }
            Err(err) => {
                tracing::warn!("[ConfigService] failed to load config.toml: {}", err);
                AppConfig::default()
            }
        };

        let stored_key = match self.secret_storage().load_or_default() {
            Ok(secret) => secret.ai.map(|ai| ai.api_key),
            Err(err) => {
                tracing::warn!("[ConfigService] failed to load secret.json: {}", err);
                None
            }
        };
        config.ai.api_key = stored_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| (self.env)(API_KEY_ENV))
            .unwrap_or_default();

        config
    }

    fn config_file(&self) -> AtomicTomlFile<AppConfig> {
        AtomicTomlFile::new(self.paths.config_file())
    }

    fn secret_storage(&self) -> SecretStorage {
        SecretStorage::with_path(self.paths.secret_file())
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, Option<AppConfig>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, Option<AppConfig>> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfigProvider for ConfigService {
    fn get(&self) -> AiSettings {
        self.ai_settings()
    }
}

impl std::fmt::Debug for ConfigService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigService")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
