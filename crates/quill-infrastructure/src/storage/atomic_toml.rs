//! TOML file with atomic saves and locked read-modify-write updates.

use quill_core::QuillError;
use quill_core::error::Result;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::write_atomically;

/// Handle to one TOML file.
///
/// Saves go through a temp file + fsync + rename, so a crash leaves either
/// the old or the new contents. [`update`](Self::update) holds an exclusive
/// lock for the whole read-modify-write.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file is missing or blank.
    pub fn load(&self) -> Result<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let data: T = toml::from_str(&content)?;
        Ok(Some(data))
    }

    pub fn save(&self, data: &T) -> Result<()> {
        let toml_string = toml::to_string_pretty(data)?;
        write_atomically(&self.path, toml_string.as_bytes())
    }

    /// Loads (or starts from `default_value`), applies `f`, saves.
    pub fn update<F>(&self, default_value: T, f: F) -> Result<()>
    where
        F: FnOnce(&mut T) -> Result<()>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load_or_recover()?.unwrap_or(default_value);
        f(&mut data)?;
        self.save(&data)
    }

    /// Like [`load`](Self::load), but an unparseable file is copied to
    /// [`backup_path`](Self::backup_path) and treated as missing.
    pub fn load_or_recover(&self) -> Result<Option<T>> {
        match self.load() {
            Err(QuillError::Serialization { message, .. }) => {
                let backup = self.backup_path();
                fs::copy(&self.path, &backup)?;
                tracing::warn!(
                    "[AtomicTomlFile] {} is unreadable ({}); backed up to {}",
                    self.path.display(),
                    message,
                    backup.display()
                );
                Ok(None)
            }
            other => other,
        }
    }

    /// `<file>.backup` next to the file.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".backup");
        self.path.with_file_name(name)
    }
}

/// Exclusive lock on `<file>.lock`, released and removed on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| QuillError::internal(format!("Failed to acquire lock: {e}")))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::config::{AppConfig, AssistConfig};
    use tempfile::TempDir;

    #[test]
    fn save_then_load_app_config() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<AppConfig>::new(temp_dir.path().join("config.toml"));

        let mut config = AppConfig::default();
        config.ai.model = "gpt-4o-mini".into();
        config.assist.suppression_window_ms = 250;
        file.save(&config).unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.ai.model, "gpt-4o-mini");
        assert_eq!(loaded.assist.suppression_window_ms, 250);
    }

    #[test]
    fn missing_or_blank_file_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let file = AtomicTomlFile::<AppConfig>::new(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn invalid_toml_is_a_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[ai\nmodel = ").unwrap();

        let file = AtomicTomlFile::<AppConfig>::new(path);
        let err = file.load().unwrap_err();
        assert!(matches!(err, QuillError::Serialization { ref format, .. } if format == "TOML"));
    }

    #[test]
    fn update_over_invalid_toml_backs_up_and_rebuilds() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[ai\nbroken").unwrap();

        let file = AtomicTomlFile::<AppConfig>::new(path);
        file.update(AppConfig::default(), |config| {
            config.ai.model = "gpt-4o".into();
            Ok(())
        })
        .unwrap();

        let backup = temp_dir.path().join("config.toml.backup");
        assert_eq!(file.backup_path(), backup);
        assert_eq!(fs::read_to_string(&backup).unwrap(), "[ai\nbroken");
        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.ai.model, "gpt-4o");
        assert_eq!(loaded.assist, AssistConfig::default());
    }

    #[test]
    fn update_applies_on_top_of_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<AppConfig>::new(temp_dir.path().join("config.toml"));

        file.update(AppConfig::default(), |config| {
            config.assist.notice_duration_ms = 5000;
            Ok(())
        })
        .unwrap();
        file.update(AppConfig::default(), |config| {
            config.ai.model = "qwen-plus".into();
            Ok(())
        })
        .unwrap();

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.assist.notice_duration_ms, 5000);
        assert_eq!(loaded.ai.model, "qwen-plus");
        assert!(!temp_dir.path().join("config.lock").exists());
        assert!(!temp_dir.path().join(".config.toml.tmp").exists());
    }
}
