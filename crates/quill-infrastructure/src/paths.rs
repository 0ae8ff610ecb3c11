//! Path layout for Quill's configuration.
//!
//! ```text
//! ~/.config/quill/         # dirs::config_dir() + "quill"
//! ├── config.toml          # [ai] provider/base_url/model, [assist] timings
//! ├── secret.json          # API key
//! └── logs/
//!     └── quill.log.YYYY-MM-DD
//! ```

use quill_core::error::{QuillError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "quill";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuillPaths {
    root: PathBuf,
}

impl QuillPaths {
    /// Resolves the platform config directory.
    pub fn resolve() -> Result<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| QuillError::config("Cannot determine the config directory"))?;
        Ok(Self::at(base.join(APP_DIR)))
    }

    /// Uses `root` as the config directory (tests, portable installs).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Keep this file at 600 on Unix.
    pub fn secret_file(&self) -> PathBuf {
        self.root.join("secret.json")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_root() {
        let paths = QuillPaths::at("/tmp/quill-test");
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/quill-test/config.toml"));
        assert_eq!(paths.secret_file(), PathBuf::from("/tmp/quill-test/secret.json"));
        assert_eq!(paths.logs_dir(), PathBuf::from("/tmp/quill-test/logs"));
    }
}
