//! File storage for config.toml and secret.json.

mod atomic_toml;
mod secret_storage;

pub use atomic_toml::AtomicTomlFile;
pub use secret_storage::SecretStorage;

use quill_core::error::Result;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `contents` to a dot-prefixed sibling, fsyncs it, then renames it
/// over `path`.
pub(crate) fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path)?;
    let mut tmp_file = File::create(&tmp_path)?;
    tmp_file.write_all(contents)?;
    tmp_file.sync_all()?;
    drop(tmp_file);

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        quill_core::QuillError::internal(format!("Path has no file name: {}", path.display()))
    })?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}
