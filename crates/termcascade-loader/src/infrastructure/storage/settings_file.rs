//! File-backed user settings document.
//!
//! Writes go through `atomicwrites`: the new text is written to a temporary
//! file in the same directory and renamed over the target, so a concurrent
//! reader sees either the old document or the new one.

use std::io::Write;
use std::path::{Path, PathBuf};

use atomicwrites::{AllowOverwrite, AtomicFile};

use crate::application::persistence::{PersistenceError, SettingsPersistence};

/// The user settings document at a fixed path.
#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsPersistence for FileSettingsStore {
    fn read_user_document(&self) -> Result<Option<String>, PersistenceError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_user_document(&self, text: &str) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
        }

        AtomicFile::new(&self.path, AllowOverwrite)
            .write(|f| f.write_all(text.as_bytes()))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(source) | atomicwrites::Error::User(source) => {
                    self.io_error(source)
                }
            })?;
        tracing::debug!("wrote user settings to {}", self.path.display());
        Ok(())
    }

    fn settings_path(&self) -> PathBuf {
        self.path.clone()
    }
}
