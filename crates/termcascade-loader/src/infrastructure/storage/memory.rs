//! In-memory settings store for unit testing.
//!
//! Lets tests drive full loads (including write-back) without touching the
//! file system, and inspect what the loader wrote.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::application::persistence::{PersistenceError, SettingsPersistence};

/// An in-memory implementation of [`SettingsPersistence`].
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    document: Arc<Mutex<Option<String>>>,
    write_count: Arc<Mutex<usize>>,
    read_only: bool,
}

impl MemorySettingsStore {
    /// Creates a store with no user document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `text` as the user document.
    pub fn with_document(text: impl Into<String>) -> Self {
        let store = Self::new();
        *store.document.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.into());
        store
    }

    /// Makes every write fail with [`PersistenceError::ReadOnly`].
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// The current document text.
    pub fn document(&self) -> Option<String> {
        self.document
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        *self.write_count.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SettingsPersistence for MemorySettingsStore {
    fn read_user_document(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.document())
    }

    fn write_user_document(&self, text: &str) -> Result<(), PersistenceError> {
        if self.read_only {
            return Err(PersistenceError::ReadOnly);
        }
        *self.document.lock().unwrap_or_else(|e| e.into_inner()) = Some(text.to_string());
        *self.write_count.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        Ok(())
    }

    fn settings_path(&self) -> PathBuf {
        PathBuf::from("memory://settings.json")
    }
}
