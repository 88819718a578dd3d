//! The user-document storage contract.
//!
//! The loader never opens files itself.  It asks a [`SettingsPersistence`]
//! for the user document's text and hands back the updated text when
//! dynamic profiles were added.  See `infrastructure::storage` for the file
//! and in-memory implementations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`SettingsPersistence`] implementation.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings store is read-only")]
    ReadOnly,
}

/// Reads and writes the user settings document.
pub trait SettingsPersistence: Send + Sync {
    /// Returns the document text, or `None` when there is no user document.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the document exists but cannot be
    /// read.
    fn read_user_document(&self) -> Result<Option<String>, PersistenceError>;

    /// Replaces the document with `text`.  Readers never observe a partial
    /// write.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the replacement could not be made.
    fn write_user_document(&self, text: &str) -> Result<(), PersistenceError>;

    /// Where the document lives, for diagnostics.
    fn settings_path(&self) -> PathBuf;
}
