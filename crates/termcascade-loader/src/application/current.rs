//! The "current settings" handle.
//!
//! Loads are independent; the only thing that outlives one is the settings
//! object the application decided to use.  The composition root owns a
//! [`SettingsHandle`] and passes it to whoever needs the current settings.
//! A reload builds a new [`Settings`] and publishes it; readers holding the
//! previous `Arc` keep a consistent snapshot.

use std::sync::{Arc, RwLock};

use super::settings::Settings;

/// Single-writer, many-reader slot for the published settings.
#[derive(Debug, Default)]
pub struct SettingsHandle {
    slot: RwLock<Option<Arc<Settings>>>,
}

impl SettingsHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current settings.
    pub fn publish(&self, settings: Arc<Settings>) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(settings);
        tracing::debug!("published new settings");
    }

    /// Returns the latest published settings, if any.
    pub fn current(&self) -> Option<Arc<Settings>> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::load_settings::SettingsLoader;

    #[test]
    fn test_handle_starts_empty() {
        assert!(SettingsHandle::new().current().is_none());
    }

    #[test]
    fn test_publish_replaces_previous_snapshot() {
        // Arrange
        let handle = SettingsHandle::new();
        let first = Arc::new(SettingsLoader::from_json(r#"{"profiles": [{"name": "A"}]}"#).unwrap());
        let second = Arc::new(SettingsLoader::from_json(r#"{"profiles": [{"name": "B"}]}"#).unwrap());

        // Act
        handle.publish(Arc::clone(&first));
        let held = handle.current().unwrap();
        handle.publish(Arc::clone(&second));

        // Assert
        assert_eq!(held.profiles()[0].name, "A");
        assert_eq!(handle.current().unwrap().profiles()[0].name, "B");
    }
}
