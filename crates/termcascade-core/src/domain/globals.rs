//! App-wide settings.
//!
//! Global options live at the top level of a settings document, next to the
//! sections the engine reads itself (`profiles`, `schemes`, ...).  Those
//! section keys are skipped here.

use uuid::Uuid;

use super::value::{get_string, EntryError, JsonObject};
use crate::keymap::KeyMapping;

pub const DEFAULT_PROFILE_KEY: &str = "defaultProfile";

/// Top-level keys that are document sections, not global options.
pub const SECTION_KEYS: [&str; 6] = [
    "profiles",
    "schemes",
    "keybindings",
    "disabledProfileSources",
    "globals",
    "$schema",
];

/// Global settings for one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSettings {
    /// The configured default profile: a GUID (braced or bare) or a name.
    pub default_profile: Option<String>,
    /// The default profile pinned by validation.
    pub resolved_default_profile: Option<Uuid>,
    /// Every other top-level option, untouched.
    pub options: JsonObject,
    /// Chord → command bindings.
    pub keymap: KeyMapping,
}

impl GlobalSettings {
    /// Layers the top-level options of a document.
    ///
    /// Options other than `defaultProfile` are always applied, even when
    /// `defaultProfile` has the wrong type.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::WrongType`] when `defaultProfile` is not a
    /// string; the previous value is kept.
    pub fn layer_json(&mut self, root: &JsonObject) -> Result<(), EntryError> {
        for (key, value) in root {
            if key == DEFAULT_PROFILE_KEY || SECTION_KEYS.contains(&key.as_str()) {
                continue;
            }
            self.options.insert(key.clone(), value.clone());
        }
        if let Some(default_profile) = get_string(root, DEFAULT_PROFILE_KEY)? {
            self.default_profile = Some(default_profile);
        }
        Ok(())
    }
}
