//! Key bindings.
//!
//! Documents bind chords to commands in a `keybindings` array:
//!
//! ```json
//! "keybindings": [
//!     { "command": "copy", "keys": "ctrl+c" },
//!     { "command": { "action": "newTab", "index": 0 }, "keys": ["ctrl+shift+1"] },
//!     { "command": null, "keys": "ctrl+v" }
//! ]
//! ```
//!
//! A later document overrides an earlier one chord by chord; a `null` or
//! `"unbound"` command removes the binding.  Problems never fail a load:
//! [`KeyMapping::layer_json`] returns the warnings it found and the
//! validation chain reports them.

pub mod chord;

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

pub use chord::{Key, KeyChord, KeyChordError, NamedKey};

use crate::domain::warnings::SettingsLoadWarning;

const COMMAND_KEY: &str = "command";
const KEYS_KEY: &str = "keys";
const UNBOUND_COMMAND: &str = "unbound";

/// Chord → command value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMapping {
    bindings: BTreeMap<KeyChord, Value>,
}

impl KeyMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `chord` to `command`, replacing any existing binding.
    pub fn bind(&mut self, chord: KeyChord, command: Value) {
        self.bindings.insert(chord, command);
    }

    /// Removes the binding for `chord`, if any.
    pub fn unbind(&mut self, chord: &KeyChord) {
        self.bindings.remove(chord);
    }

    /// Returns the command bound to `chord`.
    pub fn command_for(&self, chord: &KeyChord) -> Option<&Value> {
        self.bindings.get(chord)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterates bindings in canonical chord order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyChord, &Value)> {
        self.bindings.iter()
    }

    /// Layers one document's `keybindings` array onto the mapping.
    ///
    /// Returns the warnings raised, in entry order.  Entries that produce a
    /// warning other than [`SettingsLoadWarning::DuplicateKeyChord`] are
    /// skipped; a duplicate chord still applies (last one wins).
    pub fn layer_json(&mut self, bindings: &[Value]) -> Vec<SettingsLoadWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for entry in bindings {
            let Some(obj) = entry.as_object() else {
                warnings.push(SettingsLoadWarning::InvalidKeyChord);
                continue;
            };

            let chord = match obj.get(KEYS_KEY) {
                Some(Value::String(text)) => KeyChord::parse(text),
                Some(Value::Array(items)) if items.len() == 1 => match items[0].as_str() {
                    Some(text) => KeyChord::parse(text),
                    None => Err(KeyChordError::Empty),
                },
                Some(Value::Array(items)) if items.len() > 1 => {
                    warnings.push(SettingsLoadWarning::TooManyKeysForChord);
                    continue;
                }
                _ => Err(KeyChordError::Empty),
            };
            let chord = match chord {
                Ok(chord) => chord,
                Err(e) => {
                    tracing::debug!("skipping key binding {entry}: {e}");
                    warnings.push(SettingsLoadWarning::InvalidKeyChord);
                    continue;
                }
            };

            let Some(command) = obj.get(COMMAND_KEY) else {
                warnings.push(SettingsLoadWarning::MissingKeybindingCommand);
                continue;
            };

            if !seen.insert(chord) {
                warnings.push(SettingsLoadWarning::DuplicateKeyChord);
            }

            match command {
                Value::Null => self.unbind(&chord),
                Value::String(s) if s == UNBOUND_COMMAND => self.unbind(&chord),
                other => self.bind(chord, other.clone()),
            }
        }

        warnings
    }
}
