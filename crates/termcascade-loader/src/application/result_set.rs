//! The accumulator threaded through every stage of a load.

use std::collections::{BTreeMap, BTreeSet};

use termcascade_core::domain::value::JsonObject;
use termcascade_core::{ColorScheme, GlobalSettings, Profile, SettingsLoadWarning};

/// Everything a load has resolved so far.
///
/// Owned by exactly one load.  Layering and dynamic loading mutate it in
/// place; each validation step consumes it and returns the next version.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// Profiles in their current order (defaults first, then new user and
    /// generated profiles).
    pub profiles: Vec<Profile>,
    /// Color schemes by name.
    pub schemes: BTreeMap<String, ColorScheme>,
    pub globals: GlobalSettings,
    /// Warnings raised so far, in emission order.
    pub warnings: Vec<SettingsLoadWarning>,
    /// Key binding problems, held back until the validation chain reports
    /// them.
    pub keybinding_warnings: Vec<SettingsLoadWarning>,
    /// Generator sources the documents disabled.
    pub excluded_sources: BTreeSet<String>,
    /// The user's `profiles.defaults` object, if any.
    pub profile_defaults: Option<JsonObject>,
    /// Positions in `profiles` of the profiles that are listed, set by the
    /// hidden-profile step.
    pub visible: Vec<usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the position of the profile whose GUID is `guid`.
    pub fn position_of(&self, guid: uuid::Uuid) -> Option<usize> {
        self.profiles.iter().position(|p| p.effective_guid() == guid)
    }
}
