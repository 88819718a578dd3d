//! The published settings: a read-only view over a validated result set.

use std::collections::BTreeMap;

use uuid::Uuid;

use termcascade_core::{
    parse_guid, ColorScheme, GlobalSettings, KeyMapping, LoadError, Profile, SettingsLoadWarning,
};

use super::result_set::ResultSet;

/// Arguments of a "new terminal" request that pick a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTerminalArgs {
    /// A profile GUID (braced or bare) or display name.
    pub profile: Option<String>,
    /// Position in the full profile list.
    pub profile_index: Option<i32>,
}

/// Fully resolved settings for one load.
///
/// Only built once every validation step passed, so the default profile
/// always exists and GUIDs are unique.
#[derive(Debug, Clone)]
pub struct Settings {
    globals: GlobalSettings,
    all_profiles: Vec<Profile>,
    visible_profiles: Vec<Profile>,
    schemes: BTreeMap<String, ColorScheme>,
    warnings: Vec<SettingsLoadWarning>,
    default_index: usize,
}

impl Settings {
    /// Wraps a validated result set.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnresolvedDefaultProfile`] if the pinned default
    /// profile is not in the set.
    pub fn from_result(result: ResultSet) -> Result<Self, LoadError> {
        let default_index = result
            .globals
            .resolved_default_profile
            .and_then(|guid| result.position_of(guid))
            .ok_or_else(|| {
                LoadError::UnresolvedDefaultProfile(
                    result.globals.default_profile.clone().unwrap_or_default(),
                )
            })?;

        let visible_profiles = result
            .visible
            .iter()
            .filter_map(|&i| result.profiles.get(i).cloned())
            .collect();

        Ok(Self {
            globals: result.globals,
            all_profiles: result.profiles,
            visible_profiles,
            schemes: result.schemes,
            warnings: result.warnings,
            default_index,
        })
    }

    pub fn globals(&self) -> &GlobalSettings {
        &self.globals
    }

    /// Listed profiles, in display order, hidden ones excluded.
    pub fn profiles(&self) -> &[Profile] {
        &self.visible_profiles
    }

    /// Every profile, hidden ones included.
    pub fn all_profiles(&self) -> &[Profile] {
        &self.all_profiles
    }

    pub fn key_map(&self) -> &KeyMapping {
        &self.globals.keymap
    }

    /// Warnings raised by the load, in the order they were raised.
    pub fn warnings(&self) -> &[SettingsLoadWarning] {
        &self.warnings
    }

    pub fn schemes(&self) -> &BTreeMap<String, ColorScheme> {
        &self.schemes
    }

    /// Looks a profile up by GUID; hidden profiles are found too.
    pub fn find_profile(&self, guid: Uuid) -> Option<&Profile> {
        self.all_profiles.iter().find(|p| p.effective_guid() == guid)
    }

    /// Looks a profile up by its position in [`Settings::all_profiles`].
    pub fn profile_by_index(&self, index: usize) -> Option<&Profile> {
        self.all_profiles.get(index)
    }

    /// Returns the GUID of the first profile called `name`.
    pub fn profile_guid_by_name(&self, name: &str) -> Option<Uuid> {
        self.all_profiles
            .iter()
            .find(|p| p.name == name)
            .map(Profile::effective_guid)
    }

    /// Returns the color scheme the profile `guid` uses.
    pub fn color_scheme_for_profile(&self, guid: Uuid) -> Option<&ColorScheme> {
        let name = self.find_profile(guid)?.color_scheme.as_deref()?;
        self.schemes.get(name)
    }

    pub fn default_profile(&self) -> &Profile {
        &self.all_profiles[self.default_index]
    }

    pub fn default_profile_guid(&self) -> Uuid {
        self.default_profile().effective_guid()
    }

    /// Picks the profile a new terminal should use.
    ///
    /// Tries, in order: `profile` as a GUID, `profile` as a name,
    /// `profile_index`, and finally the default profile.
    pub fn profile_for_args(&self, args: &NewTerminalArgs) -> Uuid {
        if let Some(reference) = args.profile.as_deref() {
            let by_guid = parse_guid(reference).filter(|g| self.find_profile(*g).is_some());
            if let Some(guid) = by_guid.or_else(|| self.profile_guid_by_name(reference)) {
                return guid;
            }
            tracing::debug!("no profile matches {reference:?}");
        }

        let by_index = args
            .profile_index
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.profile_by_index(i));
        match by_index {
            Some(profile) => profile.effective_guid(),
            None => self.default_profile_guid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::load_settings::SettingsLoader;

    const DOC: &str = r##"{
        "defaultProfile": "B",
        "profiles": [
            {"name": "A", "colorScheme": "Campbell"},
            {"name": "B"},
            {"name": "Secret", "hidden": true}
        ],
        "schemes": [{"name": "Campbell", "background": "#0C0C0C"}]
    }"##;

    fn settings() -> Settings {
        SettingsLoader::from_json(DOC).unwrap()
    }

    fn guid(name: &str) -> Uuid {
        termcascade_core::derive_profile_guid(name, None)
    }

    #[test]
    fn test_profiles_hides_hidden_but_lookup_finds_them() {
        let s = settings();

        assert_eq!(s.profiles().len(), 2);
        assert_eq!(s.all_profiles().len(), 3);
        assert_eq!(s.find_profile(guid("Secret")).unwrap().name, "Secret");
        assert_eq!(s.profile_by_index(2).unwrap().name, "Secret");
    }

    #[test]
    fn test_default_profile_is_resolved() {
        let s = settings();
        assert_eq!(s.default_profile().name, "B");
        assert_eq!(s.default_profile_guid(), guid("B"));
    }

    #[test]
    fn test_scheme_colors_survive_loading() {
        let s = settings();

        let scheme = s.color_scheme_for_profile(guid("A")).unwrap();

        assert_eq!(scheme.colors["background"], "#0C0C0C");
    }

    #[test]
    fn test_color_scheme_for_profile() {
        let s = settings();
        assert_eq!(s.color_scheme_for_profile(guid("A")).unwrap().name, "Campbell");
        assert!(s.color_scheme_for_profile(guid("B")).is_none());
    }

    #[test]
    fn test_profile_for_args_resolution_order() {
        // Arrange
        let s = settings();
        let by = |profile: Option<&str>, index: Option<i32>| {
            s.profile_for_args(&NewTerminalArgs {
                profile: profile.map(str::to_string),
                profile_index: index,
            })
        };
        let a_guid = guid("A").braced().to_string();

        // Act / Assert
        assert_eq!(by(Some(&a_guid), Some(1)), guid("A"));
        assert_eq!(by(Some("Secret"), None), guid("Secret"));
        assert_eq!(by(Some("Nobody"), Some(0)), guid("A"));
        assert_eq!(by(None, Some(2)), guid("Secret"));
        assert_eq!(by(None, Some(-1)), guid("B"));
        assert_eq!(by(None, Some(99)), guid("B"));
        assert_eq!(by(None, None), guid("B"));
    }

    #[test]
    fn test_from_result_requires_pinned_default() {
        let mut result = ResultSet::new();
        result.profiles.push(Profile::new("A", termcascade_core::ProfileOrigin::User));

        let err = Settings::from_result(result).unwrap_err();

        assert!(matches!(err, LoadError::UnresolvedDefaultProfile(_)));
    }
}
