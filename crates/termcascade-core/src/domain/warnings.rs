//! Load diagnostics.
//!
//! A load produces either a settings object plus an ordered list of
//! [`SettingsLoadWarning`]s, or a single [`LoadError`].  Warnings carry no
//! payload beyond their kind; the order they were raised in is the order a
//! UI shows them in.

use serde::Serialize;
use thiserror::Error;

/// A non-fatal problem found (and repaired or skipped) during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingsLoadWarning {
    /// The configured default profile does not exist.
    MissingDefaultProfile,
    /// Two or more profiles share a GUID.
    DuplicateProfile,
    /// A profile references a color scheme that does not exist.
    UnknownColorScheme,
    /// A background image value is malformed or unreadable.
    InvalidBackgroundImage,
    /// An icon value is malformed or unreadable.
    InvalidIcon,
    /// A configured font face is not installed.
    MissingFontFace,
    /// A key binding chord could not be parsed.
    InvalidKeyChord,
    /// A key binding lists more than one chord.
    TooManyKeysForChord,
    /// A key binding has keys but no command.
    MissingKeybindingCommand,
    /// One document binds the same chord twice.
    DuplicateKeyChord,
    /// The user document has a `globals` section, which is no longer read.
    LegacyGlobalsProperty,
    /// A profile entry could not be read and was skipped.
    MalformedProfileEntry,
    /// A color scheme entry could not be read and was skipped.
    MalformedColorSchemeEntry,
    /// A recognised setting holds a value of the wrong type.
    InvalidSettingType,
    /// A dynamic profile generator failed; it contributed no profiles.
    GeneratorFailed,
    /// Writing the updated user document failed.
    FailedToWriteToSettings,
}

impl std::fmt::Display for SettingsLoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::MissingDefaultProfile => "the default profile could not be found",
            Self::DuplicateProfile => "multiple profiles share the same GUID",
            Self::UnknownColorScheme => "a profile references an unknown color scheme",
            Self::InvalidBackgroundImage => "a background image could not be used",
            Self::InvalidIcon => "an icon could not be used",
            Self::MissingFontFace => "a font face is not installed",
            Self::InvalidKeyChord => "a key binding has an invalid key chord",
            Self::TooManyKeysForChord => "a key binding lists more than one key chord",
            Self::MissingKeybindingCommand => "a key binding has no command",
            Self::DuplicateKeyChord => "a key chord is bound more than once",
            Self::LegacyGlobalsProperty => "the `globals` section is ignored",
            Self::MalformedProfileEntry => "a profile entry was skipped",
            Self::MalformedColorSchemeEntry => "a color scheme entry was skipped",
            Self::InvalidSettingType => "a setting has a value of the wrong type",
            Self::GeneratorFailed => "a dynamic profile generator failed",
            Self::FailedToWriteToSettings => "the settings file could not be updated",
        };
        f.write_str(text)
    }
}

/// A failure that aborts the whole load; no settings are published.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The merged profile list is empty.
    #[error("no profiles are defined")]
    NoProfiles,

    /// Every profile is hidden, so there is nothing to launch.
    #[error("all profiles are hidden")]
    AllProfilesHidden,

    /// The default profile reference survived validation but cannot be
    /// resolved.
    #[error("default profile `{0}` could not be resolved")]
    UnresolvedDefaultProfile(String),

    /// The bundled default document is not valid JSON.
    #[error("failed to parse default settings: {0}")]
    DefaultsSyntax(#[source] serde_json::Error),

    /// The user document is not valid JSON.
    #[error("failed to parse user settings: {0}")]
    UserSyntax(#[source] serde_json::Error),

    /// A settings document's root is not a JSON object.
    #[error("settings document root must be an object")]
    RootNotObject,

    /// The user document could not be read.
    #[error("failed to read user settings: {0}")]
    ReadUserSettings(String),

    /// The load was cancelled before it finished.
    #[error("settings load was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_serializes_as_camel_case_kind() {
        let text = serde_json::to_string(&SettingsLoadWarning::MissingDefaultProfile).unwrap();
        assert_eq!(text, "\"missingDefaultProfile\"");
    }

    #[test]
    fn test_load_error_messages_are_human_readable() {
        assert_eq!(LoadError::NoProfiles.to_string(), "no profiles are defined");
        assert_eq!(
            LoadError::UnresolvedDefaultProfile("Foo".into()).to_string(),
            "default profile `Foo` could not be resolved"
        );
    }
}
