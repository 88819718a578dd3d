//! The profile record.
//!
//! A profile is one launchable terminal configuration.  The engine only
//! inspects a few of its fields; everything else rides along in an opaque,
//! insertion-ordered settings bag.
//!
//! # Identity
//!
//! Every profile is identified by a GUID.  Documents may omit it, in which
//! case it is derived with UUIDv5 from the profile name (and the source tag
//! for generated profiles), so the same profile gets the same identifier on
//! every load:
//!
//! ```text
//! no source:   v5(PROFILE_NAMESPACE, name)
//! with source: v5(v5(PROFILE_NAMESPACE, source), name)
//! ```

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::value::{get_bool, get_nullable_string, get_string, EntryError, JsonObject};

/// Namespace for derived profile GUIDs.
pub const PROFILE_NAMESPACE: Uuid = Uuid::from_u128(0x2bde4a90_d05f_401c_9492_e40884ead1d8);

pub const GUID_KEY: &str = "guid";
pub const NAME_KEY: &str = "name";
pub const HIDDEN_KEY: &str = "hidden";
pub const SOURCE_KEY: &str = "source";
pub const COLOR_SCHEME_KEY: &str = "colorScheme";
pub const BACKGROUND_IMAGE_KEY: &str = "backgroundImage";
pub const ICON_KEY: &str = "icon";
pub const FONT_FACE_KEY: &str = "fontFace";

/// Keys read into typed fields instead of the settings bag.
const TYPED_KEYS: [&str; 8] = [
    GUID_KEY,
    NAME_KEY,
    HIDDEN_KEY,
    SOURCE_KEY,
    COLOR_SCHEME_KEY,
    BACKGROUND_IMAGE_KEY,
    ICON_KEY,
    FONT_FACE_KEY,
];

/// Derives the stable GUID for a profile that does not carry one.
pub fn derive_profile_guid(name: &str, source: Option<&str>) -> Uuid {
    let namespace = match source {
        Some(source) => Uuid::new_v5(&PROFILE_NAMESPACE, source.as_bytes()),
        None => PROFILE_NAMESPACE,
    };
    Uuid::new_v5(&namespace, name.as_bytes())
}

/// Parses a GUID written either bare or wrapped in braces.
pub fn parse_guid(text: &str) -> Option<Uuid> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(trimmed);
    Uuid::parse_str(inner).ok()
}

/// Which stage of a load created a profile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileOrigin {
    /// Read from the bundled default document.
    Defaults,
    /// Created by an entry in the user document.
    User,
    /// Produced by a dynamic profile generator.
    Generator,
}

/// A single terminal profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Explicit identifier, if the document or generator supplied one.
    pub guid: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Hidden profiles are kept for lookups but not listed.
    pub hidden: bool,
    /// Generator namespace; `None` for hand-written profiles.
    pub source: Option<String>,
    /// Name of the color scheme this profile uses.
    pub color_scheme: Option<String>,
    /// Path or URI of the background image.
    pub background_image: Option<String>,
    /// Path or URI of the tab icon.
    pub icon: Option<String>,
    /// Font family name.
    pub font_face: Option<String>,
    /// Every other setting, untouched.
    pub settings: JsonObject,
    /// Stage that created the record.
    pub origin: ProfileOrigin,
    /// Keys set by the user document; generator refreshes leave them alone.
    overrides: BTreeSet<String>,
}

impl Profile {
    /// Creates a profile with only a name.
    pub fn new(name: impl Into<String>, origin: ProfileOrigin) -> Self {
        Self {
            guid: None,
            name: name.into(),
            hidden: false,
            source: None,
            color_scheme: None,
            background_image: None,
            icon: None,
            font_face: None,
            settings: JsonObject::new(),
            origin,
            overrides: BTreeSet::new(),
        }
    }

    /// Builds a new profile from a document entry.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::NotAnObject`] for non-object entries,
    /// [`EntryError::MissingField`] when there is no `name`, and any error
    /// from [`Profile::layer_json`].
    pub fn from_json(json: &Value, origin: ProfileOrigin) -> Result<Self, EntryError> {
        let obj = json.as_object().ok_or(EntryError::NotAnObject)?;
        let name = get_string(obj, NAME_KEY)?.ok_or(EntryError::MissingField(NAME_KEY))?;
        let mut profile = Profile::new(name, origin);
        profile.layer_json(obj)?;
        Ok(profile)
    }

    /// Layers `obj` on top of this profile.
    ///
    /// Keys present in `obj` win; absent keys keep their current value.  The
    /// whole entry is checked before anything is applied, so a rejected
    /// entry leaves the profile untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::WrongType`] or [`EntryError::MalformedGuid`]
    /// when a recognised field cannot be read.
    pub fn layer_json(&mut self, obj: &JsonObject) -> Result<(), EntryError> {
        self.apply(obj, &BTreeSet::new())
    }

    /// Refreshes this profile from a freshly generated candidate.
    ///
    /// Fields the user overrode are kept; everything else takes the
    /// candidate's value.
    pub fn refresh_from(&mut self, candidate: &Profile) {
        let mut skip = self.overrides.clone();
        // Identity is fixed once assigned.
        if self.guid.is_some() {
            skip.insert(GUID_KEY.to_string());
        }
        if let Err(e) = self.apply(&candidate.to_json(), &skip) {
            tracing::debug!("ignoring unreadable generator candidate {}: {e}", candidate.name);
        }
    }

    /// Records that the user document set `keys` on this profile.
    pub fn mark_overridden<'a>(&mut self, keys: impl IntoIterator<Item = &'a String>) {
        self.overrides.extend(keys.into_iter().cloned());
    }

    /// Returns `true` if the user document set `key` on this profile.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.overrides.contains(key)
    }

    /// The explicit GUID, or the derived one when none was given.
    pub fn effective_guid(&self) -> Uuid {
        self.guid
            .unwrap_or_else(|| derive_profile_guid(&self.name, self.source.as_deref()))
    }

    /// Assigns the derived GUID when the profile has none.
    ///
    /// Returns `true` if a GUID was assigned.
    pub fn generate_guid_if_necessary(&mut self) -> bool {
        if self.guid.is_some() {
            return false;
        }
        self.guid = Some(derive_profile_guid(&self.name, self.source.as_deref()));
        true
    }

    /// Serialises the profile back into a document entry.
    pub fn to_json(&self) -> JsonObject {
        let mut obj = JsonObject::new();
        if let Some(guid) = self.guid {
            obj.insert(GUID_KEY.into(), Value::String(guid.braced().to_string()));
        }
        obj.insert(NAME_KEY.into(), Value::String(self.name.clone()));
        obj.insert(HIDDEN_KEY.into(), Value::Bool(self.hidden));
        let optional = [
            (SOURCE_KEY, &self.source),
            (COLOR_SCHEME_KEY, &self.color_scheme),
            (BACKGROUND_IMAGE_KEY, &self.background_image),
            (ICON_KEY, &self.icon),
            (FONT_FACE_KEY, &self.font_face),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                obj.insert(key.into(), Value::String(value.clone()));
            }
        }
        for (key, value) in &self.settings {
            obj.insert(key.clone(), value.clone());
        }
        obj
    }

    /// The minimal entry written back to the user document for a generated
    /// profile.
    pub fn stub_json(&self) -> JsonObject {
        let mut obj = JsonObject::new();
        obj.insert(
            GUID_KEY.into(),
            Value::String(self.effective_guid().braced().to_string()),
        );
        obj.insert(HIDDEN_KEY.into(), Value::Bool(false));
        obj.insert(NAME_KEY.into(), Value::String(self.name.clone()));
        if let Some(source) = &self.source {
            obj.insert(SOURCE_KEY.into(), Value::String(source.clone()));
        }
        obj
    }

    /// An entry that only pins this profile's place in the user document.
    /// It names the profile but overrides nothing else.
    pub fn reference_json(&self) -> JsonObject {
        let mut obj = JsonObject::new();
        obj.insert(
            GUID_KEY.into(),
            Value::String(self.effective_guid().braced().to_string()),
        );
        obj.insert(NAME_KEY.into(), Value::String(self.name.clone()));
        if let Some(source) = &self.source {
            obj.insert(SOURCE_KEY.into(), Value::String(source.clone()));
        }
        obj
    }

    fn apply(&mut self, obj: &JsonObject, skip: &BTreeSet<String>) -> Result<(), EntryError> {
        let guid = match get_string(obj, GUID_KEY)? {
            Some(text) => Some(parse_guid(&text).ok_or(EntryError::MalformedGuid(text))?),
            None => None,
        };
        let name = get_string(obj, NAME_KEY)?;
        let hidden = get_bool(obj, HIDDEN_KEY)?;
        let source = get_nullable_string(obj, SOURCE_KEY)?;
        let color_scheme = get_nullable_string(obj, COLOR_SCHEME_KEY)?;
        let background_image = get_nullable_string(obj, BACKGROUND_IMAGE_KEY)?;
        let icon = get_nullable_string(obj, ICON_KEY)?;
        let font_face = get_nullable_string(obj, FONT_FACE_KEY)?;

        let keep = |key: &str| !skip.contains(key);

        if let Some(guid) = guid.filter(|_| keep(GUID_KEY)) {
            self.guid = Some(guid);
        }
        if let Some(name) = name.filter(|_| keep(NAME_KEY)) {
            self.name = name;
        }
        if let Some(hidden) = hidden.filter(|_| keep(HIDDEN_KEY)) {
            self.hidden = hidden;
        }
        let nullable = [
            (SOURCE_KEY, source, &mut self.source),
            (COLOR_SCHEME_KEY, color_scheme, &mut self.color_scheme),
            (BACKGROUND_IMAGE_KEY, background_image, &mut self.background_image),
            (ICON_KEY, icon, &mut self.icon),
            (FONT_FACE_KEY, font_face, &mut self.font_face),
        ];
        for (key, value, slot) in nullable {
            if let Some(value) = value.filter(|_| keep(key)) {
                *slot = value;
            }
        }

        for (key, value) in obj {
            if TYPED_KEYS.contains(&key.as_str()) || !keep(key) {
                continue;
            }
            self.settings.insert(key.clone(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> JsonObject {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_derived_guid_is_stable_across_calls() {
        let a = derive_profile_guid("PowerShell", None);
        let b = derive_profile_guid("PowerShell", None);
        assert_eq!(a, b);
    }

    #[test]
    fn test_derived_guid_depends_on_source() {
        let plain = derive_profile_guid("Ubuntu", None);
        let wsl = derive_profile_guid("Ubuntu", Some("Terminal.Wsl"));
        let other = derive_profile_guid("Ubuntu", Some("Terminal.Ssh"));
        assert_ne!(plain, wsl);
        assert_ne!(wsl, other);
    }

    #[test]
    fn test_parse_guid_accepts_braced_and_bare_forms() {
        let bare = parse_guid("61c54bbd-c2c6-5271-96e7-009a87ff44bf");
        let braced = parse_guid("{61c54bbd-c2c6-5271-96e7-009a87ff44bf}");
        assert!(bare.is_some());
        assert_eq!(bare, braced);
        assert!(parse_guid("not-a-guid").is_none());
    }

    #[test]
    fn test_from_json_requires_name() {
        let err = Profile::from_json(&json!({"hidden": true}), ProfileOrigin::User).unwrap_err();
        assert_eq!(err, EntryError::MissingField("name"));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Profile::from_json(&json!("cmd"), ProfileOrigin::User).unwrap_err();
        assert_eq!(err, EntryError::NotAnObject);
    }

    #[test]
    fn test_from_json_splits_typed_fields_from_settings_bag() {
        // Arrange
        let json = json!({
            "guid": "{61c54bbd-c2c6-5271-96e7-009a87ff44bf}",
            "name": "cmd",
            "colorScheme": "Campbell",
            "fontSize": 10,
            "commandline": "cmd.exe"
        });

        // Act
        let profile = Profile::from_json(&json, ProfileOrigin::Defaults).unwrap();

        // Assert
        assert_eq!(profile.name, "cmd");
        assert_eq!(profile.color_scheme.as_deref(), Some("Campbell"));
        assert!(profile.guid.is_some());
        assert_eq!(profile.settings.len(), 2);
        assert_eq!(profile.settings["fontSize"], 10);
        assert!(!profile.settings.contains_key("name"));
    }

    #[test]
    fn test_layer_json_presence_wins_absence_keeps() {
        // Arrange
        let mut profile = Profile::from_json(
            &json!({"name": "A", "fontSize": 10, "padding": "8"}),
            ProfileOrigin::Defaults,
        )
        .unwrap();

        // Act
        profile.layer_json(&obj(json!({"fontSize": 12}))).unwrap();

        // Assert
        assert_eq!(profile.settings["fontSize"], 12);
        assert_eq!(profile.settings["padding"], "8");
        assert_eq!(profile.name, "A");
    }

    #[test]
    fn test_layer_json_null_clears_optional_field() {
        let mut profile = Profile::from_json(
            &json!({"name": "A", "icon": "a.png"}),
            ProfileOrigin::Defaults,
        )
        .unwrap();
        profile.layer_json(&obj(json!({"icon": null}))).unwrap();
        assert_eq!(profile.icon, None);
    }

    #[test]
    fn test_layer_json_rejected_entry_leaves_profile_untouched() {
        let mut profile = Profile::new("A", ProfileOrigin::Defaults);
        let before = profile.clone();

        let err = profile
            .layer_json(&obj(json!({"fontSize": 12, "hidden": "yes"})))
            .unwrap_err();

        assert!(err.is_typed_value_failure());
        assert_eq!(profile, before);
    }

    #[test]
    fn test_layer_json_rejects_malformed_guid() {
        let mut profile = Profile::new("A", ProfileOrigin::User);
        let err = profile.layer_json(&obj(json!({"guid": "1234"}))).unwrap_err();
        assert_eq!(err, EntryError::MalformedGuid("1234".to_string()));
    }

    #[test]
    fn test_refresh_from_keeps_overridden_keys() {
        // Arrange: the user set fontSize and hidden on a generated profile
        let mut profile = Profile::from_json(
            &json!({"name": "Ubuntu", "source": "Terminal.Wsl", "fontSize": 14, "hidden": true}),
            ProfileOrigin::User,
        )
        .unwrap();
        let user_keys = ["fontSize".to_string(), "hidden".to_string()];
        profile.mark_overridden(user_keys.iter());

        let mut candidate = Profile::new("Ubuntu", ProfileOrigin::Generator);
        candidate.source = Some("Terminal.Wsl".into());
        candidate
            .settings
            .insert("fontSize".into(), json!(9));
        candidate
            .settings
            .insert("commandline".into(), json!("wsl.exe -d Ubuntu"));

        // Act
        profile.refresh_from(&candidate);

        // Assert
        assert_eq!(profile.settings["fontSize"], 14);
        assert!(profile.hidden);
        assert_eq!(profile.settings["commandline"], "wsl.exe -d Ubuntu");
    }

    #[test]
    fn test_generate_guid_if_necessary_only_fills_missing() {
        let mut profile = Profile::new("A", ProfileOrigin::User);
        assert!(profile.generate_guid_if_necessary());
        let first = profile.guid;
        assert!(!profile.generate_guid_if_necessary());
        assert_eq!(profile.guid, first);
        assert_eq!(first, Some(derive_profile_guid("A", None)));
    }

    #[test]
    fn test_stub_json_carries_identity_only() {
        let mut profile = Profile::new("Ubuntu", ProfileOrigin::Generator);
        profile.source = Some("Terminal.Wsl".into());
        profile.settings.insert("commandline".into(), json!("wsl.exe"));

        let stub = profile.stub_json();

        assert_eq!(stub.len(), 4);
        assert_eq!(stub["hidden"], false);
        assert_eq!(stub["source"], "Terminal.Wsl");
        assert!(!stub.contains_key("commandline"));
    }

    #[test]
    fn test_reference_json_leaves_hidden_untouched() {
        // Arrange
        let mut profile = Profile::new("cmd", ProfileOrigin::Defaults);
        profile.hidden = true;
        profile.settings.insert("commandline".into(), json!("cmd.exe"));

        // Act
        let reference = profile.reference_json();
        let mut reloaded = profile.clone();
        reloaded.layer_json(&reference).unwrap();

        // Assert
        let keys: Vec<_> = reference.keys().map(String::as_str).collect();
        assert_eq!(keys, ["guid", "name"]);
        assert!(reloaded.hidden);
        assert_eq!(reloaded.effective_guid(), profile.effective_guid());
    }

    #[test]
    fn test_to_json_round_trips_through_from_json() {
        let json = json!({
            "guid": "{61c54bbd-c2c6-5271-96e7-009a87ff44bf}",
            "name": "cmd",
            "hidden": true,
            "backgroundImage": "C:/bg.png",
            "cursorShape": "bar"
        });
        let profile = Profile::from_json(&json, ProfileOrigin::Defaults).unwrap();

        let again =
            Profile::from_json(&Value::Object(profile.to_json()), ProfileOrigin::Defaults).unwrap();

        assert_eq!(profile, again);
    }
}
