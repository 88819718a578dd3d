//! The two parsed settings documents.
//!
//! A document is a JSON object.  The sections the engine reads can be
//! written in a couple of shapes; the accessors here normalise them:
//!
//! ```json
//! { "profiles": [ ... ] }
//! { "profiles": { "defaults": { ... }, "list": [ ... ] } }
//! ```

use serde_json::Value;
use termcascade_core::domain::value::{get_string_array, EntryError, JsonObject};
use termcascade_core::LoadError;

const PROFILES_KEY: &str = "profiles";
const PROFILE_LIST_KEY: &str = "list";
const PROFILE_DEFAULTS_KEY: &str = "defaults";
const SCHEMES_KEY: &str = "schemes";
const KEYBINDINGS_KEY: &str = "keybindings";
const DISABLED_SOURCES_KEY: &str = "disabledProfileSources";

const NO_ENTRIES: &[Value] = &[];

/// Which of the two documents a [`SettingsDocument`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Defaults,
    User,
}

/// One parsed settings document.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDocument {
    kind: DocumentKind,
    root: JsonObject,
}

impl SettingsDocument {
    /// Parses document text.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::DefaultsSyntax`] / [`LoadError::UserSyntax`] for
    /// invalid JSON and [`LoadError::RootNotObject`] when the root is not an
    /// object.
    pub fn parse(text: &str, kind: DocumentKind) -> Result<Self, LoadError> {
        let value: Value = serde_json::from_str(text).map_err(|e| match kind {
            DocumentKind::Defaults => LoadError::DefaultsSyntax(e),
            DocumentKind::User => LoadError::UserSyntax(e),
        })?;
        Self::from_value(value, kind)
    }

    /// Wraps an already parsed value.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::RootNotObject`] when `value` is not an object.
    pub fn from_value(value: Value, kind: DocumentKind) -> Result<Self, LoadError> {
        match value {
            Value::Object(root) => Ok(Self { kind, root }),
            _ => Err(LoadError::RootNotObject),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn root(&self) -> &JsonObject {
        &self.root
    }

    /// Profile entries, from either the array or the `list` form.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::WrongType`] if the section has another shape.
    pub fn profile_entries(&self) -> Result<&[Value], EntryError> {
        match self.root.get(PROFILES_KEY) {
            None => Ok(NO_ENTRIES),
            Some(Value::Array(list)) => Ok(list.as_slice()),
            Some(Value::Object(obj)) => match obj.get(PROFILE_LIST_KEY) {
                None => Ok(NO_ENTRIES),
                Some(Value::Array(list)) => Ok(list.as_slice()),
                Some(_) => Err(EntryError::WrongType {
                    key: "profiles.list",
                    expected: "an array",
                }),
            },
            Some(_) => Err(EntryError::WrongType {
                key: PROFILES_KEY,
                expected: "an array or an object",
            }),
        }
    }

    /// The `profiles.defaults` object, applied to every profile.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::WrongType`] if `defaults` is not an object.
    pub fn profile_defaults(&self) -> Result<Option<&JsonObject>, EntryError> {
        let Some(Value::Object(profiles)) = self.root.get(PROFILES_KEY) else {
            return Ok(None);
        };
        match profiles.get(PROFILE_DEFAULTS_KEY) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(defaults)) => Ok(Some(defaults)),
            Some(_) => Err(EntryError::WrongType {
                key: "profiles.defaults",
                expected: "an object",
            }),
        }
    }

    /// Source tags listed under `disabledProfileSources`.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::WrongType`] unless the value is an array of
    /// strings.
    pub fn disabled_profile_sources(&self) -> Result<Vec<String>, EntryError> {
        Ok(get_string_array(&self.root, DISABLED_SOURCES_KEY)?.unwrap_or_default())
    }

    /// Color scheme entries.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::WrongType`] if `schemes` is not an array.
    pub fn scheme_entries(&self) -> Result<&[Value], EntryError> {
        self.array_section(SCHEMES_KEY)
    }

    /// Key binding entries.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::WrongType`] if `keybindings` is not an array.
    pub fn keybinding_entries(&self) -> Result<&[Value], EntryError> {
        self.array_section(KEYBINDINGS_KEY)
    }

    fn array_section(&self, key: &'static str) -> Result<&[Value], EntryError> {
        match self.root.get(key) {
            None => Ok(NO_ENTRIES),
            Some(Value::Array(list)) => Ok(list.as_slice()),
            Some(_) => Err(EntryError::WrongType {
                key,
                expected: "an array",
            }),
        }
    }
}

/// The raw inputs of one load: the default document, and the user document
/// with its source text when one exists.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    defaults: SettingsDocument,
    user: Option<SettingsDocument>,
    user_text: Option<String>,
}

impl DocumentStore {
    pub fn new(defaults: SettingsDocument) -> Self {
        Self {
            defaults,
            user: None,
            user_text: None,
        }
    }

    /// Attaches the user document and its source text.
    pub fn with_user(mut self, user: SettingsDocument, text: impl Into<String>) -> Self {
        self.user = Some(user);
        self.user_text = Some(text.into());
        self
    }

    pub fn defaults(&self) -> &SettingsDocument {
        &self.defaults
    }

    pub fn user(&self) -> Option<&SettingsDocument> {
        self.user.as_ref()
    }

    pub fn user_text(&self) -> Option<&str> {
        self.user_text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> SettingsDocument {
        SettingsDocument::from_value(v, DocumentKind::User).unwrap()
    }

    #[test]
    fn test_parse_reports_user_syntax_error() {
        let err = SettingsDocument::parse("{ \"profiles\": [", DocumentKind::User).unwrap_err();
        assert!(matches!(err, LoadError::UserSyntax(_)));
    }

    #[test]
    fn test_parse_reports_defaults_syntax_error() {
        let err = SettingsDocument::parse("nope", DocumentKind::Defaults).unwrap_err();
        assert!(matches!(err, LoadError::DefaultsSyntax(_)));
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let err = SettingsDocument::parse("[1, 2]", DocumentKind::User).unwrap_err();
        assert!(matches!(err, LoadError::RootNotObject));
    }

    #[test]
    fn test_profile_entries_accepts_array_form() {
        let d = doc(json!({"profiles": [{"name": "A"}, {"name": "B"}]}));
        assert_eq!(d.profile_entries().unwrap().len(), 2);
        assert_eq!(d.profile_defaults().unwrap(), None);
    }

    #[test]
    fn test_profile_entries_accepts_object_form_with_defaults() {
        let d = doc(json!({
            "profiles": {"defaults": {"fontSize": 11}, "list": [{"name": "A"}]}
        }));
        assert_eq!(d.profile_entries().unwrap().len(), 1);
        assert_eq!(d.profile_defaults().unwrap().unwrap()["fontSize"], 11);
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let d = doc(json!({}));
        assert!(d.profile_entries().unwrap().is_empty());
        assert!(d.scheme_entries().unwrap().is_empty());
        assert!(d.keybinding_entries().unwrap().is_empty());
        assert!(d.disabled_profile_sources().unwrap().is_empty());
    }

    #[test]
    fn test_wrongly_shaped_sections_are_typed_failures() {
        let d = doc(json!({
            "profiles": "all",
            "schemes": {},
            "disabledProfileSources": "Terminal.Wsl"
        }));
        assert!(d.profile_entries().unwrap_err().is_typed_value_failure());
        assert!(d.scheme_entries().unwrap_err().is_typed_value_failure());
        assert!(d
            .disabled_profile_sources()
            .unwrap_err()
            .is_typed_value_failure());
    }

    #[test]
    fn test_store_keeps_user_text() {
        let defaults = SettingsDocument::parse("{}", DocumentKind::Defaults).unwrap();
        let text = "{ \"defaultProfile\": \"cmd\" }";
        let user = SettingsDocument::parse(text, DocumentKind::User).unwrap();

        let store = DocumentStore::new(defaults).with_user(user, text);

        assert_eq!(store.user_text(), Some(text));
        assert_eq!(store.user().unwrap().kind(), DocumentKind::User);
    }
}
