//! Named color schemes.

use serde_json::Value;

use super::value::{get_string, EntryError, JsonObject};

const NAME_KEY: &str = "name";

/// Name every dangling scheme reference is repaired to.
pub const FALLBACK_COLOR_SCHEME: &str = "Campbell";

/// A color scheme: a case-sensitive name plus an opaque bag of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    pub name: String,
    pub colors: JsonObject,
}

impl ColorScheme {
    /// Builds a scheme from a document entry.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::NotAnObject`] for non-object entries and
    /// [`EntryError::MissingField`] / [`EntryError::WrongType`] when `name`
    /// is absent or not a string.
    pub fn from_json(json: &Value) -> Result<Self, EntryError> {
        let obj = json.as_object().ok_or(EntryError::NotAnObject)?;
        let name = Self::name_of(obj)?.ok_or(EntryError::MissingField(NAME_KEY))?;
        let mut scheme = Self {
            name,
            colors: JsonObject::new(),
        };
        scheme.layer_json(obj);
        Ok(scheme)
    }

    /// Reads the identity of a scheme entry without building it.
    pub fn name_of(obj: &JsonObject) -> Result<Option<String>, EntryError> {
        get_string(obj, NAME_KEY)
    }

    /// Layers color values from `obj`; present keys win.
    pub fn layer_json(&mut self, obj: &JsonObject) {
        for (key, value) in obj {
            if key != NAME_KEY {
                self.colors.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_name_and_colors() {
        let scheme = ColorScheme::from_json(&json!({
            "name": "Campbell",
            "background": "#0C0C0C",
            "foreground": "#CCCCCC"
        }))
        .unwrap();
        assert_eq!(scheme.name, "Campbell");
        assert_eq!(scheme.colors.len(), 2);
    }

    #[test]
    fn test_from_json_without_name_is_rejected() {
        let err = ColorScheme::from_json(&json!({"background": "#000000"})).unwrap_err();
        assert_eq!(err, EntryError::MissingField("name"));
    }

    #[test]
    fn test_layer_json_overwrites_only_present_colors() {
        let mut scheme = ColorScheme::from_json(&json!({
            "name": "One Half Dark",
            "background": "#282C34",
            "red": "#E06C75"
        }))
        .unwrap();

        scheme.layer_json(json!({"background": "#000000"}).as_object().unwrap());

        assert_eq!(scheme.colors["background"], "#000000");
        assert_eq!(scheme.colors["red"], "#E06C75");
    }
}
