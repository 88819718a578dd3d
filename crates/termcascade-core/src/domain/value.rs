//! Typed field access over parsed JSON objects.
//!
//! Settings documents are loosely typed.  A key can be absent (the user did
//! not set it) or present with the wrong type (the user set it incorrectly);
//! callers need to tell those apart, so every accessor returns
//! `Result<Option<T>, EntryError>`:
//!
//! | Document          | Result                       |
//! |-------------------|------------------------------|
//! | key absent        | `Ok(None)`                   |
//! | key has type `T`  | `Ok(Some(value))`            |
//! | key has other type| `Err(EntryError::WrongType)` |

use serde_json::{Map, Value};
use thiserror::Error;

/// A JSON object as produced by `serde_json` (insertion ordered).
pub type JsonObject = Map<String, Value>;

/// Why a single document entry could not be read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntryError {
    /// The entry is not a JSON object.
    #[error("entry is not an object")]
    NotAnObject,

    /// A recognised field holds a value of the wrong JSON type.
    #[error("field `{key}` must be {expected}")]
    WrongType {
        key: &'static str,
        expected: &'static str,
    },

    /// The identifier field is present but is not a well-formed GUID.
    #[error("field `guid` is not a valid GUID: {0}")]
    MalformedGuid(String),

    /// A field required to create a new record is absent.
    #[error("required field `{0}` is missing")]
    MissingField(&'static str),
}

impl EntryError {
    /// Returns `true` for the "present but wrong type" failure.
    pub fn is_typed_value_failure(&self) -> bool {
        matches!(self, EntryError::WrongType { .. })
    }
}

/// Reads an optional string field.
pub fn get_string(obj: &JsonObject, key: &'static str) -> Result<Option<String>, EntryError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(EntryError::WrongType {
            key,
            expected: "a string",
        }),
    }
}

/// Reads an optional string field where an explicit `null` clears the value.
///
/// Returns `Ok(None)` when the key is absent and `Ok(Some(None))` when it is
/// present and `null`.
pub fn get_nullable_string(
    obj: &JsonObject,
    key: &'static str,
) -> Result<Option<Option<String>>, EntryError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(s)) => Ok(Some(Some(s.clone()))),
        Some(_) => Err(EntryError::WrongType {
            key,
            expected: "a string or null",
        }),
    }
}

/// Reads an optional boolean field.
pub fn get_bool(obj: &JsonObject, key: &'static str) -> Result<Option<bool>, EntryError> {
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(EntryError::WrongType {
            key,
            expected: "a boolean",
        }),
    }
}

/// Reads an optional array of strings.
pub fn get_string_array(
    obj: &JsonObject,
    key: &'static str,
) -> Result<Option<Vec<String>>, EntryError> {
    let wrong = EntryError::WrongType {
        key,
        expected: "an array of strings",
    };
    match obj.get(key) {
        None => Ok(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(|| wrong.clone()))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(wrong),
    }
}
