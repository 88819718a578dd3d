//! Layering: applies one settings document onto the result set.
//!
//! The default document is applied first and only appends: it establishes
//! the baseline profiles, their order, and the built-in schemes.  The user
//! document is applied second and reconciles each entry with what is
//! already there through the [`matcher`](super::matcher):
//!
//! ```text
//! entry ──► matcher ──► hit:  merge present keys onto the record
//!                   └─► miss: append a new record (entry order kept)
//! ```
//!
//! A malformed entry is skipped with a warning and the rest of the document
//! still loads.

use termcascade_core::domain::value::{EntryError, JsonObject};
use termcascade_core::{ColorScheme, Profile, ProfileOrigin, SettingsLoadWarning};

use super::document_store::SettingsDocument;
use super::matcher::{find_matching_profile, ProfileIdentity};
use super::result_set::ResultSet;

/// Maps an entry failure to the warning reported for it.
///
/// A wrong-typed recognised field is always [`InvalidSettingType`]; every
/// other failure is reported as `malformed`.
///
/// [`InvalidSettingType`]: SettingsLoadWarning::InvalidSettingType
pub fn entry_warning(err: &EntryError, malformed: SettingsLoadWarning) -> SettingsLoadWarning {
    if err.is_typed_value_failure() {
        SettingsLoadWarning::InvalidSettingType
    } else {
        malformed
    }
}

/// Applies the default document: every profile entry is appended as is.
pub fn layer_defaults(result: &mut ResultSet, doc: &SettingsDocument) {
    match doc.profile_entries() {
        Ok(entries) => {
            for entry in entries {
                match Profile::from_json(entry, ProfileOrigin::Defaults) {
                    Ok(profile) => result.profiles.push(profile),
                    Err(e) => skip_profile_entry(result, &e),
                }
            }
        }
        Err(e) => skip_profile_entry(result, &e),
    }

    layer_common(result, doc);
    tracing::debug!(
        "default document layered: {} profiles, {} schemes",
        result.profiles.len(),
        result.schemes.len()
    );
}

/// Applies the user document, reconciling each entry with the records
/// already in `result`.
pub fn layer_user(result: &mut ResultSet, doc: &SettingsDocument) {
    apply_profile_defaults(result, doc);

    match doc.profile_entries() {
        Ok(entries) => {
            for entry in entries {
                if let Err(e) = layer_user_profile(result, entry) {
                    skip_profile_entry(result, &e);
                }
            }
        }
        Err(e) => skip_profile_entry(result, &e),
    }

    layer_common(result, doc);
    tracing::debug!(
        "user document layered: {} profiles, {} schemes",
        result.profiles.len(),
        result.schemes.len()
    );
}

// ── Profiles ─────────────────────────────────────────────────────────────────

/// Applies `profiles.defaults` to every profile seen so far and keeps it for
/// the profiles created later in the load.
fn apply_profile_defaults(result: &mut ResultSet, doc: &SettingsDocument) {
    let defaults = match doc.profile_defaults() {
        Ok(Some(defaults)) => defaults,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!("ignoring profile defaults: {e}");
            result
                .warnings
                .push(entry_warning(&e, SettingsLoadWarning::MalformedProfileEntry));
            return;
        }
    };

    // Validate once against a scratch profile so a bad object is reported a
    // single time instead of once per profile.
    if let Err(e) = Profile::new("", ProfileOrigin::User).layer_json(defaults) {
        tracing::warn!("ignoring profile defaults: {e}");
        result
            .warnings
            .push(entry_warning(&e, SettingsLoadWarning::MalformedProfileEntry));
        return;
    }

    for profile in &mut result.profiles {
        apply_user_object(profile, defaults);
    }
    result.profile_defaults = Some(defaults.clone());
}

fn layer_user_profile(
    result: &mut ResultSet,
    entry: &serde_json::Value,
) -> Result<(), EntryError> {
    let obj = entry.as_object().ok_or(EntryError::NotAnObject)?;
    let identity = ProfileIdentity::from_json(obj)?;

    if let Some(index) = find_matching_profile(&result.profiles, &identity) {
        let profile = &mut result.profiles[index];
        profile.layer_json(obj)?;
        profile.mark_overridden(obj.keys());
        tracing::trace!("user entry merged onto profile {:?}", profile.name);
        return Ok(());
    }

    let name = identity.name.ok_or(EntryError::MissingField("name"))?;
    let mut profile = Profile::new(name, ProfileOrigin::User);
    // The entry is checked before the defaults are applied so a rejected
    // entry never leaves a half-built record behind.
    profile.clone().layer_json(obj)?;
    if let Some(defaults) = &result.profile_defaults {
        apply_user_object(&mut profile, defaults);
    }
    apply_user_object(&mut profile, obj);
    tracing::debug!("user document adds profile {:?}", profile.name);
    result.profiles.push(profile);
    Ok(())
}

/// Layers an already validated user object and records its keys as
/// overrides.
fn apply_user_object(profile: &mut Profile, obj: &JsonObject) {
    if let Err(e) = profile.layer_json(obj) {
        tracing::debug!("profile {:?} rejected user object: {e}", profile.name);
        return;
    }
    profile.mark_overridden(obj.keys());
}

fn skip_profile_entry(result: &mut ResultSet, err: &EntryError) {
    tracing::warn!("skipping profile entry: {err}");
    result
        .warnings
        .push(entry_warning(err, SettingsLoadWarning::MalformedProfileEntry));
}

// ── Sections shared by both passes ───────────────────────────────────────────

fn layer_common(result: &mut ResultSet, doc: &SettingsDocument) {
    layer_schemes(result, doc);

    if let Err(e) = result.globals.layer_json(doc.root()) {
        tracing::warn!("global setting ignored: {e}");
        result.warnings.push(SettingsLoadWarning::InvalidSettingType);
    }

    match doc.keybinding_entries() {
        Ok(entries) => {
            let warnings = result.globals.keymap.layer_json(entries);
            result.keybinding_warnings.extend(warnings);
        }
        Err(e) => {
            tracing::warn!("key bindings ignored: {e}");
            result.warnings.push(SettingsLoadWarning::InvalidSettingType);
        }
    }

    match doc.disabled_profile_sources() {
        Ok(sources) => result.excluded_sources.extend(sources),
        Err(e) => {
            tracing::warn!("disabled profile sources ignored: {e}");
            result.warnings.push(SettingsLoadWarning::InvalidSettingType);
        }
    }
}

/// Schemes match by exact name: a known name is layered, a new one added.
fn layer_schemes(result: &mut ResultSet, doc: &SettingsDocument) {
    let entries = match doc.scheme_entries() {
        Ok(entries) => entries,
        Err(e) => {
            skip_scheme_entry(result, &e);
            return;
        }
    };

    for entry in entries {
        let Some(obj) = entry.as_object() else {
            skip_scheme_entry(result, &EntryError::NotAnObject);
            continue;
        };
        let name = match ColorScheme::name_of(obj) {
            Ok(Some(name)) => name,
            Ok(None) => {
                skip_scheme_entry(result, &EntryError::MissingField("name"));
                continue;
            }
            Err(e) => {
                skip_scheme_entry(result, &e);
                continue;
            }
        };
        match result.schemes.get_mut(&name) {
            Some(scheme) => scheme.layer_json(obj),
            None => {
                let mut scheme = ColorScheme {
                    name: name.clone(),
                    colors: JsonObject::new(),
                };
                scheme.layer_json(obj);
                result.schemes.insert(name, scheme);
            }
        }
    }
}

fn skip_scheme_entry(result: &mut ResultSet, err: &EntryError) {
    tracing::warn!("skipping color scheme entry: {err}");
    result
        .warnings
        .push(entry_warning(err, SettingsLoadWarning::MalformedColorSchemeEntry));
}
