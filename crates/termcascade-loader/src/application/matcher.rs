//! Record matching: which existing profile does an entry refer to?
//!
//! Two documents (and any number of generators) describe profiles
//! independently, so an entry may identify its profile by GUID, by name, or
//! by name within a generator's namespace.  The tiers are tried in order and
//! the first hit wins:
//!
//! 1. **GUID** – the entry carries an explicit GUID equal to an existing
//!    profile's GUID (explicit or derived).
//! 2. **Source + name** – the entry carries a source tag; match a profile
//!    with the same tag and the same name.
//! 3. **Name** – the entry carries no source tag; match a profile with no
//!    source tag and the same name.
//!
//! Two generators may both produce a profile called "Ubuntu"; tier 2 keeps
//! a user override aimed at one of them from landing on the other, and
//! tier 3 never lets an untagged entry reach into a generator's namespace.
//!
//! Name tiers skip profiles whose explicit GUID differs from the entry's.
//! Ties go to the first profile in list order.

use termcascade_core::domain::profile::{GUID_KEY, NAME_KEY, SOURCE_KEY};
use termcascade_core::domain::value::{get_string, EntryError, JsonObject};
use termcascade_core::{parse_guid, Profile};
use uuid::Uuid;

/// The identifying fields of a profile entry or candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileIdentity {
    pub guid: Option<Uuid>,
    pub name: Option<String>,
    pub source: Option<String>,
}

impl ProfileIdentity {
    /// Reads the identity of a document entry.
    ///
    /// # Errors
    ///
    /// Returns [`EntryError::MalformedGuid`] when `guid` is not a GUID and
    /// [`EntryError::WrongType`] when an identity field is not a string.
    pub fn from_json(obj: &JsonObject) -> Result<Self, EntryError> {
        let guid = match get_string(obj, GUID_KEY)? {
            Some(text) => Some(parse_guid(&text).ok_or(EntryError::MalformedGuid(text))?),
            None => None,
        };
        Ok(Self {
            guid,
            name: get_string(obj, NAME_KEY)?,
            source: get_string(obj, SOURCE_KEY)?,
        })
    }

    /// The identity of an already built profile.
    pub fn of(profile: &Profile) -> Self {
        Self {
            guid: profile.guid,
            name: Some(profile.name.clone()),
            source: profile.source.clone(),
        }
    }
}

/// Finds the existing profile `candidate` refers to.
///
/// Returns its position in `existing`, or `None` when the candidate is a new
/// profile.
pub fn find_matching_profile(existing: &[Profile], candidate: &ProfileIdentity) -> Option<usize> {
    if let Some(guid) = candidate.guid {
        if let Some(index) = existing.iter().position(|p| p.effective_guid() == guid) {
            tracing::trace!("matched profile {guid} by GUID");
            return Some(index);
        }
    }

    let name = candidate.name.as_deref()?;
    let compatible = |p: &Profile| match (candidate.guid, p.guid) {
        (Some(wanted), Some(have)) => wanted == have,
        _ => true,
    };

    let found = match candidate.source.as_deref() {
        Some(source) => existing.iter().position(|p| {
            p.source.as_deref() == Some(source) && p.name == name && compatible(p)
        }),
        None => existing
            .iter()
            .position(|p| p.source.is_none() && p.name == name && compatible(p)),
    };
    if found.is_some() {
        tracing::trace!(
            "matched profile {name:?} by name (source {:?})",
            candidate.source
        );
    }
    found
}

/// Finds the profile a `defaultProfile`-style reference names: a GUID
/// (braced or bare) first, then a display name.
pub fn find_profile_by_reference(profiles: &[Profile], reference: &str) -> Option<usize> {
    if let Some(guid) = parse_guid(reference) {
        return profiles.iter().position(|p| p.effective_guid() == guid);
    }
    profiles.iter().position(|p| p.name == reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use termcascade_core::{derive_profile_guid, ProfileOrigin};

    fn profile(name: &str, source: Option<&str>, guid: Option<Uuid>) -> Profile {
        let mut p = Profile::new(name, ProfileOrigin::Defaults);
        p.source = source.map(str::to_string);
        p.guid = guid;
        p
    }

    fn identity(name: &str, source: Option<&str>, guid: Option<Uuid>) -> ProfileIdentity {
        ProfileIdentity {
            guid,
            name: Some(name.to_string()),
            source: source.map(str::to_string),
        }
    }

    #[test]
    fn test_guid_match_wins_over_name() {
        let g = Uuid::new_v4();
        let existing = vec![profile("A", None, None), profile("Renamed", None, Some(g))];

        let found = find_matching_profile(&existing, &identity("A", None, Some(g)));

        assert_eq!(found, Some(1));
    }

    #[test]
    fn test_guid_match_uses_derived_guid_of_existing() {
        let existing = vec![profile("cmd", None, None)];
        let derived = derive_profile_guid("cmd", None);

        let candidate = ProfileIdentity {
            guid: Some(derived),
            ..ProfileIdentity::default()
        };

        assert_eq!(find_matching_profile(&existing, &candidate), Some(0));
    }

    #[test]
    fn test_source_scoped_name_match_picks_right_generator() {
        let existing = vec![
            profile("Ubuntu", Some("Terminal.Wsl"), None),
            profile("Ubuntu", Some("Terminal.Ssh"), None),
        ];

        let found = find_matching_profile(&existing, &identity("Ubuntu", Some("Terminal.Ssh"), None));

        assert_eq!(found, Some(1));
    }

    #[test]
    fn test_untagged_entry_never_matches_generated_profile() {
        let existing = vec![profile("Ubuntu", Some("Terminal.Wsl"), None)];
        assert_eq!(
            find_matching_profile(&existing, &identity("Ubuntu", None, None)),
            None
        );
    }

    #[test]
    fn test_tagged_entry_never_matches_untagged_profile() {
        let existing = vec![profile("Ubuntu", None, None)];
        assert_eq!(
            find_matching_profile(&existing, &identity("Ubuntu", Some("Terminal.Wsl"), None)),
            None
        );
    }

    #[test]
    fn test_name_match_ties_go_to_first_profile() {
        let existing = vec![profile("A", None, None), profile("A", None, None)];
        assert_eq!(
            find_matching_profile(&existing, &identity("A", None, None)),
            Some(0)
        );
    }

    #[test]
    fn test_name_match_skips_profile_with_different_explicit_guid() {
        let existing = vec![profile("A", None, Some(Uuid::new_v4()))];
        let found = find_matching_profile(&existing, &identity("A", None, Some(Uuid::new_v4())));
        assert_eq!(found, None);
    }

    #[test]
    fn test_entry_without_name_or_known_guid_matches_nothing() {
        let existing = vec![profile("A", None, None)];
        let candidate = ProfileIdentity {
            guid: Some(Uuid::new_v4()),
            ..ProfileIdentity::default()
        };
        assert_eq!(find_matching_profile(&existing, &candidate), None);
    }

    #[test]
    fn test_identity_from_json_rejects_malformed_guid() {
        let obj = json!({"guid": "{not-a-guid}", "name": "A"});
        let err = ProfileIdentity::from_json(obj.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, EntryError::MalformedGuid(_)));
    }

    #[test]
    fn test_find_profile_by_reference_accepts_guid_or_name() {
        let g = Uuid::new_v4();
        let profiles = vec![profile("A", None, Some(g)), profile("B", None, None)];

        assert_eq!(
            find_profile_by_reference(&profiles, &g.braced().to_string()),
            Some(0)
        );
        assert_eq!(find_profile_by_reference(&profiles, "B"), Some(1));
        assert_eq!(find_profile_by_reference(&profiles, "C"), None);
    }
}
