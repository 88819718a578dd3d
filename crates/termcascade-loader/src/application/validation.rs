//! The validation chain.
//!
//! After layering and dynamic loading the result set can be inconsistent:
//! profiles without GUIDs, a default that names nothing, duplicates, schemes
//! that do not exist.  Each step below looks at one such problem and either
//! lets the set through, repairs it (and says so with warnings), or fails the
//! load.  Steps run strictly in [`VALIDATION_CHAIN`] order because later
//! steps rely on earlier repairs: the default profile can only be pinned once
//! every profile has a GUID, and duplicates can only be found after that.

use std::collections::HashSet;

use termcascade_core::domain::color_scheme::FALLBACK_COLOR_SCHEME;
use termcascade_core::{LoadError, SettingsLoadWarning};

use super::document_store::SettingsDocument;
use super::matcher::{find_matching_profile, find_profile_by_reference, ProfileIdentity};
use super::result_set::ResultSet;

/// Background image value that refers to the desktop wallpaper, not a file.
const DESKTOP_WALLPAPER: &str = "desktopWallpaper";

/// Reserved top-level key from an older document layout.
const LEGACY_GLOBALS_KEY: &str = "globals";

/// Checks whether external resources referenced by profiles exist.
///
/// `None` means "cannot tell"; the value is then left alone.
pub trait ResourceProbe: Send + Sync {
    fn path_readable(&self, path: &str) -> Option<bool>;
    fn font_installed(&self, face: &str) -> Option<bool>;
}

/// A probe that can verify nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl ResourceProbe for NoProbe {
    fn path_readable(&self, _path: &str) -> Option<bool> {
        None
    }

    fn font_installed(&self, _face: &str) -> Option<bool> {
        None
    }
}

/// Read-only inputs the steps may consult.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    /// The user document, when the load read one.
    pub user: Option<&'a SettingsDocument>,
    pub probe: &'a dyn ResourceProbe,
}

impl<'a> ValidationContext<'a> {
    pub fn new(user: Option<&'a SettingsDocument>, probe: &'a dyn ResourceProbe) -> Self {
        Self { user, probe }
    }
}

/// What a single step decided.
#[derive(Debug)]
pub enum ValidationOutcome {
    /// Nothing to report.
    Passed(ResultSet),
    /// The set was repaired; the warnings describe what was wrong.
    Repaired(ResultSet, Vec<SettingsLoadWarning>),
    /// The load cannot continue.
    Fatal(LoadError),
}

pub type ValidationStep = fn(ResultSet, &ValidationContext<'_>) -> ValidationOutcome;

/// Every step, in the order it must run.
pub const VALIDATION_CHAIN: [(&str, ValidationStep); 11] = [
    ("profiles exist", profiles_exist),
    ("profiles have guids", profiles_have_guids),
    ("default profile exists", default_profile_exists),
    ("no duplicate profiles", no_duplicate_profiles),
    ("resolve default profile", resolve_default_profile),
    ("reorder profiles to match user order", reorder_profiles_to_user_order),
    ("remove hidden profiles", remove_hidden_profiles),
    ("all schemes exist", all_schemes_exist),
    ("media resources valid", media_resources_valid),
    ("keybindings valid", keybindings_valid),
    ("no reserved top-level key", no_reserved_top_level_key),
];

/// Folds `result` through [`VALIDATION_CHAIN`], stopping at the first fatal
/// step.  Repair warnings are appended to `result.warnings` in step order.
///
/// # Errors
///
/// Returns the [`LoadError`] of the first fatal step.
pub fn run_validation_chain(
    result: ResultSet,
    ctx: &ValidationContext<'_>,
) -> Result<ResultSet, LoadError> {
    run_steps(result, ctx, &VALIDATION_CHAIN)
}

fn run_steps(
    mut result: ResultSet,
    ctx: &ValidationContext<'_>,
    steps: &[(&str, ValidationStep)],
) -> Result<ResultSet, LoadError> {
    for (name, step) in steps {
        result = match step(result, ctx) {
            ValidationOutcome::Passed(next) => next,
            ValidationOutcome::Repaired(mut next, warnings) => {
                tracing::info!("validation step '{name}' repaired settings: {warnings:?}");
                next.warnings.extend(warnings);
                next
            }
            ValidationOutcome::Fatal(e) => {
                tracing::error!("validation step '{name}' failed: {e}");
                return Err(e);
            }
        };
    }
    Ok(result)
}

fn repaired_if(result: ResultSet, warnings: Vec<SettingsLoadWarning>) -> ValidationOutcome {
    if warnings.is_empty() {
        ValidationOutcome::Passed(result)
    } else {
        ValidationOutcome::Repaired(result, warnings)
    }
}

// ── Steps ────────────────────────────────────────────────────────────────────

fn profiles_exist(result: ResultSet, _ctx: &ValidationContext<'_>) -> ValidationOutcome {
    if result.profiles.is_empty() {
        ValidationOutcome::Fatal(LoadError::NoProfiles)
    } else {
        ValidationOutcome::Passed(result)
    }
}

fn profiles_have_guids(mut result: ResultSet, _ctx: &ValidationContext<'_>) -> ValidationOutcome {
    for profile in &mut result.profiles {
        profile.generate_guid_if_necessary();
    }
    ValidationOutcome::Passed(result)
}

/// An unset reference falls back silently; a dangling one falls back with
/// [`SettingsLoadWarning::MissingDefaultProfile`].
fn default_profile_exists(
    mut result: ResultSet,
    _ctx: &ValidationContext<'_>,
) -> ValidationOutcome {
    let dangling = match result.globals.default_profile.as_deref() {
        Some(reference) => {
            if find_profile_by_reference(&result.profiles, reference).is_some() {
                return ValidationOutcome::Passed(result);
            }
            tracing::warn!("default profile {reference:?} does not exist");
            true
        }
        None => false,
    };

    let Some(fallback) = result.profiles.iter().find(|p| !p.hidden) else {
        return ValidationOutcome::Fatal(LoadError::AllProfilesHidden);
    };
    result.globals.default_profile = Some(fallback.effective_guid().braced().to_string());

    if dangling {
        ValidationOutcome::Repaired(result, vec![SettingsLoadWarning::MissingDefaultProfile])
    } else {
        ValidationOutcome::Passed(result)
    }
}

fn no_duplicate_profiles(
    mut result: ResultSet,
    _ctx: &ValidationContext<'_>,
) -> ValidationOutcome {
    let mut seen = HashSet::new();
    let before = result.profiles.len();
    result.profiles.retain(|p| seen.insert(p.effective_guid()));

    let dropped = before - result.profiles.len();
    if dropped == 0 {
        return ValidationOutcome::Passed(result);
    }
    tracing::warn!("dropped {dropped} duplicate profiles");
    ValidationOutcome::Repaired(result, vec![SettingsLoadWarning::DuplicateProfile])
}

fn resolve_default_profile(
    mut result: ResultSet,
    _ctx: &ValidationContext<'_>,
) -> ValidationOutcome {
    let reference = result.globals.default_profile.clone().unwrap_or_default();
    match find_profile_by_reference(&result.profiles, &reference) {
        Some(index) => {
            result.globals.resolved_default_profile = Some(result.profiles[index].effective_guid());
            ValidationOutcome::Passed(result)
        }
        None => ValidationOutcome::Fatal(LoadError::UnresolvedDefaultProfile(reference)),
    }
}

/// Profiles the user document lists come first, in document order; the rest
/// keep their relative order after them.
fn reorder_profiles_to_user_order(
    mut result: ResultSet,
    ctx: &ValidationContext<'_>,
) -> ValidationOutcome {
    let Some(entries) = ctx.user.and_then(|doc| doc.profile_entries().ok()) else {
        return ValidationOutcome::Passed(result);
    };

    let mut order = Vec::with_capacity(result.profiles.len());
    for entry in entries {
        let Some(identity) = entry
            .as_object()
            .and_then(|obj| ProfileIdentity::from_json(obj).ok())
        else {
            continue;
        };
        if let Some(index) = find_matching_profile(&result.profiles, &identity) {
            if !order.contains(&index) {
                order.push(index);
            }
        }
    }
    if order.is_empty() {
        return ValidationOutcome::Passed(result);
    }
    let rest: Vec<usize> = (0..result.profiles.len())
        .filter(|i| !order.contains(i))
        .collect();
    order.extend(rest);

    let mut slots: Vec<_> = std::mem::take(&mut result.profiles)
        .into_iter()
        .map(Some)
        .collect();
    result.profiles = order.into_iter().filter_map(|i| slots[i].take()).collect();
    ValidationOutcome::Passed(result)
}

fn remove_hidden_profiles(
    mut result: ResultSet,
    _ctx: &ValidationContext<'_>,
) -> ValidationOutcome {
    result.visible = result
        .profiles
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.hidden)
        .map(|(i, _)| i)
        .collect();
    if result.visible.is_empty() {
        return ValidationOutcome::Fatal(LoadError::AllProfilesHidden);
    }
    ValidationOutcome::Passed(result)
}

fn all_schemes_exist(mut result: ResultSet, _ctx: &ValidationContext<'_>) -> ValidationOutcome {
    let mut repaired = false;
    for profile in &mut result.profiles {
        let Some(scheme) = &profile.color_scheme else {
            continue;
        };
        if result.schemes.contains_key(scheme) {
            continue;
        }
        tracing::warn!(
            "profile {:?} uses unknown color scheme {scheme:?}; using {FALLBACK_COLOR_SCHEME}",
            profile.name
        );
        profile.color_scheme = Some(FALLBACK_COLOR_SCHEME.to_string());
        repaired = true;
    }

    let warnings = if repaired {
        vec![SettingsLoadWarning::UnknownColorScheme]
    } else {
        Vec::new()
    };
    repaired_if(result, warnings)
}

/// Values are reported but never changed.
fn media_resources_valid(result: ResultSet, ctx: &ValidationContext<'_>) -> ValidationOutcome {
    let mut bad_background = false;
    let mut bad_icon = false;
    let mut missing_font = false;

    for profile in &result.profiles {
        if let Some(image) = &profile.background_image {
            if image != DESKTOP_WALLPAPER && !resource_usable(image, ctx.probe) {
                tracing::warn!("profile {:?}: unusable background image {image:?}", profile.name);
                bad_background = true;
            }
        }
        if let Some(icon) = &profile.icon {
            if !resource_usable(icon, ctx.probe) {
                tracing::warn!("profile {:?}: unusable icon {icon:?}", profile.name);
                bad_icon = true;
            }
        }
        if let Some(face) = &profile.font_face {
            if face.trim().is_empty() || ctx.probe.font_installed(face) == Some(false) {
                tracing::warn!("profile {:?}: font face {face:?} is not installed", profile.name);
                missing_font = true;
            }
        }
    }

    let warnings = [
        (bad_background, SettingsLoadWarning::InvalidBackgroundImage),
        (bad_icon, SettingsLoadWarning::InvalidIcon),
        (missing_font, SettingsLoadWarning::MissingFontFace),
    ]
    .into_iter()
    .filter_map(|(hit, warning)| hit.then_some(warning))
    .collect();
    repaired_if(result, warnings)
}

fn resource_usable(value: &str, probe: &dyn ResourceProbe) -> bool {
    let malformed = value.trim().is_empty() || value.chars().any(char::is_control);
    !malformed && probe.path_readable(value) != Some(false)
}

fn keybindings_valid(mut result: ResultSet, _ctx: &ValidationContext<'_>) -> ValidationOutcome {
    let warnings = std::mem::take(&mut result.keybinding_warnings);
    repaired_if(result, warnings)
}

fn no_reserved_top_level_key(result: ResultSet, ctx: &ValidationContext<'_>) -> ValidationOutcome {
    let legacy = ctx
        .user
        .is_some_and(|doc| doc.root().contains_key(LEGACY_GLOBALS_KEY));
    if legacy {
        tracing::warn!("the user document's `{LEGACY_GLOBALS_KEY}` section is ignored");
        ValidationOutcome::Repaired(result, vec![SettingsLoadWarning::LegacyGlobalsProperty])
    } else {
        ValidationOutcome::Passed(result)
    }
}
