//! Dynamic profiles: profiles produced at load time by generators.
//!
//! A generator owns a namespace, its *source tag* (`"Terminal.Wsl"`,
//! `"Terminal.Shells"`, ...).  Every candidate it returns is stamped with
//! that tag, so user entries written for one generator never land on
//! another generator's profiles.
//!
//! Generators run after the user document was layered.  When a candidate
//! matches a record the user already customised, only the keys the user did
//! not set are refreshed; the user's overrides survive regeneration.
//!
//! A source-tagged record that no candidate claims in this load is dropped,
//! whether its generator is disabled, failed, or simply stopped offering it.

use std::path::PathBuf;

use thiserror::Error;

use termcascade_core::{Profile, ProfileOrigin, SettingsLoadWarning};

use super::matcher::{find_matching_profile, ProfileIdentity};
use super::result_set::ResultSet;

/// Why a generator produced no profiles.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The backing system is not present on this machine.
    #[error("generator unavailable: {0}")]
    Unavailable(String),

    /// Reading the generator's input failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A pluggable source of profiles.
///
/// Implementations must not touch the settings documents; they only describe
/// the profiles they can offer.
#[cfg_attr(test, mockall::automock)]
pub trait ProfileGenerator: Send + Sync {
    /// The stable namespace tag stamped on every generated profile.
    fn source(&self) -> String;

    /// Returns this generator's candidate profiles.
    fn generate(&self) -> Result<Vec<Profile>, GeneratorError>;
}

/// Runs every registered generator whose source is not excluded and merges
/// its candidates into `result`.
pub fn load_dynamic_profiles(result: &mut ResultSet, generators: &[Box<dyn ProfileGenerator>]) {
    for generator in generators {
        let source = generator.source();
        if result.excluded_sources.contains(&source) {
            tracing::info!("profile source {source} is disabled; skipping");
            continue;
        }

        let candidates = match generator.generate() {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("profile generator {source} failed: {e}");
                result.warnings.push(SettingsLoadWarning::GeneratorFailed);
                continue;
            }
        };
        tracing::debug!(
            "profile generator {source} produced {} profiles",
            candidates.len()
        );

        for mut candidate in candidates {
            candidate.source = Some(source.clone());
            candidate.origin = ProfileOrigin::Generator;
            candidate.generate_guid_if_necessary();
            merge_candidate(result, candidate);
        }
    }

    prune_unclaimed_profiles(result);
}

fn merge_candidate(result: &mut ResultSet, candidate: Profile) {
    let identity = ProfileIdentity::of(&candidate);
    match find_matching_profile(&result.profiles, &identity) {
        Some(index) => {
            let existing = &mut result.profiles[index];
            existing.refresh_from(&candidate);
            // Claimed: the record now belongs to the generator.
            existing.origin = ProfileOrigin::Generator;
            existing.generate_guid_if_necessary();
        }
        None => {
            let mut profile = candidate;
            if let Some(defaults) = &result.profile_defaults {
                if profile.layer_json(defaults).is_ok() {
                    profile.mark_overridden(defaults.keys());
                }
            }
            result.profiles.push(profile);
        }
    }
}

/// Drops source-tagged records no candidate matched.  Claimed records were
/// switched to [`ProfileOrigin::Generator`] by [`merge_candidate`].
fn prune_unclaimed_profiles(result: &mut ResultSet) {
    let before = result.profiles.len();
    result
        .profiles
        .retain(|p| p.source.is_none() || p.origin == ProfileOrigin::Generator);
    let dropped = before - result.profiles.len();
    if dropped > 0 {
        tracing::debug!("dropped {dropped} profiles no generator produced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::document_store::{DocumentKind, SettingsDocument};
    use crate::application::layering::{layer_defaults, layer_user};
    use serde_json::json;

    fn generated(name: &str) -> Profile {
        let mut p = Profile::new(name, ProfileOrigin::Generator);
        p.settings
            .insert("commandline".into(), json!(format!("{name}.exe")));
        p
    }

    fn mock_generator(source: &'static str, profiles: Vec<Profile>) -> Box<dyn ProfileGenerator> {
        let mut mock = MockProfileGenerator::new();
        mock.expect_source().return_const(source.to_string());
        mock.expect_generate()
            .returning(move || Ok(profiles.clone()));
        Box::new(mock)
    }

    fn user_layered(user: serde_json::Value) -> ResultSet {
        let mut result = ResultSet::new();
        layer_defaults(
            &mut result,
            &SettingsDocument::from_value(
                json!({"profiles": [{"name": "A"}, {"name": "B"}]}),
                DocumentKind::Defaults,
            )
            .unwrap(),
        );
        layer_user(
            &mut result,
            &SettingsDocument::from_value(user, DocumentKind::User).unwrap(),
        );
        result
    }

    #[test]
    fn test_candidates_are_stamped_and_appended() {
        // Arrange
        let mut result = user_layered(json!({}));
        let generators = vec![mock_generator("Terminal.Wsl", vec![generated("Ubuntu")])];

        // Act
        load_dynamic_profiles(&mut result, &generators);

        // Assert
        let ubuntu = &result.profiles[2];
        assert_eq!(ubuntu.source.as_deref(), Some("Terminal.Wsl"));
        assert_eq!(ubuntu.origin, ProfileOrigin::Generator);
        assert_eq!(
            ubuntu.guid,
            Some(termcascade_core::derive_profile_guid("Ubuntu", Some("Terminal.Wsl")))
        );
    }

    #[test]
    fn test_disabled_source_contributes_nothing() {
        // Arrange
        let mut result = user_layered(json!({
            "profiles": [{"name": "Custom", "guid": "{00000000-0000-0000-0000-000000000003}"}],
            "disabledProfileSources": ["generatorX"]
        }));
        let mut mock = MockProfileGenerator::new();
        mock.expect_source().return_const("generatorX".to_string());
        mock.expect_generate().never();
        let generators: Vec<Box<dyn ProfileGenerator>> = vec![Box::new(mock)];

        // Act
        load_dynamic_profiles(&mut result, &generators);

        // Assert
        let names: Vec<_> = result.profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "Custom"]);
    }

    #[test]
    fn test_user_overrides_survive_regeneration() {
        // Arrange
        let mut result = user_layered(json!({"profiles": [
            {"name": "Ubuntu", "source": "Terminal.Wsl", "fontSize": 14, "hidden": true}
        ]}));
        let mut candidate = generated("Ubuntu");
        candidate.settings.insert("fontSize".into(), json!(9));
        let generators = vec![mock_generator("Terminal.Wsl", vec![candidate])];

        // Act
        load_dynamic_profiles(&mut result, &generators);

        // Assert
        assert_eq!(result.profiles.len(), 3);
        let ubuntu = &result.profiles[2];
        assert_eq!(ubuntu.settings["fontSize"], 14);
        assert!(ubuntu.hidden);
        assert_eq!(ubuntu.settings["commandline"], "Ubuntu.exe");
    }

    #[test]
    fn test_same_name_from_two_generators_stays_separate() {
        let mut result = user_layered(json!({"profiles": [
            {"name": "Ubuntu", "source": "Terminal.Ssh", "fontSize": 20}
        ]}));
        let generators = vec![
            mock_generator("Terminal.Wsl", vec![generated("Ubuntu")]),
            mock_generator("Terminal.Ssh", vec![generated("Ubuntu")]),
        ];

        load_dynamic_profiles(&mut result, &generators);

        let wsl = result
            .profiles
            .iter()
            .find(|p| p.source.as_deref() == Some("Terminal.Wsl"))
            .unwrap();
        let ssh = result
            .profiles
            .iter()
            .find(|p| p.source.as_deref() == Some("Terminal.Ssh"))
            .unwrap();
        assert_eq!(result.profiles.len(), 4);
        assert_eq!(wsl.settings.get("fontSize"), None);
        assert_eq!(ssh.settings["fontSize"], 20);
    }

    #[test]
    fn test_failing_generator_warns_and_others_still_run() {
        // Arrange
        let mut result = user_layered(json!({}));
        let mut failing = MockProfileGenerator::new();
        failing.expect_source().return_const("Terminal.Broken".to_string());
        failing
            .expect_generate()
            .returning(|| Err(GeneratorError::Unavailable("no backend".into())));
        let generators: Vec<Box<dyn ProfileGenerator>> = vec![
            Box::new(failing),
            mock_generator("Terminal.Wsl", vec![generated("Ubuntu")]),
        ];

        // Act
        load_dynamic_profiles(&mut result, &generators);

        // Assert
        assert_eq!(result.warnings, vec![SettingsLoadWarning::GeneratorFailed]);
        assert_eq!(result.profiles.len(), 3);
    }

    #[test]
    fn test_stubs_for_absent_generators_are_dropped() {
        let mut result = user_layered(json!({"profiles": [
            {"name": "Old", "source": "Terminal.Gone"},
            {"name": "Custom"}
        ]}));

        load_dynamic_profiles(&mut result, &[]);

        let names: Vec<_> = result.profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "Custom"]);
    }

    #[test]
    fn test_stub_without_matching_candidate_is_dropped() {
        // Arrange: zsh was generated once, then left /etc/shells
        let mut result = user_layered(json!({"profiles": [
            {
                "guid": "{7b0a5f6e-3c1d-5e2f-9a4b-1c2d3e4f5a6b}",
                "name": "zsh",
                "source": "Terminal.Shells",
                "fontSize": 12
            }
        ]}));
        let generators = vec![mock_generator("Terminal.Shells", vec![generated("bash")])];

        // Act
        load_dynamic_profiles(&mut result, &generators);

        // Assert
        let names: Vec<_> = result.profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "bash"]);
    }

    #[test]
    fn test_failed_generator_stubs_are_dropped() {
        let mut result = user_layered(json!({"profiles": [
            {"name": "Ubuntu", "source": "Terminal.Wsl"}
        ]}));
        let mut failing = MockProfileGenerator::new();
        failing.expect_source().return_const("Terminal.Wsl".to_string());
        failing
            .expect_generate()
            .returning(|| Err(GeneratorError::Unavailable("no backend".into())));
        let generators: Vec<Box<dyn ProfileGenerator>> = vec![Box::new(failing)];

        load_dynamic_profiles(&mut result, &generators);

        assert_eq!(result.profiles.len(), 2);
        assert_eq!(result.warnings, vec![SettingsLoadWarning::GeneratorFailed]);
    }

    #[test]
    fn test_new_generated_profile_receives_profile_defaults() {
        let mut result = user_layered(json!({
            "profiles": {"defaults": {"fontFace": "Fira Code"}, "list": []}
        }));
        let generators = vec![mock_generator("Terminal.Wsl", vec![generated("Debian")])];

        load_dynamic_profiles(&mut result, &generators);

        let debian = result.profiles.last().unwrap();
        assert_eq!(debian.font_face.as_deref(), Some("Fira Code"));
        assert!(debian.is_overridden("fontFace"));
    }
}
