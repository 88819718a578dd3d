//! Use case: load settings.
//!
//! [`SettingsLoader`] wires the pipeline stages together.  It is configured
//! once by the composition root (default document, generators, persistence,
//! resource probe) and can then produce any number of independent loads:
//!
//! | Flavour            | Defaults | User document | Generators | Write-back |
//! |--------------------|----------|---------------|------------|------------|
//! | `load_defaults`    | yes      | no            | no         | no         |
//! | `load_universal`   | yes      | yes           | no         | no         |
//! | `load_all`         | yes      | yes           | yes        | yes        |
//!
//! ## Write-back (for beginners)
//!
//! Generated profiles are not written in the user document, so the user has
//! no obvious place to customise them.  After a full load every generated
//! profile the user document does not mention yet gets a short stub entry
//! (`guid`, `hidden`, `name`, `source`) appended to the document, and the
//! document is saved.  The next load matches the stub to the generated
//! profile, so anything the user adds to it sticks.
//!
//! Listed profiles are shown first, so a stub alone would move its profile
//! ahead of unlisted ones on the next load.  Unlisted profiles that come
//! before a new stub are therefore written too, as bare references
//! (`guid`, `name`), and the next load shows the same order as this one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use termcascade_core::{LoadError, Profile, ProfileOrigin, SettingsLoadWarning};

use super::document_store::{DocumentKind, DocumentStore, SettingsDocument};
use super::dynamic_profiles::{load_dynamic_profiles, ProfileGenerator};
use super::layering::{layer_defaults, layer_user};
use super::matcher::{find_matching_profile, ProfileIdentity};
use super::persistence::SettingsPersistence;
use super::result_set::ResultSet;
use super::settings::Settings;
use super::validation::{run_validation_chain, NoProbe, ResourceProbe, ValidationContext};

const PROFILES_KEY: &str = "profiles";
const PROFILE_LIST_KEY: &str = "list";

/// Per-loader switches.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Append stubs for new generated profiles to the user document.
    pub write_back_dynamic_profiles: bool,
    /// Set from another thread to abandon a load between stages.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            write_back_dynamic_profiles: true,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadMode {
    DefaultsOnly,
    Universal,
    All,
}

/// Builds [`Settings`] from the default document, the user document and the
/// registered generators.
pub struct SettingsLoader {
    defaults_text: String,
    generators: Vec<Box<dyn ProfileGenerator>>,
    persistence: Option<Arc<dyn SettingsPersistence>>,
    probe: Arc<dyn ResourceProbe>,
    options: LoadOptions,
}

impl SettingsLoader {
    /// Creates a loader around the default document text.
    pub fn new(defaults_text: impl Into<String>) -> Self {
        Self {
            defaults_text: defaults_text.into(),
            generators: Vec::new(),
            persistence: None,
            probe: Arc::new(NoProbe),
            options: LoadOptions::default(),
        }
    }

    /// Loads a single document as if it were the default document.
    ///
    /// # Errors
    ///
    /// Returns any [`LoadError`] the pipeline raises.
    pub fn from_json(text: &str) -> Result<Settings, LoadError> {
        Self::new(text).load_defaults()
    }

    /// Registers a generator; generators run in registration order.
    pub fn with_generator(mut self, generator: Box<dyn ProfileGenerator>) -> Self {
        self.generators.push(generator);
        self
    }

    pub fn with_persistence(mut self, persistence: Arc<dyn SettingsPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn ResourceProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    /// Loads the default document only.
    ///
    /// # Errors
    ///
    /// Returns any [`LoadError`] the pipeline raises.
    pub fn load_defaults(&self) -> Result<Settings, LoadError> {
        self.load(LoadMode::DefaultsOnly)
    }

    /// Loads the default and user documents without running generators.
    ///
    /// # Errors
    ///
    /// Returns any [`LoadError`] the pipeline raises.
    pub fn load_universal(&self) -> Result<Settings, LoadError> {
        self.load(LoadMode::Universal)
    }

    /// Full load: defaults, user document, generators, write-back.
    ///
    /// # Errors
    ///
    /// Returns any [`LoadError`] the pipeline raises.  A failed write-back
    /// is only a warning.
    pub fn load_all(&self) -> Result<Settings, LoadError> {
        self.load(LoadMode::All)
    }

    fn load(&self, mode: LoadMode) -> Result<Settings, LoadError> {
        tracing::info!("loading settings ({mode:?})");
        self.ensure_not_cancelled("start")?;

        let defaults = SettingsDocument::parse(&self.defaults_text, DocumentKind::Defaults)?;
        let mut store = DocumentStore::new(defaults);
        if mode != LoadMode::DefaultsOnly {
            if let Some(text) = self.read_user_text()? {
                let user = SettingsDocument::parse(&text, DocumentKind::User)?;
                store = store.with_user(user, text);
            }
        }

        let mut result = ResultSet::new();
        layer_defaults(&mut result, store.defaults());
        if let Some(user) = store.user() {
            layer_user(&mut result, user);
        }
        self.ensure_not_cancelled("layering")?;

        if mode == LoadMode::All {
            load_dynamic_profiles(&mut result, &self.generators);
            self.ensure_not_cancelled("dynamic profiles")?;
        }

        let ctx = ValidationContext::new(store.user(), self.probe.as_ref());
        let mut result = run_validation_chain(result, &ctx)?;
        self.ensure_not_cancelled("validation")?;

        if mode == LoadMode::All && self.options.write_back_dynamic_profiles {
            if let Some(warning) = self.write_back(&store, &result) {
                result.warnings.push(warning);
            }
        }

        let settings = Settings::from_result(result)?;
        tracing::info!(
            "settings loaded: {} profiles ({} listed), {} warnings",
            settings.all_profiles().len(),
            settings.profiles().len(),
            settings.warnings().len()
        );
        Ok(settings)
    }

    fn ensure_not_cancelled(&self, stage: &str) -> Result<(), LoadError> {
        let cancelled = self
            .options
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Acquire));
        if cancelled {
            tracing::info!("settings load cancelled after {stage}");
            return Err(LoadError::Cancelled);
        }
        Ok(())
    }

    fn read_user_text(&self) -> Result<Option<String>, LoadError> {
        let Some(persistence) = &self.persistence else {
            return Ok(None);
        };
        let text = persistence
            .read_user_document()
            .map_err(|e| LoadError::ReadUserSettings(e.to_string()))?;
        if text.is_none() {
            tracing::debug!(
                "no user settings at {}",
                persistence.settings_path().display()
            );
        }
        Ok(text)
    }

    /// Appends stubs for unlisted generated profiles, with references for
    /// the unlisted profiles ahead of them, and saves the user document.
    /// Returns the warning to report if saving failed.
    fn write_back(&self, store: &DocumentStore, result: &ResultSet) -> Option<SettingsLoadWarning> {
        let persistence = self.persistence.as_ref()?;
        let user = store.user()?;
        let entries = user.profile_entries().ok()?;

        let identities: Vec<ProfileIdentity> = entries
            .iter()
            .filter_map(|e| e.as_object())
            .filter_map(|obj| ProfileIdentity::from_json(obj).ok())
            .collect();
        let unlisted: Vec<&Profile> = result
            .profiles
            .iter()
            .filter(|p| {
                let one = std::slice::from_ref(*p);
                !identities
                    .iter()
                    .any(|id| find_matching_profile(one, id).is_some())
            })
            .collect();
        let last_generated = unlisted
            .iter()
            .rposition(|p| p.origin == ProfileOrigin::Generator)?;
        let stubs: Vec<Value> = unlisted[..=last_generated]
            .iter()
            .map(|p| match p.origin {
                ProfileOrigin::Generator => Value::Object(p.stub_json()),
                _ => Value::Object(p.reference_json()),
            })
            .collect();

        let mut root = user.root().clone();
        let section = root
            .entry(PROFILES_KEY)
            .or_insert_with(|| Value::Array(Vec::new()));
        let list = match section {
            Value::Object(section) => section
                .entry(PROFILE_LIST_KEY)
                .or_insert_with(|| Value::Array(Vec::new())),
            other => other,
        };
        let Value::Array(list) = list else {
            tracing::warn!("user profile list has an unexpected shape; not writing stubs");
            return None;
        };
        let added = stubs.len();
        list.extend(stubs);

        let text = match serde_json::to_string_pretty(&Value::Object(root)) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to serialise user settings: {e}");
                return Some(SettingsLoadWarning::FailedToWriteToSettings);
            }
        };
        match persistence.write_user_document(&text) {
            Ok(()) => {
                tracing::info!(
                    "added {added} profile entries to {}",
                    persistence.settings_path().display()
                );
                None
            }
            Err(e) => {
                tracing::warn!("failed to write user settings: {e}");
                Some(SettingsLoadWarning::FailedToWriteToSettings)
            }
        }
    }
}
