//! A generator that always offers the same profiles.

use termcascade_core::Profile;

use crate::application::dynamic_profiles::{GeneratorError, ProfileGenerator};

/// Returns a preset list of profiles under a fixed source tag.
#[derive(Debug, Clone)]
pub struct FixedProfileGenerator {
    source: String,
    profiles: Vec<Profile>,
}

impl FixedProfileGenerator {
    pub fn new(source: impl Into<String>, profiles: Vec<Profile>) -> Self {
        Self {
            source: source.into(),
            profiles,
        }
    }
}

impl ProfileGenerator for FixedProfileGenerator {
    fn source(&self) -> String {
        self.source.clone()
    }

    fn generate(&self) -> Result<Vec<Profile>, GeneratorError> {
        Ok(self.profiles.clone())
    }
}
