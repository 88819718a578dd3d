//! Login shells as profiles.
//!
//! Reads a file in the `/etc/shells` format: one absolute path per line,
//! `#` starts a comment.  Each distinct shell program becomes a profile
//! named after the program (`bash`, `zsh`, ...) that launches it as a login
//! shell.

use std::path::{Path, PathBuf};

use serde_json::Value;
use termcascade_core::{Profile, ProfileOrigin};

use crate::application::dynamic_profiles::{GeneratorError, ProfileGenerator};

/// Source tag stamped on every shell profile.
pub const SHELLS_SOURCE: &str = "Terminal.Shells";

/// Entries that exist only to lock accounts out.
const NON_INTERACTIVE: [&str; 2] = ["nologin", "false"];

/// Offers one profile per login shell.
#[derive(Debug, Clone)]
pub struct ShellsProfileGenerator {
    shells_file: PathBuf,
}

impl ShellsProfileGenerator {
    pub fn new(shells_file: impl Into<PathBuf>) -> Self {
        Self {
            shells_file: shells_file.into(),
        }
    }
}

impl ProfileGenerator for ShellsProfileGenerator {
    fn source(&self) -> String {
        SHELLS_SOURCE.to_string()
    }

    fn generate(&self) -> Result<Vec<Profile>, GeneratorError> {
        let text = match std::fs::read_to_string(&self.shells_file) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GeneratorError::Unavailable(format!(
                    "{} does not exist",
                    self.shells_file.display()
                )));
            }
            Err(source) => {
                return Err(GeneratorError::Io {
                    path: self.shells_file.clone(),
                    source,
                });
            }
        };
        Ok(parse_shells(&text))
    }
}

/// Builds profiles from shells-file text.  The first path wins when two
/// entries name the same program.
pub fn parse_shells(text: &str) -> Vec<Profile> {
    let mut profiles: Vec<Profile> = Vec::new();
    for line in text.lines() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let Some(name) = Path::new(line).file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if NON_INTERACTIVE.contains(&name) || profiles.iter().any(|p| p.name == name) {
            continue;
        }

        let mut profile = Profile::new(name, ProfileOrigin::Generator);
        profile
            .settings
            .insert("commandline".into(), Value::String(format!("{line} -l")));
        profiles.push(profile);
    }
    profiles
}
