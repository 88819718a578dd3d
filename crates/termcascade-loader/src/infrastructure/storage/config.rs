//! TOML configuration for the `termcascade` binary.
//!
//! This is the loader's own configuration, not the terminal settings it
//! loads.  It lives next to the user settings document in the
//! platform-appropriate directory:
//! - Windows:  `%APPDATA%\termcascade\loader.toml`
//! - Linux:    `$XDG_CONFIG_HOME/termcascade/loader.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/termcascade/loader.toml`
//!
//! ```toml
//! [loader]
//! log_level = "debug"
//! write_back_dynamic_profiles = false
//!
//! [generators]
//! shells_file = "/etc/shells"
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section,
//! or a file written by an older version all load.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const APP_DIR_NAME: &str = "termcascade";
const CONFIG_FILE_NAME: &str = "loader.toml";
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Why the loader configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither the environment nor the platform names a config directory.
    #[error("no platform config directory for termcascade")]
    NoPlatformConfigDir,

    /// Reading the file failed.
    #[error("loader config I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`LoaderConfig`].
    #[error("invalid loader config: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// Top-level loader configuration stored on disk.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct LoaderConfig {
    #[serde(default)]
    pub loader: LoaderSection,
    #[serde(default)]
    pub generators: GeneratorsSection,
    #[serde(default)]
    pub probe: ProbeSection,
}

/// How loads are run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoaderSection {
    /// `tracing` log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// User settings document; defaults to `settings.json` in the config
    /// directory.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,
    /// Append stubs for new generated profiles to the user document.
    #[serde(default = "default_true")]
    pub write_back_dynamic_profiles: bool,
}

/// Which dynamic profile generators are registered.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeneratorsSection {
    /// Offer one profile per login shell.
    #[serde(default = "default_true")]
    pub shells: bool,
    /// File listing the login shells.
    #[serde(default = "default_shells_file")]
    pub shells_file: PathBuf,
}

/// Resource checks run by validation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProbeSection {
    /// Check that local image and icon paths exist.
    #[serde(default = "default_true")]
    pub check_paths: bool,
}

// ── Serde defaults ────────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_shells_file() -> PathBuf {
    PathBuf::from("/etc/shells")
}

impl Default for LoaderSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            settings_path: None,
            write_back_dynamic_profiles: default_true(),
        }
    }
}

impl Default for GeneratorsSection {
    fn default() -> Self {
        Self {
            shells: default_true(),
            shells_file: default_shells_file(),
        }
    }
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            check_paths: default_true(),
        }
    }
}

impl LoaderConfig {
    /// The user settings document this configuration points at.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoPlatformConfigDir`] when no path is
    /// configured and the platform directory cannot be determined.
    pub fn settings_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.loader.settings_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join(SETTINGS_FILE_NAME)),
        }
    }
}

// ── Locations and file access ─────────────────────────────────────────────────

/// `termcascade` inside the platform config directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the environment does
/// not say where that is.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Default location of `loader.toml`.
///
/// # Errors
///
/// See [`config_dir`].
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the config from `path`, returning the defaults if the file does not
/// exist.
///
/// # Errors
///
/// [`ConfigError::Parse`] for bad TOML; [`ConfigError::Io`] when the file
/// exists but cannot be read.
pub fn load_config_from(path: &Path) -> Result<LoaderConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no loader config at {}; using defaults", path.display());
            Ok(LoaderConfig::default())
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Per-OS base directory joined with [`APP_DIR_NAME`].
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join(APP_DIR_NAME))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join(APP_DIR_NAME))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join(APP_DIR_NAME)
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_loader_config_defaults() {
        let cfg = LoaderConfig::default();
        assert_eq!(cfg.loader.log_level, "info");
        assert!(cfg.loader.write_back_dynamic_profiles);
        assert!(cfg.generators.shells);
        assert_eq!(cfg.generators.shells_file, PathBuf::from("/etc/shells"));
        assert!(cfg.probe.check_paths);
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: LoaderConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, LoaderConfig::default());
    }

    #[test]
    fn test_deserialize_partial_section_keeps_other_defaults() {
        // Arrange
        let toml_str = r#"
[loader]
write_back_dynamic_profiles = false
"#;

        // Act
        let cfg: LoaderConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert!(!cfg.loader.write_back_dynamic_profiles);
        assert_eq!(cfg.loader.log_level, "info");
        assert!(cfg.generators.shells);
    }

    #[test]
    fn test_configured_settings_path_wins() {
        let mut cfg = LoaderConfig::default();
        cfg.loader.settings_path = Some(PathBuf::from("/tmp/mine.json"));
        assert_eq!(cfg.settings_path().unwrap(), PathBuf::from("/tmp/mine.json"));
    }

    #[test]
    fn test_load_config_from_missing_file_returns_defaults() {
        let temp = TempDir::new().unwrap();
        let cfg = load_config_from(&temp.path().join("loader.toml")).unwrap();
        assert_eq!(cfg, LoaderConfig::default());
    }

    #[test]
    fn test_load_config_from_invalid_toml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("loader.toml");
        std::fs::write(&path, "[[[ not valid toml").unwrap();

        let err = load_config_from(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_from_file_reads_every_section() {
        // Arrange
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("loader.toml");
        std::fs::write(
            &path,
            "[loader]\nlog_level = \"debug\"\n\n[generators]\nshells = false\n\n[probe]\ncheck_paths = false\n",
        )
        .unwrap();

        // Act
        let loaded = load_config_from(&path).unwrap();

        // Assert
        let mut expected = LoaderConfig::default();
        expected.loader.log_level = "debug".to_string();
        expected.generators.shells = false;
        expected.probe.check_paths = false;
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_config_file_path_ends_with_loader_toml() {
        if let Ok(path) = config_file_path() {
            assert!(path.ends_with("loader.toml"), "got {path:?}");
        }
    }
}
