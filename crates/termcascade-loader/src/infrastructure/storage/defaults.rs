//! The default settings document compiled into the binary.

/// Text of the bundled default document.
pub const DEFAULT_SETTINGS_JSON: &str = include_str!("defaults.json");
