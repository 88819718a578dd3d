//! Storage infrastructure: settings document and loader configuration files.
//!
//! - `settings_file` – the user settings document on disk (atomic writes).
//! - `memory`        – an in-memory document store for tests.
//! - `defaults`      – the default document bundled into the binary.
//! - `config`        – the loader's own TOML configuration.

pub mod config;
pub mod defaults;
pub mod memory;
pub mod settings_file;
