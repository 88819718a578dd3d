//! termcascade-loader library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::current::SettingsHandle;
pub use application::load_settings::{LoadOptions, SettingsLoader};
pub use application::settings::{NewTerminalArgs, Settings};
