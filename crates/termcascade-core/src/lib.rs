//! # termcascade-core
//!
//! Shared record types for the termcascade settings engine: profiles, color
//! schemes, global settings, load warnings and key chords.
//!
//! This crate has no I/O.  It knows how to read one record out of a parsed
//! JSON object and how to layer a second object on top of it; deciding
//! *which* records to layer together is the job of `termcascade-loader`.
//!
//! # Layout
//!
//! - **`domain`** – The records themselves.  A [`Profile`] is an opaque bag
//!   of settings plus the handful of fields the engine has to inspect
//!   (identifier, name, hidden flag, source tag, scheme reference, media
//!   paths).  A [`ColorScheme`] is a named bag of colors.
//!
//! - **`keymap`** – Key chord parsing (`"ctrl+shift+t"`) and the
//!   chord → command [`KeyMapping`] that documents layer into.

pub mod domain;
pub mod keymap;

pub use domain::color_scheme::ColorScheme;
pub use domain::globals::GlobalSettings;
pub use domain::profile::{derive_profile_guid, parse_guid, Profile, ProfileOrigin};
pub use domain::value::EntryError;
pub use domain::warnings::{LoadError, SettingsLoadWarning};
pub use keymap::{KeyChord, KeyChordError, KeyMapping};
