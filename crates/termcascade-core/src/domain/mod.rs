//! Settings records.
//!
//! Everything here is plain data plus "read from JSON" / "layer JSON on top"
//! operations.  Nothing in this module touches the file system or knows
//! about generators; those live in the loader crate.

/// Named bag of color values.
pub mod color_scheme;

/// App-wide options, the default-profile reference and the key mapping.
pub mod globals;

/// The profile record and its identifier derivation.
pub mod profile;

/// Typed accessors over `serde_json` objects.
pub mod value;

/// Load warnings and fatal load errors.
pub mod warnings;
