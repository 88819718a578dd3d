//! Infrastructure layer for the settings loader.
//!
//! Contains OS-facing adapters: settings and configuration files, dynamic
//! profile generators backed by the local system, and the resource probe.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `termcascade_core`, but MUST NOT be imported by the `application` or
//! domain layers.

pub mod generators;
pub mod probe;
pub mod storage;
